//! Cookie based session authentication.
//!
//! A session is an encrypted private cookie holding a serialized [Token].
//! The [middleware] module gates the app's views on a valid token and the
//! [redirect] module builds safe log-in redirect URLs.

mod cookie;
mod middleware;
mod redirect;
mod token;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
