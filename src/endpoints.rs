//! The application's endpoint URIs.
//!
//! For endpoints that take a parameter, e.g. '/quotes/{quote_id}', use [format_endpoint].

/// The root route which redirects to the quote list or log in page.
pub const ROOT: &str = "/";
/// The page listing the current user's quotes.
pub const QUOTES_VIEW: &str = "/quotes";
/// The page for drafting a new quote.
pub const NEW_QUOTE_VIEW: &str = "/quotes/new";
/// A blank material row fragment for the new quote form.
pub const NEW_QUOTE_MATERIAL_ROW: &str = "/quotes/new/material_row";
/// The page showing a single quote.
pub const QUOTE_DETAIL_VIEW: &str = "/quotes/{quote_id}";
/// The printable HTML document for a single quote.
///
/// This endpoint performs its own session check and responds with JSON
/// diagnostics instead of redirects, so it is registered outside the auth
/// middleware.
pub const QUOTE_DOCUMENT: &str = "/quotes/{quote_id}/document";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
/// The route for requesting a hot beverage.
pub const COFFEE: &str = "/coffee";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create a quote.
pub const QUOTES_API: &str = "/api/quotes";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/quotes/{quote_id}', '{quote_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;
    use uuid::Uuid;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::QUOTES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_QUOTE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_QUOTE_MATERIAL_ROW);
        assert_endpoint_is_valid_uri(endpoints::QUOTE_DETAIL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::QUOTE_DOCUMENT);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
        assert_endpoint_is_valid_uri(endpoints::COFFEE);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::QUOTES_API);
    }

    #[test]
    fn produces_valid_uri_with_uuid() {
        let quote_id = Uuid::new_v4();
        let formatted_path = format_endpoint(endpoints::QUOTE_DETAIL_VIEW, quote_id);

        assert_eq!(formatted_path, format!("/quotes/{quote_id}"));
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/quotes/{quote_id}/document", "abc");

        assert_eq!(formatted_path, "/quotes/abc/document");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
