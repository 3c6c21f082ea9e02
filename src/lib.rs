//! Orçado is a web app for independent service providers to draft, store,
//! and present price quotes ("orçamentos") to their clients.
//!
//! This library provides an HTTP server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod profile;
mod quote;
mod register_user;
mod routing;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID, get_user_by_email, get_user_by_id};

use crate::{
    alert::Alert,
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email and password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The session token cookie is missing from the cookie jar in the request.
    #[error("no session token in the cookie jar")]
    CookieMissing,

    /// The session token cookie could not be parsed or has expired.
    ///
    /// The client should log in again to get a fresh token.
    #[error("the session token is invalid or has expired")]
    InvalidSessionToken,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// The email used for registration already belongs to a registered user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A labor value string could not be parsed as a monetary amount.
    ///
    /// The form accepts "2850", "2850,00" and "2.850,00". Anything that does
    /// not normalize to a finite, non-negative number is rejected.
    #[error("\"{0}\" is not a valid price")]
    InvalidPrice(String),

    /// The submitted service category is not part of the category catalog.
    #[error("\"{0}\" is not a valid service category")]
    InvalidCategory(String),

    /// The requested resource was not found.
    ///
    /// This error is also used for rows owned by another user so that the
    /// response does not confirm the existence of resources to non-owners.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidPrice(raw_price) => Alert::error(
                "Valor inválido",
                &format!(
                    "\"{raw_price}\" não é um valor válido. \
                    Use um número como \"2850\" ou \"2850,00\"."
                ),
            )
            .into_response(StatusCode::BAD_REQUEST),
            Error::InvalidCategory(category) => Alert::error(
                "Categoria inválida",
                &format!("\"{category}\" não é uma categoria de serviço conhecida."),
            )
            .into_response(StatusCode::BAD_REQUEST),
            Error::InvalidCredentials => Alert::error(
                "Não autenticado",
                "Entre novamente para continuar.",
            )
            .into_response(StatusCode::UNAUTHORIZED),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                Alert::error(
                    "Algo deu errado",
                    "Ocorreu um erro inesperado. Tente novamente mais tarde.",
                )
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
