//! Alert fragments for displaying error messages to users.
//!
//! Alerts are returned from htmx form endpoints and swapped into the page's
//! alert container. Successful form submissions redirect instead, so there
//! is no success variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message with a short headline and optional details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: String,
}

impl<'a> Alert<'a> {
    /// Create a new error alert.
    pub fn error(message: &'a str, details: &str) -> Self {
        Self {
            message,
            details: details.to_owned(),
        }
    }

    /// Render the alert as an out-of-band swap targeting the page's alert container.
    pub fn into_markup(self) -> Markup {
        let color_style = "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400";

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(format!("p-4 mb-4 text-sm rounded-lg {color_style}")) role="alert"
                {
                    span class="font-medium" { (self.message) }

                    @if !self.details.is_empty()
                    {
                        " " (self.details)
                    }
                }
            }
        )
    }

    /// Render the alert into an HTTP response with `status_code`.
    pub fn into_response(self, status_code: StatusCode) -> Response {
        (status_code, self.into_markup()).into_response()
    }
}
