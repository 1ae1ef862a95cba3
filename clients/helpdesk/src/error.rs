//! Error types for the helpdesk client
//!
//! Every error here is terminal for the user action that produced it: the
//! caller converts it into a visible message (or a redirect to login for
//! authorization failures) and nothing is retried automatically.

use thiserror::Error;

/// Fallback message shown when the backend gives no usable error detail
pub const GENERIC_AUTH_MESSAGE: &str = "An error occurred while processing your request.";

/// Errors produced by the login flow
#[derive(Error, Debug)]
pub enum AuthError {
    /// The login response carried no token in any known location
    #[error("Token not found in response")]
    MissingToken,

    /// A token was present but blank or not decodable as a JWT
    #[error("Invalid token specified: must be a non-empty string")]
    InvalidToken,

    /// The backend rejected the credentials or the request failed outright
    #[error("{0}")]
    Rejected(String),
}

/// Errors produced while fetching tickets or staff
#[derive(Error, Debug)]
pub enum FetchError {
    /// The persisted token was missing, expired, or refused by the backend
    #[error("Unauthorized")]
    Unauthorized,

    /// The payload was not the expected sequence shape
    #[error("Unexpected data format received")]
    MalformedResponse,

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Errors produced by ticket update calls
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The backend refused the update; carries its message when present
    #[error("{0}")]
    Rejected(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
