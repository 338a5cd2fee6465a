//! Error types.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`Error`] — configuration and infrastructure failures. Returned from
//!   [`Adapter::register`](crate::Adapter::register), [`Router::mount`](crate::Router::mount)
//!   and [`Server::serve`](crate::Server::serve). Never recovered from.
//! - [`BoxError`] — request-time failures (body parsing, dispatch). They travel
//!   down the middleware chain and end up in the router's error handler.

use http::StatusCode;

/// A type-erased request-time error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by tsu-act's fallible setup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The adapter was asked to register routes without a host router.
    #[error("no host server context provided")]
    MissingContext,

    /// A route referenced a middleware name that is not in the registry.
    #[error("expected valid middleware, got `{name}` on route `{path}`")]
    UnknownMiddleware { path: String, name: String },

    #[error("invalid route `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// A request-time error that carries the HTTP status it should render as.
///
/// Middleware return it (boxed) to fail a request with something other than
/// `500`. The default error handler honours `status` and uses `message` as the
/// plain-text body.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", status.as_u16())]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}
