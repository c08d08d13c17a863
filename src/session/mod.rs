//! Network session capability consumed by discovery and authentication.
//!
//! The library never owns a transport: discovery and authentication go
//! through the [`Session`] trait, so callers can supply their own
//! transport with retry, TLS or proxy policy of their choosing. With the
//! `http` feature (default) a thin reqwest-backed [`HttpSession`] is
//! available and is used by the dispatcher when no session is supplied.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpSession;

/// A network capability able to issue plain GET requests.
///
/// Timeouts, retries and TLS configuration are the implementation's
/// responsibility; the library layers no policy of its own on top.
/// Implementations must be independently safe for concurrent use.
#[async_trait]
pub trait Session: fmt::Debug + Send + Sync {
    /// Issues a GET request and returns the raw response.
    ///
    /// Non-success status codes are not errors at this level; callers
    /// decide which statuses they accept.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the request could not be completed
    /// at the transport level.
    async fn get(&self, url: &Url) -> Result<Response, SessionError>;
}

/// A raw response produced by a [`Session`].
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    /// Creates a response from a status code and body bytes.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Response { status, body }
    }

    /// The HTTP status code.
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Errors returned by the underlying transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Error reported by the reqwest transport.
    #[cfg(feature = "http")]
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by a caller-supplied transport.
    #[error("transport error: {0}")]
    Transport(String),
}
