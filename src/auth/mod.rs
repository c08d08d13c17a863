//! Authentication plugin contract.
//!
//! Any authentication strategy (password, token, federated, ...) is
//! expressed as an [`AuthPlugin`] implementation. The rest of the library
//! stays ignorant of the concrete mechanism: sessions carry the bytes,
//! versioned clients forward token requests to whichever plugin was
//! configured. Conformance is checked by the compiler — a type that does
//! not implement all three operations does not implement the trait.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::session::{Session, SessionError};

/// An opaque credential produced by an [`AuthPlugin`].
///
/// The token value is zeroized on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Token(String);

impl Token {
    /// Wraps a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Token(value.into())
    }

    /// The token value, for inclusion in a request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::new(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Parameters for [`AuthPlugin::get_endpoint`].
///
/// All fields are optional. The `extra` map carries parameters specific
/// to individual plugin implementations; plugins must accept unknown
/// entries and may ignore or forward them, never reject them.
#[derive(Debug, Clone, Default)]
pub struct EndpointFilter {
    service_type: Option<String>,
    endpoint_type: Option<String>,
    extra: Map<String, Value>,
}

impl EndpointFilter {
    /// An empty filter.
    pub fn new() -> Self {
        EndpointFilter::default()
    }

    /// Sets the service type to query the URL for, e.g. `"identity"`.
    #[must_use]
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    /// Sets the endpoint type to query a URL for, e.g. `"public"`.
    #[must_use]
    pub fn endpoint_type(mut self, endpoint_type: impl Into<String>) -> Self {
        self.endpoint_type = Some(endpoint_type.into());
        self
    }

    /// Adds a plugin-specific parameter.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The requested service type, if any.
    pub fn service_type_ref(&self) -> Option<&str> {
        self.service_type.as_deref()
    }

    /// The requested endpoint type, if any.
    pub fn endpoint_type_ref(&self) -> Option<&str> {
        self.endpoint_type.as_deref()
    }

    /// The plugin-specific parameters.
    pub fn extra_ref(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Errors produced by authentication plugins.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No valid token could be produced.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No endpoint matched the requested service/endpoint type.
    #[error("endpoint not found for service type {service_type:?}")]
    EndpointNotFound {
        /// The service type that was requested, if any.
        service_type: Option<String>,
    },

    /// Transport failure during a plugin exchange.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The basic structure of an authentication plugin.
///
/// Implementations own their credential state. Whether repeated
/// [`get_token`](AuthPlugin::get_token) calls reuse a cached token is the
/// plugin's responsibility; callers must not assume idempotence.
#[async_trait]
pub trait AuthPlugin: fmt::Debug + Send + Sync {
    /// Returns a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] when no valid token
    /// can be produced.
    async fn get_token(&self) -> Result<Token, AuthError>;

    /// Returns an endpoint URL for the client.
    ///
    /// The endpoint should reflect the type of service required and
    /// whether the public, admin or internal URL was asked for.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EndpointNotFound`] when no endpoint matches
    /// the filter.
    async fn get_endpoint(
        &self,
        session: Option<&dyn Session>,
        filter: &EndpointFilter,
    ) -> Result<String, AuthError>;

    /// Authenticates and obtains a token.
    ///
    /// Success is signaled purely by the absence of failure. All network
    /// access must go through the provided session. The `extra` map is
    /// passed through to the authentication call; there are no required
    /// or standard entries.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credential exchange fails.
    async fn do_authenticate(
        &self,
        session: &dyn Session,
        extra: &Map<String, Value>,
    ) -> Result<(), AuthError>;
}
