//! Top-level error type for client dispatch.

use thiserror::Error;

use crate::auth::AuthError;
use crate::discovery::DiscoveryError;
use crate::session::SessionError;
use crate::version::ApiVersion;

/// Errors produced by version negotiation and client dispatch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The service's discovery document could not be fetched or decoded.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// No server version and registered client version are mutually
    /// compatible. Fatal for the dispatch call; callers wanting a retry
    /// re-invoke the factory.
    #[error("{api_name} API version negotiation failed")]
    VersionNotAvailable {
        /// The API family that was negotiated for.
        api_name: String,
        /// The version the caller requested, if any.
        requested: Option<ApiVersion>,
    },

    /// A resolved version id has no registered client type.
    #[error("invalid {api_name} client version '{version}', must be one of: {}", .available.join(", "))]
    UnsupportedVersion {
        /// The API family the lookup was for.
        api_name: String,
        /// The version id that failed to resolve.
        version: String,
        /// The version keys the registry does contain.
        available: Vec<String>,
    },

    /// Failure reported by an authentication plugin.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport failure outside of discovery.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No session was supplied and no default transport is available.
    ///
    /// Returned by the dispatcher when built without the `http` feature
    /// and without an explicit session.
    #[error("no session provided and the default HTTP transport is unavailable")]
    MissingSession,
}
