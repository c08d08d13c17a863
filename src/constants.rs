//! Constants used within the keystone-client library.

/// Name of the API family this crate negotiates for.
///
/// The dispatcher passes this to [`match_api`](crate::client::match_api)
/// and it appears in diagnostics for version lookup failures.
pub const IDENTITY_API: &str = "identity";

/// User agent sent by the default HTTP session.
pub const USER_AGENT: &str = concat!("keystone-client/", env!("CARGO_PKG_VERSION"));
