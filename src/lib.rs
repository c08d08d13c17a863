#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! This crate provides a Rust client library for the OpenStack Identity
//! (Keystone) API.
//!
//! It lets applications authenticate against an identity service without
//! knowing in advance which API version the service speaks: the library
//! queries the service's version discovery document, negotiates the best
//! mutually supported version, and dispatches to the matching versioned
//! client implementation.
//!
//! The primary entry point is [`ClientBuilder`], which drives the
//! negotiation and returns a ready-to-use versioned client.
//!
//! ## Version negotiation
//!
//! ```no_run
//! use keystone_client::ClientBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Negotiate against the service, requiring at least the 3.1 API.
//! let client = ClientBuilder::new("http://keystone.example.org:5000")
//!     .version((3, 1))
//!     .build()
//!     .await?;
//!
//! // The endpoint is rewritten to the canonical URL reported by discovery.
//! println!("talking to {} (v{})", client.auth_url(), client.api_version());
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication plugins
//!
//! Concrete authentication mechanisms implement the [`AuthPlugin`] trait
//! and are attached to the builder; the negotiated client forwards token
//! requests to the configured plugin.
//!
//! ## Features
//!
//! - **`http`** (default): the reqwest-backed [`HttpSession`] used when no
//!   explicit session is supplied.
//!
//! [`HttpSession`]: crate::session::HttpSession

pub mod auth;
pub mod client;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod session;
pub mod v2;
pub mod v3;
pub mod version;

// -----------------------
// Re-exports
// -----------------------

pub use crate::auth::{AuthError, AuthPlugin, EndpointFilter, Token};
pub use crate::client::{
    match_api, ClientBuilder, ClientConfig, IdentityClient, Negotiation, NegotiationOptions,
    SelectionPolicy,
};
pub use crate::discovery::{DiscoveryError, Link, ServiceVersion, VersionStatus};
pub use crate::error::Error;
pub use crate::registry::{get_client_class, ClientVersion, VersionRegistry};
pub use crate::session::{Response, Session, SessionError};
pub use crate::version::{ApiVersion, ApiVersionError};

#[cfg(feature = "http")]
pub use crate::session::HttpSession;
