//! Client for the Identity API v3 family.

use std::any::Any;

use crate::auth::{AuthError, Token};
use crate::client::{ClientConfig, IdentityClient};
use crate::error::Error;
use crate::version::ApiVersion;

/// Client for the Identity API v3.
///
/// Instantiated by the dispatcher once negotiation selects the v3
/// family; `auth_url` in its configuration is the canonical v3 endpoint
/// reported by discovery.
#[derive(Debug)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Creates a v3 client from negotiated configuration.
    pub fn new(config: ClientConfig) -> Self {
        Client { config }
    }

    /// The configuration this client was constructed with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Obtains a token from the configured authentication plugin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] when no plugin is
    /// configured or the plugin cannot produce a token.
    pub async fn get_token(&self) -> Result<Token, AuthError> {
        match self.config.auth_plugin() {
            Some(plugin) => plugin.get_token().await,
            None => Err(AuthError::AuthenticationFailed(
                "no authentication plugin configured".to_string(),
            )),
        }
    }
}

impl IdentityClient for Client {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::major_version(3)
    }

    fn auth_url(&self) -> &str {
        self.config.auth_url()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registered constructor for the v3 client.
///
/// # Errors
///
/// Construction itself does not fail; the `Result` is part of the
/// [`ClientConstructor`](crate::registry::ClientConstructor) signature.
pub fn construct(config: ClientConfig) -> Result<Box<dyn IdentityClient>, Error> {
    Ok(Box::new(Client::new(config)))
}
