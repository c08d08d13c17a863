//! Default reqwest-backed session.

use async_trait::async_trait;
use url::Url;

use crate::constants::USER_AGENT;
use crate::session::{Response, Session, SessionError};

/// Default HTTP session backed by a [`reqwest::Client`].
///
/// Suitable for the unauthenticated discovery request and for simple
/// plugin exchanges. Callers needing custom TLS, proxies or timeouts can
/// pass a preconfigured client through [`HttpSession::with_client`], or
/// implement [`Session`] themselves.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    /// Creates a session with a default client and the crate user agent.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, SessionError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(HttpSession { client })
    }

    /// Creates a session from a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpSession { client }
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn get(&self, url: &Url) -> Result<Response, SessionError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Response::new(status, body))
    }
}
