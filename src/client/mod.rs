//! Version negotiation and client dispatch.
//!
//! [`match_api`] queries a service's discovery document and picks the
//! best mutually supported (server, client) version pair.
//! [`ClientBuilder`] is the factory entry point applications call to
//! obtain a ready-to-use identity client without knowing which concrete
//! version implementation will serve them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::auth::AuthPlugin;
use crate::constants::IDENTITY_API;
use crate::discovery::{self, DiscoveryError, ServiceVersion};
use crate::error::Error;
use crate::registry::{self, ClientVersion, VersionRegistry};
use crate::session::Session;
use crate::version::ApiVersion;

/// A dispatched, version-specific identity client.
///
/// The dispatcher returns clients as trait objects; [`as_any`] allows
/// downcasting to the concrete versioned type when version-specific
/// calls are needed.
///
/// [`as_any`]: IdentityClient::as_any
pub trait IdentityClient: fmt::Debug + Send + Sync {
    /// The version family this client implements.
    fn api_version(&self) -> ApiVersion;

    /// The canonical endpoint this client talks to.
    fn auth_url(&self) -> &str;

    /// Upcasts to [`Any`] for downcasting to the concrete client type.
    fn as_any(&self) -> &dyn Any;
}

/// Arguments forwarded to a versioned client constructor.
///
/// `auth_url` is the canonical endpoint chosen during negotiation. The
/// `extra` map carries any additional constructor parameters the caller
/// supplied; entries a client does not recognize are kept, not rejected.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    auth_url: String,
    session: Arc<dyn Session>,
    auth_plugin: Option<Arc<dyn AuthPlugin>>,
    extra: Map<String, Value>,
}

impl ClientConfig {
    /// Creates a configuration from an endpoint and a session.
    pub fn new(auth_url: impl Into<String>, session: Arc<dyn Session>) -> Self {
        ClientConfig {
            auth_url: auth_url.into(),
            session,
            auth_plugin: None,
            extra: Map::new(),
        }
    }

    /// Attaches an authentication plugin.
    #[must_use]
    pub fn with_auth_plugin(mut self, auth_plugin: Arc<dyn AuthPlugin>) -> Self {
        self.auth_plugin = Some(auth_plugin);
        self
    }

    /// Replaces the extra constructor parameters.
    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// The endpoint the client should talk to.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// The session the client should use for network access.
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// The configured authentication plugin, if any.
    pub fn auth_plugin(&self) -> Option<&Arc<dyn AuthPlugin>> {
        self.auth_plugin.as_ref()
    }

    /// Additional constructor parameters.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Tie-breaking rule applied when no explicit version was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Pick the highest stable version, falling back to the highest
    /// candidate overall when nothing stable is eligible.
    #[default]
    PreferStable,

    /// Pick the highest eligible version regardless of its marker.
    HighestVersion,
}

/// Constraints applied during version negotiation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiationOptions {
    /// The required version: the chosen server major must be equal and
    /// the server minor at least the requested minor.
    pub requested: Option<ApiVersion>,

    /// Accept server versions not marked as stable.
    pub unstable: bool,

    /// Tie-breaking rule when no version was requested.
    pub policy: SelectionPolicy,
}

/// The (server version, client version) pair chosen by [`match_api`].
#[derive(Debug, Clone)]
pub struct Negotiation {
    server: ServiceVersion,
    client: ClientVersion,
}

impl Negotiation {
    /// The server version that was selected.
    pub fn server(&self) -> &ServiceVersion {
        &self.server
    }

    /// The registered client version that will serve it.
    pub fn client(&self) -> &ClientVersion {
        &self.client
    }

    /// Splits the negotiation into its parts.
    pub fn into_parts(self) -> (ServiceVersion, ClientVersion) {
        (self.server, self.client)
    }
}

/// Determines the best mutually supported (server, client) version pair.
///
/// Fetches the discovery document from `auth_url` through `session` and
/// compares the advertised versions against `version_map` under the
/// given options. Version-mismatch cases are `Ok(None)`, not errors;
/// only transport failures and malformed documents become
/// [`Error::Discovery`]. An advertised entry with an unparseable id is
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`Error::Discovery`] if the discovery document cannot be
/// fetched or decoded.
pub async fn match_api(
    session: &dyn Session,
    auth_url: &str,
    api_name: &str,
    version_map: &VersionRegistry,
    options: &NegotiationOptions,
) -> Result<Option<Negotiation>, Error> {
    let advertised = discovery::fetch(session, auth_url).await?;
    log::debug!(
        "{} server at {} advertises {} version(s)",
        api_name,
        auth_url,
        advertised.len()
    );

    let mut candidates = Vec::new();
    for service in advertised {
        let version = match service.api_version() {
            Ok(version) => version,
            Err(err) => {
                log::warn!(
                    "skipping advertised {} version with unparseable id '{}': {}",
                    api_name,
                    service.id(),
                    err
                );
                continue;
            }
        };

        if !service.status().is_stable() && !options.unstable {
            continue;
        }

        let Some(client) = version_map.client_for_major(version.major()) else {
            continue;
        };

        if let Some(requested) = options.requested {
            if version.major() != requested.major()
                || version.minor_or_zero() < requested.minor_or_zero()
            {
                continue;
            }
        }

        candidates.push((version, service, client));
    }

    candidates.sort_by_key(|(version, _, _)| *version);

    let chosen = match options.policy {
        SelectionPolicy::PreferStable => candidates
            .iter()
            .rposition(|(_, service, _)| service.status().is_stable())
            .or_else(|| candidates.len().checked_sub(1)),
        SelectionPolicy::HighestVersion => candidates.len().checked_sub(1),
    };

    Ok(chosen.map(|index| {
        let (_, server, client) = candidates.swap_remove(index);
        Negotiation { server, client }
    }))
}

/// Factory for version-negotiated identity clients.
///
/// Drives [`match_api`] against the service, rewrites the endpoint to
/// the canonical `self` link reported by discovery, resolves the
/// concrete client type from the registry and instantiates it.
///
/// # Examples
///
/// ```no_run
/// use keystone_client::ClientBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ClientBuilder::new("http://keystone.example.org:5000")
///     .version((3, 1))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    auth_url: String,
    version: Option<ApiVersion>,
    unstable: bool,
    policy: SelectionPolicy,
    session: Option<Arc<dyn Session>>,
    registry: Option<VersionRegistry>,
    auth_plugin: Option<Arc<dyn AuthPlugin>>,
    extra: Map<String, Value>,
}

impl ClientBuilder {
    /// Starts a dispatch against the service at `auth_url`.
    pub fn new(auth_url: impl Into<String>) -> Self {
        ClientBuilder {
            auth_url: auth_url.into(),
            version: None,
            unstable: false,
            policy: SelectionPolicy::default(),
            session: None,
            registry: None,
            auth_plugin: None,
            extra: Map::new(),
        }
    }

    /// Requires a version: the negotiated major must be equal and the
    /// server must provide at least the given minor. For the 3.1 API
    /// pass `(3, 1)`.
    #[must_use]
    pub fn version(mut self, version: impl Into<ApiVersion>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Accepts server versions not marked as stable.
    #[must_use]
    pub fn unstable(mut self, unstable: bool) -> Self {
        self.unstable = unstable;
        self
    }

    /// Overrides the tie-breaking rule used when no version is required.
    #[must_use]
    pub fn policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Supplies the session used for discovery and handed to the client.
    /// Without one, the default HTTP session is constructed.
    #[must_use]
    pub fn session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Overrides the version registry consulted during negotiation.
    #[must_use]
    pub fn registry(mut self, registry: VersionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attaches an authentication plugin, forwarded to the client.
    #[must_use]
    pub fn auth_plugin(mut self, auth_plugin: Arc<dyn AuthPlugin>) -> Self {
        self.auth_plugin = Some(auth_plugin);
        self
    }

    /// Forwards an additional constructor parameter to the client.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Negotiates a version and instantiates the matching client.
    ///
    /// # Errors
    ///
    /// - [`Error::Discovery`] if the discovery document cannot be
    ///   fetched or decoded.
    /// - [`Error::VersionNotAvailable`] if no suitable version pair
    ///   exists; fatal for this call.
    /// - [`Error::UnsupportedVersion`] if the negotiated version id is
    ///   missing from the registry.
    /// - [`Error::MissingSession`] if no session was supplied and the
    ///   default transport is unavailable.
    pub async fn build(self) -> Result<Box<dyn IdentityClient>, Error> {
        let session = match self.session {
            Some(session) => session,
            None => default_session()?,
        };

        let registry = match &self.registry {
            Some(registry) => registry,
            None => registry::identity_defaults(),
        };

        let options = NegotiationOptions {
            requested: self.version,
            unstable: self.unstable,
            policy: self.policy,
        };

        let negotiation = match_api(
            session.as_ref(),
            &self.auth_url,
            IDENTITY_API,
            registry,
            &options,
        )
        .await?;

        let Some(negotiation) = negotiation else {
            return Err(Error::VersionNotAvailable {
                api_name: IDENTITY_API.to_string(),
                requested: self.version,
            });
        };

        let (server, client) = negotiation.into_parts();

        // Discovery may report a different canonical URL than the one
        // the caller supplied.
        let auth_url = server
            .self_link()
            .ok_or_else(|| DiscoveryError::MissingSelfLink {
                id: server.id().to_string(),
            })?
            .to_string();

        log::debug!(
            "using client {} ({}) for server {}: {}",
            client.id(),
            client.class_name(),
            server.id(),
            auth_url
        );

        let constructor = registry::get_client_class(IDENTITY_API, client.id(), registry)?;

        let mut config = ClientConfig::new(auth_url, session).with_extra(self.extra);
        if let Some(auth_plugin) = self.auth_plugin {
            config = config.with_auth_plugin(auth_plugin);
        }

        constructor(config)
    }
}

#[cfg(feature = "http")]
fn default_session() -> Result<Arc<dyn Session>, Error> {
    let session = crate::session::HttpSession::new()?;
    Ok(Arc::new(session))
}

#[cfg(not(feature = "http"))]
fn default_session() -> Result<Arc<dyn Session>, Error> {
    Err(Error::MissingSession)
}
