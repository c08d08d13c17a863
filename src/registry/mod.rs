//! Registry of locally-available versioned client implementations.
//!
//! The registry is read-only after construction, so concurrent dispatch
//! calls can share it freely. Callers may pass their own registry per
//! call; [`identity_defaults`] is the process-wide table used by the
//! dispatcher when none is supplied.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::client::{ClientConfig, IdentityClient};
use crate::error::Error;
use crate::version::ApiVersion;

/// Constructor for a registered client implementation.
///
/// Invoked by the dispatcher with the forwarded arguments once a version
/// has been negotiated.
pub type ClientConstructor = fn(ClientConfig) -> Result<Box<dyn IdentityClient>, Error>;

/// One locally-registered client implementation able to handle a major
/// version family.
#[derive(Debug, Clone)]
pub struct ClientVersion {
    id: String,
    class_name: String,
    constructor: ClientConstructor,
}

impl ClientVersion {
    /// The registry key this entry was registered under, e.g. `"3"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Implementation name, for diagnostics only.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The registered constructor.
    pub fn constructor(&self) -> ClientConstructor {
        self.constructor
    }
}

#[derive(Debug, Clone)]
struct Entry {
    class_name: String,
    constructor: ClientConstructor,
}

/// Mapping from version-key string to a registered client constructor.
///
/// Keys are unique; registering a key again replaces the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    entries: BTreeMap<String, Entry>,
}

impl VersionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        VersionRegistry::default()
    }

    /// Registers a constructor under a version key such as `"2.0"` or
    /// `"3"`. The `class_name` is used only for diagnostics.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        class_name: impl Into<String>,
        constructor: ClientConstructor,
    ) {
        self.entries.insert(
            key.into(),
            Entry {
                class_name: class_name.into(),
                constructor,
            },
        );
    }

    /// Looks up the entry registered under the exact `key`.
    pub fn get(&self, key: &str) -> Option<ClientVersion> {
        self.entries.get(key).map(|entry| ClientVersion {
            id: key.to_string(),
            class_name: entry.class_name.clone(),
            constructor: entry.constructor,
        })
    }

    /// Returns the entry able to handle the given major version.
    ///
    /// When several keys share a major, the highest key wins.
    pub fn client_for_major(&self, major: u32) -> Option<ClientVersion> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| {
                let version: ApiVersion = key.parse().ok()?;
                (version.major() == major).then(|| (version, key, entry))
            })
            .max_by_key(|(version, _, _)| *version)
            .map(|(_, key, entry)| ClientVersion {
                id: key.clone(),
                class_name: entry.class_name.clone(),
                constructor: entry.constructor,
            })
    }

    /// The registered version keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether the registry contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the client constructor for the requested API version.
///
/// # Errors
///
/// Returns [`Error::UnsupportedVersion`] carrying the invalid version and
/// the list of valid keys when `version` is not registered.
pub fn get_client_class(
    api_name: &str,
    version: &str,
    version_map: &VersionRegistry,
) -> Result<ClientConstructor, Error> {
    match version_map.get(version) {
        Some(client) => Ok(client.constructor()),
        None => Err(Error::UnsupportedVersion {
            api_name: api_name.to_string(),
            version: version.to_string(),
            available: version_map.keys().map(str::to_string).collect(),
        }),
    }
}

static IDENTITY_API_VERSIONS: LazyLock<VersionRegistry> = LazyLock::new(|| {
    let mut registry = VersionRegistry::new();
    registry.register("2.0", "keystone_client::v2::Client", crate::v2::construct);
    registry.register("3", "keystone_client::v3::Client", crate::v3::construct);
    registry
});

/// The process-wide registry of identity client implementations.
pub fn identity_defaults() -> &'static VersionRegistry {
    &IDENTITY_API_VERSIONS
}
