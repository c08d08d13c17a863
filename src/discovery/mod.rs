//! Service version discovery.
//!
//! An identity service enumerates the API versions it speaks in a
//! discovery document. The unversioned root answers with a list (and,
//! historically, a 300 Multiple Choices status); a versioned endpoint
//! answers with a single entry. Both shapes are accepted here.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::session::{Session, SessionError};
use crate::version::{ApiVersion, ApiVersionError};

const SELF_REL: &str = "self";

/// Errors produced while fetching or decoding a discovery document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// The discovery URL could not be parsed.
    #[error("invalid discovery URL: {0}")]
    Url(#[from] url::ParseError),

    /// The discovery request failed at the transport level.
    #[error(transparent)]
    Transport(#[from] SessionError),

    /// The service answered with a status outside 2xx/300.
    #[error("unexpected discovery status code {0}")]
    UnexpectedStatus(u16),

    /// The discovery document could not be decoded.
    #[error("malformed discovery document: {0}")]
    Json(#[from] serde_json::Error),

    /// The chosen version reports no `self` link.
    #[error("version '{id}' reports no 'self' link")]
    MissingSelfLink {
        /// Identifier of the offending version entry.
        id: String,
    },
}

/// Server-reported stability marker for an advertised version.
///
/// `stable`, `current` and `supported` count as stable; everything else,
/// including markers this library does not know, is treated as unstable
/// and excluded from negotiation unless the caller opts in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum VersionStatus {
    /// Recommended for production use.
    Stable,
    /// The newest version the service offers.
    Current,
    /// Still served, no longer the newest.
    Supported,
    /// Scheduled for removal.
    Deprecated,
    /// Not yet ready for production use.
    Experimental,
    /// A marker this library does not know.
    Other(String),
}

impl VersionStatus {
    /// Whether the marker counts as stable for negotiation purposes.
    pub fn is_stable(&self) -> bool {
        matches!(
            self,
            VersionStatus::Stable | VersionStatus::Current | VersionStatus::Supported
        )
    }
}

impl From<String> for VersionStatus {
    fn from(marker: String) -> Self {
        match marker.to_ascii_lowercase().as_str() {
            "stable" => VersionStatus::Stable,
            "current" => VersionStatus::Current,
            "supported" => VersionStatus::Supported,
            "deprecated" => VersionStatus::Deprecated,
            "experimental" => VersionStatus::Experimental,
            _ => VersionStatus::Other(marker),
        }
    }
}

/// A relation/URL pair attached to an advertised version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    rel: String,
    href: String,
}

impl Link {
    /// The relation name, e.g. `"self"`.
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// The link target.
    pub fn href(&self) -> &str {
        &self.href
    }
}

/// One API version advertised by the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceVersion {
    id: String,
    status: VersionStatus,
    #[serde(default)]
    links: Vec<Link>,
}

impl ServiceVersion {
    /// The raw version identifier as reported by the service, e.g. `"v3.14"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The server-reported stability marker.
    pub fn status(&self) -> &VersionStatus {
        &self.status
    }

    /// The links attached to this version.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Parses the identifier into an [`ApiVersion`].
    ///
    /// # Errors
    ///
    /// Returns an [`ApiVersionError`] if the identifier is not a
    /// major/minor version.
    pub fn api_version(&self) -> Result<ApiVersion, ApiVersionError> {
        self.id.parse()
    }

    /// The canonical base URL for this version, when the service reports
    /// a `self` link.
    pub fn self_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == SELF_REL)
            .map(|link| link.href.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Versions {
        versions: VersionList,
    },
    Version {
        version: Box<ServiceVersion>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VersionList {
    Wrapped { values: Vec<ServiceVersion> },
    Flat(Vec<ServiceVersion>),
}

/// Decodes a discovery document into the advertised versions.
///
/// # Errors
///
/// Returns [`DiscoveryError::Json`] when the body matches neither
/// document shape.
pub fn parse_document(body: &[u8]) -> Result<Vec<ServiceVersion>, DiscoveryError> {
    let document: Document = serde_json::from_slice(body)?;
    Ok(match document {
        Document::Versions {
            versions: VersionList::Wrapped { values },
        } => values,
        Document::Versions {
            versions: VersionList::Flat(values),
        } => values,
        Document::Version { version } => vec![*version],
    })
}

/// Fetches the discovery document from `auth_url` through the session.
///
/// 2xx responses and 300 Multiple Choices (the historical answer of the
/// unversioned root) are accepted.
///
/// # Errors
///
/// Returns a [`DiscoveryError`] if the URL is invalid, the transport
/// fails, the status is unexpected, or the document cannot be decoded.
pub async fn fetch(
    session: &dyn Session,
    auth_url: &str,
) -> Result<Vec<ServiceVersion>, DiscoveryError> {
    let url = Url::parse(auth_url)?;
    let response = session.get(&url).await?;

    let status = response.status();
    if !(200..300).contains(&status) && status != 300 {
        return Err(DiscoveryError::UnexpectedStatus(status));
    }

    parse_document(response.body())
}
