//! API version identifiers used during negotiation.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Represents a major/minor API version identifier.
///
/// The major component marks a compatibility boundary; the minor component
/// marks additive features within it. A version without an explicit minor
/// (`"3"`) is equivalent to minor zero (`"3.0"`) for comparison purposes,
/// and the `v`-prefixed form used by identity discovery documents
/// (`"v3.14"`) is accepted when parsing.
///
/// # Examples
///
/// ```
/// use keystone_client::version::ApiVersion;
///
/// let version: ApiVersion = "v3.14".parse().unwrap();
/// assert_eq!(version.major(), 3);
/// assert_eq!(version.minor(), Some(14));
/// assert_eq!("3.14", version.to_string());
///
/// assert_eq!("3".parse::<ApiVersion>(), "3.0".parse::<ApiVersion>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ApiVersion {
    major: u32,
    minor: Option<u32>,
}

/// An error that can arise parsing an API version identifier.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum ApiVersionError {
    /// An empty string cannot be parsed as a version.
    #[error("version identifier cannot be empty")]
    Empty,

    /// A version component is not an unsigned number.
    #[error("version component '{0}' is not a number")]
    InvalidComponent(String),

    /// A version identifier has at most a major and a minor component.
    #[error("version identifier has too many components")]
    TooManyComponents,
}

impl ApiVersion {
    /// Returns a version with the given major component and no minor.
    pub const fn major_version(major: u32) -> Self {
        ApiVersion { major, minor: None }
    }

    /// Returns a version with the given major and minor components.
    pub const fn new(major: u32, minor: u32) -> Self {
        ApiVersion {
            major,
            minor: Some(minor),
        }
    }

    /// The major component.
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// The minor component, if one was given.
    pub const fn minor(&self) -> Option<u32> {
        self.minor
    }

    /// The minor component, treating an absent minor as zero.
    pub const fn minor_or_zero(&self) -> u32 {
        match self.minor {
            Some(minor) => minor,
            None => 0,
        }
    }

    /// Attempts to parse a version identifier.
    ///
    /// Accepts `"3"`, `"3.1"` and the `v`-prefixed discovery form
    /// (`"v3.1"`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiVersionError`] variant if the input is empty, has
    /// more than two components, or a component is not a number.
    pub fn parse(id: &str) -> Result<Self, ApiVersionError> {
        if id.is_empty() {
            return Err(ApiVersionError::Empty);
        }

        let digits = id.strip_prefix('v').unwrap_or(id);

        let mut components = digits.split('.');
        let major = parse_component(components.next().unwrap_or_default())?;
        let minor = components.next().map(parse_component).transpose()?;

        if components.next().is_some() {
            return Err(ApiVersionError::TooManyComponents);
        }

        Ok(ApiVersion { major, minor })
    }
}

fn parse_component(component: &str) -> Result<u32, ApiVersionError> {
    component
        .parse()
        .map_err(|_| ApiVersionError::InvalidComponent(component.to_string()))
}

impl FromStr for ApiVersion {
    type Err = ApiVersionError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(id)
    }
}

impl From<(u32, u32)> for ApiVersion {
    fn from((major, minor): (u32, u32)) -> Self {
        ApiVersion::new(major, minor)
    }
}

impl From<u32> for ApiVersion {
    fn from(major: u32) -> Self {
        ApiVersion::major_version(major)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

// Comparisons treat an absent minor as zero, so "3" == "3.0". The manual
// impls keep Eq, Ord and Hash consistent with each other.

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        (self.major, self.minor_or_zero()) == (other.major, other.minor_or_zero())
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.major, self.minor_or_zero()).hash(state);
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.major, self.minor_or_zero()).cmp(&(other.major, other.minor_or_zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiVersion, ApiVersionError};

    #[test]
    fn parse_major_only() {
        let version = ApiVersion::parse("3").unwrap();
        assert_eq!(version.major(), 3);
        assert_eq!(version.minor(), None);
        assert_eq!("3", version.to_string());
    }

    #[test]
    fn parse_major_minor() {
        let version = ApiVersion::parse("2.0").unwrap();
        assert_eq!(version.major(), 2);
        assert_eq!(version.minor(), Some(0));
        assert_eq!("2.0", version.to_string());
    }

    #[test]
    fn parse_discovery_form() {
        let version = ApiVersion::parse("v3.14").unwrap();
        assert_eq!(version, ApiVersion::new(3, 14));
        assert_eq!("3.14", version.to_string());
    }

    #[test]
    fn absent_minor_is_zero() {
        assert_eq!(ApiVersion::major_version(3), ApiVersion::new(3, 0));
        assert!(ApiVersion::new(3, 1) > ApiVersion::major_version(3));
    }

    #[test]
    fn ordering_is_major_then_minor() {
        assert!(ApiVersion::new(3, 0) > ApiVersion::new(2, 9));
        assert!(ApiVersion::new(3, 14) > ApiVersion::new(3, 2));
        assert!(ApiVersion::new(3, 2) < ApiVersion::new(3, 14));
    }

    #[test]
    fn from_tuple_and_major() {
        assert_eq!(ApiVersion::from((3, 1)), ApiVersion::new(3, 1));
        assert_eq!(ApiVersion::from(2), ApiVersion::major_version(2));
    }

    macro_rules! parse_error_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (input, expected_error) = $value;
                    let err = ApiVersion::parse(input).unwrap_err();
                    assert_eq!(err, expected_error);
                }
            )*
        }
    }

    parse_error_tests! {
        parse_empty: ("", ApiVersionError::Empty),
        parse_bare_prefix: ("v", ApiVersionError::InvalidComponent(String::new())),
        parse_non_numeric_major: ("three", ApiVersionError::InvalidComponent("three".to_string())),
        parse_non_numeric_minor: ("3.x", ApiVersionError::InvalidComponent("x".to_string())),
        parse_negative_major: ("-3", ApiVersionError::InvalidComponent("-3".to_string())),
        parse_too_many_components: ("3.1.4", ApiVersionError::TooManyComponents),
        parse_trailing_dot: ("3.", ApiVersionError::InvalidComponent(String::new())),
    }
}
