//! Startup compatibility gate.
//!
//! The driver itself is pinned by Cargo, so the only version that can still be
//! wrong when the program starts is the server's.

use std::fmt;

use mongodb::Client;
use thiserror::Error;

use crate::db_mongo;

pub const MIN_SERVER_VERSION: Version = Version { major: 4, minor: 2, patch: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("ERROR - MongoDB server did not report a version - make sure MONGODB_URI points at a mongod or mongos")]
    Missing,
    #[error("ERROR - could not parse MongoDB server version {0:?} - make sure MONGODB_URI points at a mongod or mongos")]
    Unparsable(String),
    #[error("ERROR - this example requires MongoDB {required} or higher, found {found} - upgrade the server or point MONGODB_URI at a newer one")]
    TooOld { found: Version, required: Version },
}

impl Version {
    /// Parse `major.minor[.patch]`, ignoring build metadata (`+...`) and
    /// pre-release tags (`-...`).
    pub fn parse(raw: &str) -> Option<Self> {
        let core = raw.trim().split('+').next()?.split('-').next()?;
        let mut parts = core.split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };

        Some(Self { major, minor, patch })
    }
}

/// Check a reported server version against `required`.
pub fn check(reported: Option<&str>, required: Version) -> Result<Version, VersionError> {
    let raw = reported.ok_or(VersionError::Missing)?;
    let found = Version::parse(raw).ok_or_else(|| VersionError::Unparsable(raw.to_string()))?;

    if found < required {
        return Err(VersionError::TooOld { found, required });
    }
    Ok(found)
}

/// Abort startup unless the connected server is new enough.
pub async fn ensure_compatible(client: &Client) -> anyhow::Result<Version> {
    let reported = db_mongo::server_version(client).await?;
    let version = check(reported.as_deref(), MIN_SERVER_VERSION)?;

    tracing::info!("MongoDB server version {} (minimum {})", version, MIN_SERVER_VERSION);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!(Version::parse("7.0.2"), Some(Version { major: 7, minor: 0, patch: 2 }));
        assert_eq!(Version::parse("4.2.0+abc"), Some(Version { major: 4, minor: 2, patch: 0 }));
        assert_eq!(Version::parse("4.4.0-rc1"), Some(Version { major: 4, minor: 4, patch: 0 }));
        assert_eq!(Version::parse("5.0"), Some(Version { major: 5, minor: 0, patch: 0 }));
        assert_eq!(Version::parse("garbage"), None);
        assert_eq!(Version::parse(""), None);
    }

    #[test]
    fn test_check_accepts_minimum_and_newer() {
        assert!(check(Some("4.2.0"), MIN_SERVER_VERSION).is_ok());
        assert!(check(Some("8.0.4"), MIN_SERVER_VERSION).is_ok());
    }

    #[test]
    fn test_check_rejects_old_server() {
        let err = check(Some("4.0.28"), MIN_SERVER_VERSION).unwrap_err();
        assert!(matches!(err, VersionError::TooOld { .. }));
        assert!(err.to_string().contains("requires MongoDB 4.2.0 or higher"));
    }

    #[test]
    fn test_check_rejects_missing_and_unparsable() {
        assert!(matches!(check(None, MIN_SERVER_VERSION), Err(VersionError::Missing)));
        assert!(matches!(
            check(Some("not-a-version"), MIN_SERVER_VERSION),
            Err(VersionError::Unparsable(_))
        ));
    }
}
