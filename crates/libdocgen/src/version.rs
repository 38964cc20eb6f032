//! Loose SDK version strings such as `0.8`, `3.1.2` or `9.2.0.GA`.

use std::{cmp::Ordering, fmt, str::FromStr};

use semver::Version;

use crate::{DocgenError, Result};

/// A parsed SDK version. Missing components are zero and anything past the
/// patch number is ignored for ordering.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    /// Normalized three-component version.
    version: Version,
    /// The string as written in the docs.
    raw: String,
}

impl ApiVersion {
    /// The string as written in the docs.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.version.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.version.minor
    }
}

impl FromStr for ApiVersion {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let core = raw
            .trim_start_matches('v')
            .split(['-', '+', ' '])
            .next()
            .unwrap_or_default();
        let mut parts = [0u64; 3];
        let mut seen = 0;
        for (idx, part) in core.split('.').take(3).enumerate() {
            parts[idx] = part
                .parse()
                .map_err(|_| DocgenError::InvalidVersion(raw.to_string()))?;
            seen += 1;
        }
        if seen == 0 {
            return Err(DocgenError::InvalidVersion(raw.to_string()));
        }
        Ok(Self {
            version: Version::new(parts[0], parts[1], parts[2]),
            raw: raw.to_string(),
        })
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parses a version string.
pub fn parse_version(s: &str) -> Result<ApiVersion> {
    s.parse()
}

/// Whether `a` is a strictly later version than `b`.
pub fn is_greater(a: &str, b: &str) -> Result<bool> {
    Ok(parse_version(a)? > parse_version(b)?)
}

/// Whether `a` is a strictly earlier version than `b`.
pub fn is_less(a: &str, b: &str) -> Result<bool> {
    Ok(parse_version(a)? < parse_version(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pads_short_versions() {
        let v = parse_version("0.8").unwrap();
        assert_eq!(v.major(), 0);
        assert_eq!(v.minor(), 8);
        assert_eq!(v.to_string(), "0.8");
        assert_eq!(parse_version("0.8.0").unwrap().cmp(&v), Ordering::Equal);
    }

    #[test]
    fn equality_ignores_spelling() {
        let short = parse_version("3.1").unwrap();
        let long = parse_version("3.1.0.GA").unwrap();
        assert_eq!(short, long);
        assert_eq!(short.as_str(), "3.1");
        assert_ne!(short, parse_version("3.1.1").unwrap());
    }

    #[test]
    fn ignores_qualifiers() {
        assert!(is_greater("9.2.0.GA", "9.1.9").unwrap());
        assert!(is_less("3.1", "3.1.2").unwrap());
        assert!(!is_greater("3.1.2", "3.1.2").unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_version("next"),
            Err(DocgenError::InvalidVersion(_))
        ));
        assert!(parse_version("").is_err());
        assert!(parse_version("1.x").is_err());
    }
}
