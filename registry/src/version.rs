use regex::Regex;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

/// Syntax gate for release tags: `v<major>.<minor>.<patch>[-<prerelease>]`.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+(-[0-9A-Za-z.]+)?$").expect("valid tag pattern"));

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid version tag: {0}")]
pub struct InvalidTag(pub String);

/// Release track a version was published on. Assigned once at registration
/// time from the release's prerelease flag and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Beta,
}

impl Channel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
        }
    }

    pub fn from_release(prerelease: bool) -> Self {
        if prerelease { Channel::Beta } else { Channel::Stable }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated release tag such as `v1.2.3` or `v1.2.3-beta.1`.
///
/// Keeps the raw string for the wire and the parsed form for ordering.
/// Ordering is semantic-version precedence: numeric fields compare
/// numerically (`v10.0.0 > v9.0.0`) and a prerelease sorts before the
/// release it precedes. Lexical comparison of tags is wrong for multi-digit
/// components and is never used.
#[derive(Debug, Clone)]
pub struct VersionTag {
    raw: String,
    parsed: Version,
}

impl VersionTag {
    /// Whether `tag` is a well-formed version tag.
    ///
    /// A tag must match the `v<major>.<minor>.<patch>[-<prerelease>]` pattern
    /// and parse as a semantic version, so every accepted tag is totally
    /// ordered by semver precedence.
    pub fn is_valid(tag: &str) -> bool {
        tag.parse::<VersionTag>().is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn version(&self) -> &Version {
        &self.parsed
    }
}

impl FromStr for VersionTag {
    type Err = InvalidTag;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        if !TAG_PATTERN.is_match(tag) {
            return Err(InvalidTag(tag.to_string()));
        }

        let parsed = Version::parse(&tag[1..]).map_err(|_| InvalidTag(tag.to_string()))?;
        Ok(VersionTag {
            raw: tag.to_string(),
            parsed,
        })
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for VersionTag {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for VersionTag {}

impl Hash for VersionTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for VersionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> VersionTag {
        s.parse().unwrap()
    }

    #[test]
    fn test_valid_tags() {
        for t in ["v1.2.3", "v0.0.1", "v10.20.30", "v1.2.3-beta.1", "v2.0.0-rc.2"] {
            assert!(VersionTag::is_valid(t), "{t} should be valid");
        }
    }

    #[test]
    fn test_invalid_tags() {
        let cases = [
            "1.2.3",         // missing v prefix
            "v1.2",          // missing patch
            "v1",            // missing minor and patch
            "v1.2.3.4",      // too many segments
            "va.b.c",        // non-numeric segments
            "v1.2.3-",       // empty prerelease
            "v1.2.3-beta!",  // illegal prerelease character
            "v1.2.3+build",  // build metadata is not part of the tag grammar
            "v1.2.3-01",     // leading zero in numeric prerelease identifier
            "",
        ];
        for t in cases {
            assert!(!VersionTag::is_valid(t), "{t} should be invalid");
        }
    }

    #[test]
    fn test_numeric_ordering_not_lexical() {
        assert!(tag("v10.0.0") > tag("v9.0.0"));
        assert!(tag("v1.10.0") > tag("v1.9.0"));
        assert!(tag("v0.0.10") > tag("v0.0.9"));
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert!(tag("v1.2.3-beta.1") < tag("v1.2.3"));
        assert!(tag("v1.2.3-alpha") < tag("v1.2.3-beta"));
        assert!(tag("v1.2.3-beta.1") < tag("v1.2.3-beta.2"));
        // A later prerelease still beats an earlier release.
        assert!(tag("v1.3.0-beta.1") > tag("v1.2.9"));
    }

    #[test]
    fn test_channel_from_release() {
        assert_eq!(Channel::from_release(true), Channel::Beta);
        assert_eq!(Channel::from_release(false), Channel::Stable);
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = tag("v1.2.3-beta.1");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"v1.2.3-beta.1\"");
        let back: VersionTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);

        assert!(serde_json::from_str::<VersionTag>("\"1.2.3\"").is_err());
    }
}
