//! Channel resolution over a registry snapshot.
//!
//! Pure functions of their input: calling them twice on the same snapshot
//! yields identical output. "Latest" is always the semver maximum of the
//! channel's versions; the order versions were registered in plays no part.

use crate::store::Registry;
use crate::version::{Channel, VersionTag};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No versions exist")]
    NoVersionsExist,
}

/// Outcome of resolving a channel's latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub latest: VersionTag,
    /// Set when the stable channel has a release newer than the latest beta.
    /// In that case `latest` is the stable tag: a stable release that
    /// supersedes the beta branch is the version beta users should move to.
    pub beta_has_newer_stable: bool,
}

impl Resolution {
    /// Whether the resolved latest is strictly newer than `queried`.
    pub fn newer_than(&self, queried: &VersionTag) -> bool {
        self.latest > *queried
    }
}

pub fn resolve(registry: &Registry, channel: Channel) -> Result<Resolution, ResolveError> {
    let latest_stable = registry.latest_in(Channel::Stable);

    match channel {
        Channel::Stable => {
            let latest = latest_stable.ok_or(ResolveError::NoVersionsExist)?;
            Ok(Resolution {
                latest: latest.clone(),
                beta_has_newer_stable: false,
            })
        }
        Channel::Beta => {
            let latest_beta = registry
                .latest_in(Channel::Beta)
                .ok_or(ResolveError::NoVersionsExist)?;

            match latest_stable {
                Some(stable) if stable > latest_beta => Ok(Resolution {
                    latest: stable.clone(),
                    beta_has_newer_stable: true,
                }),
                _ => Ok(Resolution {
                    latest: latest_beta.clone(),
                    beta_has_newer_stable: false,
                }),
            }
        }
    }
}

/// Resolve the version to serve for downloads: the latest stable release when
/// any exists, otherwise the latest beta.
pub fn resolve_download(registry: &Registry) -> Result<(VersionTag, Channel), ResolveError> {
    if let Some(latest) = registry.latest_in(Channel::Stable) {
        return Ok((latest.clone(), Channel::Stable));
    }

    registry
        .latest_in(Channel::Beta)
        .map(|tag| (tag.clone(), Channel::Beta))
        .ok_or(ResolveError::NoVersionsExist)
}
