//! Durable registry of released versions.
//!
//! The authoritative state is a single JSON mapping from tag to channel under
//! the `all-versions` key, plus two advisory pointer keys caching the latest
//! tag per channel. The pointers are always re-derivable from the mapping and
//! are recomputed by comparison on every write; nothing trusts them for
//! correctness.

use crate::kv::{KvError, KvStore};
use crate::version::{Channel, InvalidTag, VersionTag};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ALL_VERSIONS_KEY: &str = "all-versions";
pub const LATEST_STABLE_KEY: &str = "latest-stable";
pub const LATEST_BETA_KEY: &str = "latest-beta";

const fn pointer_key(channel: Channel) -> &'static str {
    match channel {
        Channel::Stable => LATEST_STABLE_KEY,
        Channel::Beta => LATEST_BETA_KEY,
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("version {0} already exists")]
    AlreadyExists(VersionTag),

    #[error("kv error: {0}")]
    Kv(#[from] KvError),

    #[error("corrupt registry payload: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("corrupt channel pointer: {0}")]
    CorruptPointer(#[from] InvalidTag),
}

/// Mapping from version tag to the channel it was released on.
///
/// Keys are unique. The map keeps insertion order so the persisted JSON is
/// stable across writes, but "latest" is always computed by semantic-version
/// comparison, never by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry(IndexMap<VersionTag, Channel>);

impl Registry {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &VersionTag) -> bool {
        self.0.contains_key(tag)
    }

    pub fn channel_of(&self, tag: &VersionTag) -> Option<Channel> {
        self.0.get(tag).copied()
    }

    pub fn insert(&mut self, tag: VersionTag, channel: Channel) -> Option<Channel> {
        self.0.insert(tag, channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VersionTag, &Channel)> {
        self.0.iter()
    }

    pub fn versions_in(&self, channel: Channel) -> impl Iterator<Item = &VersionTag> {
        self.0
            .iter()
            .filter(move |(_, c)| **c == channel)
            .map(|(tag, _)| tag)
    }

    /// Latest version on `channel` by semver precedence.
    pub fn latest_in(&self, channel: Channel) -> Option<&VersionTag> {
        self.versions_in(channel).max()
    }
}

impl FromIterator<(VersionTag, Channel)> for Registry {
    fn from_iter<I: IntoIterator<Item = (VersionTag, Channel)>>(iter: I) -> Self {
        Registry(iter.into_iter().collect())
    }
}

/// Handle to the persisted registry.
///
/// Cheap to clone; passed into handlers explicitly rather than living in a
/// process-wide global.
#[derive(Clone)]
pub struct RegistryStore {
    kv: Arc<dyn KvStore>,
}

impl RegistryStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        RegistryStore { kv }
    }

    /// Read the full registry. `None` means nothing has ever been written.
    pub async fn get_all(&self) -> Result<Option<Registry>, StoreError> {
        match self.kv.get(ALL_VERSIONS_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Insert `tag` on `channel` and persist the updated mapping, then
    /// refresh the channel pointer.
    ///
    /// The read-modify-write has no isolation: the backing store offers no
    /// compare-and-swap, so two registrations racing on the same snapshot are
    /// last-writer-wins on the whole mapping.
    pub async fn register(
        &self,
        tag: VersionTag,
        channel: Channel,
    ) -> Result<Registry, StoreError> {
        let mut registry = self.get_all().await?.unwrap_or_default();

        if registry.contains(&tag) {
            return Err(StoreError::AlreadyExists(tag));
        }

        tracing::info!(tag = %tag, channel = %channel, "registering version");
        registry.insert(tag, channel);

        let payload = serde_json::to_string(&registry)?;
        self.kv.put(ALL_VERSIONS_KEY, &payload).await?;

        // The pointer is recomputed from the updated mapping rather than set
        // to the inserted tag, so registering an old version out of order can
        // never move it backwards.
        if let Some(latest) = registry.latest_in(channel) {
            let latest = latest.clone();
            self.set_channel_pointer(channel, &latest).await?;
        }

        Ok(registry)
    }

    /// Cached latest tag for `channel`. Advisory only: it may be stale
    /// relative to a full recomputation, and callers that need correctness
    /// resolve from the registry instead.
    pub async fn channel_pointer(
        &self,
        channel: Channel,
    ) -> Result<Option<VersionTag>, StoreError> {
        match self.kv.get(pointer_key(channel)).await? {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }

    pub async fn set_channel_pointer(
        &self,
        channel: Channel,
        tag: &VersionTag,
    ) -> Result<(), StoreError> {
        self.kv.put(pointer_key(channel), tag.as_str()).await?;
        Ok(())
    }
}
