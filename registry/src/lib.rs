pub mod kv;
pub mod resolver;
pub mod store;
pub mod version;

pub use resolver::{Resolution, ResolveError, resolve, resolve_download};
pub use store::{Registry, RegistryStore, StoreError};
pub use version::{Channel, InvalidTag, VersionTag};
