pub mod clear_cache;
pub mod latest_download;
pub mod latest_version;
pub mod location;
pub mod update_version;
pub mod utils;
