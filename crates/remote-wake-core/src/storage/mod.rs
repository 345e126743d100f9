//! Storage for the device registry and settings.

pub mod registry;

pub use registry::{DeviceRegistry, PanelConfig, CONFIG_FILE_NAME};

/// Get the default data directory for remote-wake.
///
/// Uses the `directories` crate to find the appropriate platform-specific
/// data directory. `config.json` and `status_cache.json` live here.
pub fn default_data_dir() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "remote-wake", "remote-wake")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
