//! Command implementations.

pub mod devices;
pub mod scan;
pub mod status;
pub mod wake;

pub use devices::run_devices;
pub use scan::run_scan;
pub use status::run_status;
pub use wake::run_wake;

use std::path::PathBuf;

use remote_wake_core::storage::{default_data_dir, DeviceRegistry};
use remote_wake_core::types::Device;

use crate::error::{CliError, Result};

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: PathBuf,
    pub json: bool,
}

impl Context {
    /// Use `data_dir` if given, otherwise the platform data directory.
    pub fn new(data_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let data_dir = data_dir
            .or_else(default_data_dir)
            .ok_or_else(|| CliError::Other("Could not determine app data directory".to_string()))?;
        log::debug!("Using data directory {}", data_dir.display());
        Ok(Self { data_dir, json })
    }

    pub fn registry(&self) -> Result<DeviceRegistry> {
        DeviceRegistry::new(self.data_dir.clone()).map_err(CliError::from)
    }
}

/// Find exactly one registered device matching `target`.
pub async fn resolve_device(registry: &DeviceRegistry, target: &str) -> Result<Device> {
    match_one(target, registry.find(target).await?)?
        .ok_or_else(|| CliError::DeviceNotFound(target.to_string()))
}

/// `Ok(None)` when nothing matches; an error when several do.
fn match_one(target: &str, mut matches: Vec<Device>) -> Result<Option<Device>> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        count => Err(CliError::Ambiguous {
            query: target.to_string(),
            count,
        }),
    }
}

/// Like [`resolve_device`] but a missing match is not an error.
pub async fn lookup_device(
    registry: &DeviceRegistry,
    target: &str,
) -> Result<Option<Device>> {
    match_one(target, registry.find(target).await?)
}
