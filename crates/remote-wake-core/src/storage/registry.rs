//! Device registry.
//!
//! Devices and settings share one `config.json` in the data directory:
//!
//! ```json
//! { "settings": { ... }, "devices": [ {"id": "...", "name": "NAS", "mac": "AA:BB:CC:DD:EE:FF", "ip": "192.168.1.20"} ] }
//! ```
//!
//! Every mutation rewrites the whole file.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::settings::Settings;
use crate::types::{Device, DeviceId, DeviceUpdate, MacAddress, NewDevice};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum device name length
const MAX_NAME_LENGTH: usize = 64;

/// Shortest id prefix accepted by [`DeviceRegistry::find`].
const MIN_ID_PREFIX: usize = 4;

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub devices: Vec<Device>,
    /// Keys this version does not use, kept as-is across rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Device records that could not be read. Written back after `devices`.
    #[serde(skip)]
    pub unreadable: Vec<Value>,
}

/// Device record as read from disk; older files have no `id`.
#[derive(Deserialize)]
struct StoredDevice {
    id: Option<DeviceId>,
    name: String,
    mac: MacAddress,
    ip: Ipv4Addr,
}

#[derive(Deserialize)]
struct StoredConfig {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    devices: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// File-backed registry of wakeable devices.
///
/// Takes a `PathBuf` in the constructor so each consumer can choose where
/// the data directory lives.
pub struct DeviceRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DeviceRegistry {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::DirectoryAccess(format!("{}: {}", dir.display(), e)))?;

        Ok(Self {
            path: dir.join(CONFIG_FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `config.json`, creating it with defaults on first use.
    ///
    /// Devices stored without an identifier get one, and the file is
    /// rewritten so the identifiers stay stable. Records that do not parse
    /// are skipped with a warning and left in the file untouched.
    pub async fn load(&self) -> Result<PanelConfig, StorageError> {
        if !self.path.exists() {
            let config = PanelConfig::default();
            self.write(&config).await?;
            log::info!("Created {}", self.path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(StorageError::Io)?;
        let stored: StoredConfig =
            serde_json::from_str(&content).map_err(StorageError::Serialization)?;

        let mut migrated = 0;
        let mut devices = Vec::with_capacity(stored.devices.len());
        let mut unreadable = Vec::new();

        for raw in stored.devices {
            let d = match StoredDevice::deserialize(&raw) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("Skipping unreadable device record {}: {}", raw, e);
                    unreadable.push(raw);
                    continue;
                }
            };
            devices.push(Device {
                id: d.id.unwrap_or_else(|| {
                    migrated += 1;
                    DeviceId::new()
                }),
                name: d.name,
                mac: d.mac,
                ip: d.ip,
            });
        }

        let config = PanelConfig {
            settings: stored.settings,
            devices,
            extra: stored.extra,
            unreadable,
        };

        if migrated > 0 {
            log::info!("Assigned identifiers to {} stored devices", migrated);
            self.write(&config).await?;
        }

        Ok(config)
    }

    pub async fn settings(&self) -> Result<Settings, StorageError> {
        Ok(self.load().await?.settings)
    }

    pub async fn list(&self) -> Result<Vec<Device>, StorageError> {
        Ok(self.load().await?.devices)
    }

    pub async fn get(&self, id: DeviceId) -> Result<Option<Device>, StorageError> {
        Ok(self.list().await?.into_iter().find(|d| d.id == id))
    }

    /// Devices matching `query` by id, id prefix, name (case-insensitive),
    /// IP or MAC, in registry order.
    pub async fn find(&self, query: &str) -> Result<Vec<Device>, StorageError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let ip = query.parse::<Ipv4Addr>().ok();
        let mac = query.parse::<MacAddress>().ok();
        let lower = query.to_lowercase();

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|d| {
                let id = d.id.to_string();
                id == lower
                    || (lower.len() >= MIN_ID_PREFIX && id.starts_with(&lower))
                    || d.name.to_lowercase() == lower
                    || Some(d.ip) == ip
                    || Some(d.mac) == mac
            })
            .collect())
    }

    pub async fn add(&self, new: NewDevice) -> Result<Device, StorageError> {
        let device = Device {
            id: DeviceId::new(),
            name: validate_name(&new.name)?,
            mac: new.mac.parse()?,
            ip: parse_ip(&new.ip)?,
        };

        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        config.devices.push(device.clone());
        self.write(&config).await?;

        log::debug!("Added device {} ({})", device.name, device.id);
        Ok(device)
    }

    pub async fn update(&self, id: DeviceId, update: DeviceUpdate) -> Result<Device, StorageError> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let mac = update.mac.as_deref().map(str::parse::<MacAddress>).transpose()?;
        let ip = update.ip.as_deref().map(parse_ip).transpose()?;

        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        let device = config
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        if let Some(name) = name {
            device.name = name;
        }
        if let Some(mac) = mac {
            device.mac = mac;
        }
        if let Some(ip) = ip {
            device.ip = ip;
        }
        let updated = device.clone();

        self.write(&config).await?;
        Ok(updated)
    }

    pub async fn remove(&self, id: DeviceId) -> Result<Device, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        let index = config
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        let removed = config.devices.remove(index);

        self.write(&config).await?;
        log::debug!("Removed device {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    async fn write(&self, config: &PanelConfig) -> Result<(), StorageError> {
        let mut value = serde_json::to_value(config).map_err(StorageError::Serialization)?;
        if let Some(Value::Array(devices)) = value.get_mut("devices") {
            devices.extend(config.unreadable.iter().cloned());
        }
        let content = serde_json::to_string_pretty(&value).map_err(StorageError::Serialization)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await.map_err(StorageError::Io)?;
        fs::rename(&tmp, &self.path).await.map_err(StorageError::Io)?;

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, StorageError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(StorageError::InvalidName(
            "Name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(StorageError::InvalidName(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }

    Ok(name.to_string())
}

fn parse_ip(ip: &str) -> Result<Ipv4Addr, StorageError> {
    ip.trim()
        .parse()
        .map_err(|_| StorageError::InvalidAddress(format!("'{}' is not an IPv4 address", ip)))
}
