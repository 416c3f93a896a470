// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file handling, grounded on `trx-app::config::ConfigFile`:
//! a TOML file searched CWD → XDG config dir → `/etc`, save-time omission
//! of default-valued fields, and device-type-keyed backend sub-tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sdrrx_core::{AgcParams, ChannelFilterParams, DemodKind, DeviceConfig, FftSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, String),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("failed to write config file {0}: {1}")]
    Write(PathBuf, String),
}

/// Trait for loading configuration files with default search paths, mirroring
/// `trx-app::config::ConfigFile`.
pub trait ConfigFile: Sized + Default {
    fn config_filename() -> &'static str;

    fn load_from_file(path: &Path) -> Result<Self, ConfigError>;

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(Self::config_filename())];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sdrrx").join(Self::config_filename()));
        }
        paths.push(PathBuf::from("/etc/sdrrx").join(Self::config_filename()));
        paths
    }

    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in Self::default_search_paths() {
            if path.exists() {
                let cfg = Self::load_from_file(&path)?;
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }
}

/// `[app]`: process-wide, non-device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSection {
    pub log_level: Option<String>,
    pub fft: FftSettings,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            log_level: None,
            fft: FftSettings {
                size: 4096,
                rate_hz: 25,
            },
        }
    }
}

/// `[sdr_input]` plus demod/channel/AGC parameters that travel with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdrInputSection {
    #[serde(flatten)]
    pub device: DeviceConfig,
    pub demod: DemodKind,
    pub filter: ChannelFilterParams,
    pub agc: AgcParams,
    pub squelch_db: f64,
}

impl Default for SdrInputSection {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            demod: DemodKind::default(),
            filter: ChannelFilterParams {
                low_cut: -2700.0,
                high_cut: 2700.0,
                cw_offset: 0.0,
                sample_rate: 48_000.0,
            },
            agc: AgcParams::default(),
            squelch_db: -100.0,
        }
    }
}

/// Top-level application configuration, `sdr-rx.toml`.
///
/// `backends` holds the raw per-vendor sub-tables (`[rtlsdr]`, `[airspy]`,
/// `[limesdr]`, `[bladerf]`, `[sdrplay]`); this crate's scope ends at
/// dispatching by `device_type`, so those tables are kept opaque and
/// round-tripped rather than given dedicated fields.
///
/// `device_profiles` is a separate, keyed-by-type store of *whole*
/// [`DeviceConfig`] values: `sdr_input.device` is always the config of the
/// device type currently in use, while `device_profiles` remembers the
/// last-used config of every *other* type so switching `device_type` back
/// and forth doesn't clobber settings tuned for one device with another's.
///
/// Deserialized by hand from a raw [`toml::Table`] rather than via derive:
/// `toml`'s serde support does not reliably flatten an arbitrary-key map
/// (`backends`) alongside named struct fields, so sections are extracted
/// individually instead, the same "peek at the table, pull out a section"
/// approach `trx-app::config::load_section_from_file` uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub app: AppSection,
    pub sdr_input: SdrInputSection,
    pub backends: BTreeMap<String, toml::Table>,
    pub device_profiles: BTreeMap<String, DeviceConfig>,
}

impl ConfigFile for AppConfig {
    fn config_filename() -> &'static str {
        "sdr-rx.toml"
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e.to_string()))?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

impl AppConfig {
    fn from_toml_str(text: &str) -> Result<Self, String> {
        let mut table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;

        let app = match table.remove("app") {
            Some(value) => value.try_into().map_err(|e: toml::de::Error| e.to_string())?,
            None => AppSection::default(),
        };
        let sdr_input = match table.remove("sdr_input") {
            Some(value) => value.try_into().map_err(|e: toml::de::Error| e.to_string())?,
            None => SdrInputSection::default(),
        };

        let device_profiles = match table.remove("device_profiles") {
            Some(toml::Value::Table(sub)) => {
                let mut profiles = BTreeMap::new();
                for (type_id, value) in sub {
                    let device: DeviceConfig =
                        value.try_into().map_err(|e: toml::de::Error| e.to_string())?;
                    profiles.insert(type_id, device);
                }
                profiles
            }
            _ => BTreeMap::new(),
        };

        let mut backends = BTreeMap::new();
        for (key, value) in table {
            if let toml::Value::Table(sub) = value {
                backends.insert(key, sub);
            }
        }

        Ok(Self {
            app,
            sdr_input,
            backends,
            device_profiles,
        })
    }

    /// Serializes with default-valued top-level sections omitted: any
    /// section equal to its default is left out of the written file.
    pub fn to_toml_minimal(&self) -> Result<String, ConfigError> {
        let mut table = toml::Table::new();

        if self.app != AppSection::default() {
            let value = toml::Value::try_from(&self.app)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?;
            table.insert("app".to_string(), value);
        }

        let sdr_value = toml::Value::try_from(&self.sdr_input)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        table.insert("sdr_input".to_string(), sdr_value);

        if !self.device_profiles.is_empty() {
            let mut profiles = toml::Table::new();
            for (type_id, device) in &self.device_profiles {
                let value = toml::Value::try_from(device)
                    .map_err(|e| ConfigError::Serialize(e.to_string()))?;
                profiles.insert(type_id.clone(), value);
            }
            table.insert("device_profiles".to_string(), toml::Value::Table(profiles));
        }

        for (name, backend_table) in &self.backends {
            table.insert(name.clone(), toml::Value::Table(backend_table.clone()));
        }

        toml::to_string_pretty(&table).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml_minimal()?;
        std::fs::write(path, text).map_err(|e| ConfigError::Write(path.to_path_buf(), e.to_string()))
    }

    /// Switches the active device type, stashing the outgoing type's config
    /// into its own profile first and restoring the incoming type's last-used
    /// config if one was saved, so neither type's settings leak into the
    /// other's.
    pub fn switch_device_type(&mut self, new_type: &str) {
        if self.sdr_input.device.device_type == new_type {
            return;
        }
        let outgoing_type = self.sdr_input.device.device_type.clone();
        let outgoing_config = std::mem::replace(
            &mut self.sdr_input.device,
            self.device_profiles
                .get(new_type)
                .cloned()
                .unwrap_or_else(|| DeviceConfig {
                    device_type: new_type.to_string(),
                    ..DeviceConfig::default()
                }),
        );
        self.device_profiles.insert(outgoing_type, outgoing_config);
        self.sdr_input.device.device_type = new_type.to_string();
    }
}
