//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment < CLI
use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Transfer buffer size of the reference tool, 0x80000 bytes.
pub const DEFAULT_BUFFER_SIZE: u64 = 512 * 1024;
pub const MAX_BUFFER_SIZE: u64 = 64 * 1024 * 1024;
const MAX_PAUSE_MS: u64 = 30_000;

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "themevault")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("themevault.toml"))
}

/// Which signal the region resolver consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Open each known asset path for read; first that opens wins.
    #[default]
    Probe,
    /// Match the installed system menu title id against the known ids.
    Title,
}

/// How the loader expects the protected partition to be mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    /// Mount needs an explicit device path.
    #[default]
    Explicit,
    /// Mount resolves the device itself.
    Implicit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Mount point of the protected-storage partition
    pub protected_root: PathBuf,
    /// Mount point of the removable media
    pub media_root: PathBuf,
    /// Device node for [`Loader::Explicit`] mounts
    pub device_path: Option<PathBuf>,
    /// Backup file name on the removable media
    pub backup_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            protected_root: PathBuf::from("/vol/storage_slccmpt01"),
            media_root: PathBuf::from("/vol/external01"),
            device_path: Some(PathBuf::from("/dev/slccmpt01")),
            backup_file: "dump.app".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Transfer buffer size in bytes
    pub buffer_size: u64,
    /// Display pause after a transfer attempt, in milliseconds
    pub pause_ms: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            pause_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiSettings {
    pub show_hints: bool,
}

impl Default for TuiSettings {
    fn default() -> Self {
        Self { show_hints: true }
    }
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: Strategy,
    pub loader: Loader,
    /// Installed menu title id for [`Strategy::Title`], when the host
    /// cannot discover it itself.
    pub menu_title_id: Option<u64>,
    pub storage: StorageSettings,
    pub transfer: TransferSettings,
    pub tui: TuiSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            loader: Loader::default(),
            menu_title_id: None,
            storage: StorageSettings::default(),
            transfer: TransferSettings::default(),
            tui: TuiSettings::default(),
        }
    }
}

impl AppConfig {
    /// Fixed well-known backup file on the removable media.
    pub fn backup_path(&self) -> PathBuf {
        self.storage.media_root.join(&self.storage.backup_file)
    }

    /// Validates bounds and rejects unusable values.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.transfer.buffer_size > 0,
            "Invalid config: transfer.buffer_size must be > 0"
        );
        ensure!(
            self.transfer.buffer_size <= MAX_BUFFER_SIZE,
            "Invalid config: transfer.buffer_size must be <= {MAX_BUFFER_SIZE}"
        );
        ensure!(
            self.transfer.pause_ms <= MAX_PAUSE_MS,
            "Invalid config: transfer.pause_ms must be <= {MAX_PAUSE_MS}"
        );
        ensure!(
            !self.storage.backup_file.trim().is_empty(),
            "Invalid config: storage.backup_file must not be empty"
        );
        ensure!(
            self.loader != Loader::Explicit || self.storage.device_path.is_some(),
            "Invalid config: loader \"explicit\" requires storage.device_path"
        );
        Ok(())
    }
}

/// Runtime overrides collected from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub strategy: Option<Strategy>,
    pub loader: Option<Loader>,
    pub protected_root: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
}

/// Loads config from defaults/file/env, then applies CLI overrides.
pub fn load_config(overrides: &ConfigOverrides) -> Result<AppConfig> {
    load_config_from(&config_path(), overrides)
}

pub fn load_config_from(path: &Path, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("THEMEVAULT_").split("__"))
        .extract()
        .context("Failed to load configuration")?;

    if let Some(strategy) = overrides.strategy {
        config.strategy = strategy;
    }
    if let Some(loader) = overrides.loader {
        config.loader = loader;
    }
    if let Some(root) = &overrides.protected_root {
        config.storage.protected_root = root.clone();
    }
    if let Some(root) = &overrides.media_root {
        config.storage.media_root = root.clone();
    }

    config.validate()?;

    Ok(config)
}
