//! Protected-partition mount lifecycle.
//!
//! Which variant to use is configuration the core is told, never something
//! it detects itself.

use crate::common::config::Loader;
use crate::common::errors::MountError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Live mount of the protected-storage partition.
#[derive(Debug)]
pub struct MountHandle {
    root: PathBuf,
}

impl MountHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        tracing::debug!(root = %self.root.display(), "unmounted protected storage");
    }
}

/// Mount operation for the protected-storage partition.
#[async_trait]
pub trait Mounter: Send + Sync {
    async fn mount(&self, variant: Loader) -> Result<MountHandle, MountError>;
}

/// Host implementation: binds the configured mount point.
pub struct HostMounter {
    root: PathBuf,
    device: Option<PathBuf>,
}

impl HostMounter {
    pub fn new(root: PathBuf, device: Option<PathBuf>) -> Self {
        Self { root, device }
    }
}

#[async_trait]
impl Mounter for HostMounter {
    async fn mount(&self, variant: Loader) -> Result<MountHandle, MountError> {
        if variant == Loader::Explicit && self.device.is_none() {
            return Err(MountError::DeviceMissing);
        }

        let meta = fs::metadata(&self.root)
            .await
            .map_err(|_| MountError::RootUnavailable(self.root.display().to_string()))?;
        if !meta.is_dir() {
            return Err(MountError::RootUnavailable(self.root.display().to_string()));
        }

        tracing::info!(
            root = %self.root.display(),
            device = ?self.device.as_ref().filter(|_| variant == Loader::Explicit),
            "mounted protected storage"
        );

        Ok(MountHandle {
            root: self.root.clone(),
        })
    }
}
