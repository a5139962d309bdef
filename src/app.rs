//! Runtime lifecycle: mount, resolve, run triggered cycles, shutdown.

use crate::common::config::{AppConfig, Strategy};
use crate::common::progress::{Direction, StageObserver, TransferOutcome};
use crate::platform::mount::{HostMounter, MountHandle, Mounter};
use crate::platform::storage::{HostStorage, Storage};
use crate::platform::title::ConfiguredTitle;
use crate::region::{
    DetectStrategy, ExistenceProbe, RegionResolver, RegionTable, ResolvedLocator, TitleLookup,
};
use crate::transfer::{TransferEngine, TransferRequest};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// TUI can be disabled for debugging or scripted runs.
pub fn no_tui_enabled() -> bool {
    std::env::var("NO_TUI").is_ok()
}

/// Outcome of one user-triggered cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The resolver produced no locator; the transfer was not attempted.
    Blocked,
    Ran(TransferOutcome),
}

/// Collaborators wired together for the lifetime of the process.
pub struct App {
    config: AppConfig,
    resolver: RegionResolver,
    engine: TransferEngine,
    _mount: Option<MountHandle>,
}

impl App {
    /// Mount protected storage and assemble collaborators from config.
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let mounter = HostMounter::new(
            config.storage.protected_root.clone(),
            config.storage.device_path.clone(),
        );
        let mount = mounter
            .mount(config.loader)
            .await
            .context("failed to mount protected storage")?;

        let storage: Arc<dyn Storage> = Arc::new(HostStorage);
        let table = RegionTable::builtin(mount.root());
        let strategy: Box<dyn DetectStrategy> = match config.strategy {
            Strategy::Probe => Box::new(ExistenceProbe::new(Arc::clone(&storage))),
            Strategy::Title => Box::new(TitleLookup::new(Arc::new(ConfiguredTitle::new(
                config.menu_title_id,
            )))),
        };
        let resolver = RegionResolver::new(table, strategy);

        let mut app = Self::assemble(config, storage, resolver);
        app._mount = Some(mount);
        Ok(app)
    }

    /// Wire an app from explicit collaborators. Mounting is the caller's
    /// concern; tests use this with fakes.
    pub fn assemble(config: AppConfig, storage: Arc<dyn Storage>, resolver: RegionResolver) -> Self {
        let engine = TransferEngine::new(storage, config.transfer.buffer_size as usize);
        Self {
            config,
            resolver,
            engine,
            _mount: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fixed display pause after a transfer attempt.
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.config.transfer.pause_ms)
    }

    /// Rerun region detection. Called at startup and before every repaint;
    /// each call yields a fresh locator superseding the previous one.
    pub async fn resolve(&self) -> ResolvedLocator {
        self.resolver.resolve().await
    }

    /// Run one triggered cycle to completion: re-resolve, gate, transfer.
    ///
    /// An unresolved locator blocks the transfer here; the engine is never
    /// invoked without a resolved source.
    pub async fn run_trigger(
        &self,
        direction: Direction,
        observer: &dyn StageObserver,
    ) -> CycleOutcome {
        let locator = self.resolver.resolve().await;
        let Some(entry) = locator.entry() else {
            tracing::warn!(
                direction = direction.label(),
                "transfer blocked: no region resolved"
            );
            return CycleOutcome::Blocked;
        };

        let backup = self.config.backup_path();
        let request = match direction {
            Direction::Dump => TransferRequest::dump(entry, &backup),
            Direction::Restore => TransferRequest::restore(entry, &backup),
        };

        CycleOutcome::Ran(self.engine.run(&request, observer).await)
    }
}

/// Top-level entry: bootstrap, then hand control to the menu loop.
pub async fn run(config: AppConfig) -> Result<()> {
    let pause = Duration::from_millis(config.transfer.pause_ms);
    let app = match App::bootstrap(config).await {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "startup failed");
            eprintln!("Error: {err:#}");
            tokio::time::sleep(pause).await;
            return Err(err);
        }
    };

    if no_tui_enabled() {
        crate::ui::output::run_console(&app).await
    } else {
        crate::ui::tui::run_menu(&app).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::progress::NullObserver;
    use crate::platform::storage::{ByteReader, ByteWriter};
    use async_trait::async_trait;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Nothing opens; write attempts are counted.
    struct DeadStorage {
        write_attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Storage for DeadStorage {
        async fn open_read(&self, _path: &Path) -> io::Result<ByteReader> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }

        async fn open_write(&self, _path: &Path) -> io::Result<ByteWriter> {
            self.write_attempts.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    #[tokio::test]
    async fn unresolved_locator_blocks_the_transfer() {
        let write_attempts = Arc::new(AtomicUsize::new(0));
        let storage: Arc<dyn Storage> = Arc::new(DeadStorage {
            write_attempts: Arc::clone(&write_attempts),
        });
        let resolver = RegionResolver::new(
            RegionTable::builtin(Path::new("/nowhere")),
            Box::new(ExistenceProbe::new(Arc::clone(&storage))),
        );
        let app = App::assemble(AppConfig::default(), storage, resolver);

        for direction in [Direction::Dump, Direction::Restore] {
            let outcome = app.run_trigger(direction, &NullObserver).await;
            assert!(matches!(outcome, CycleOutcome::Blocked));
        }

        assert_eq!(
            write_attempts.load(Ordering::SeqCst),
            0,
            "blocked cycles must never touch the destination"
        );
    }
}
