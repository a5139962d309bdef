use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use themevault::common::config::{load_config, ConfigOverrides, Loader, Strategy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "themevault")]
#[command(version)]
#[command(about = "Back up and restore the system menu theme asset")]
struct Cli {
    /// Region detection strategy
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Loader mount variant for the protected partition
    #[arg(long, value_enum)]
    loader: Option<Loader>,

    /// Mount point of the protected-storage partition
    #[arg(long)]
    protected_root: Option<PathBuf>,

    /// Mount point of the removable media
    #[arg(long)]
    media_root: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            strategy: self.strategy,
            loader: self.loader,
            protected_root: self.protected_root.clone(),
            media_root: self.media_root.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("THEMEVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.overrides())?;

    themevault::app::run(config).await
}
