use anyhow::{Context, Result};
use tvh_sync::config::Config;
use tvh_sync::configuration::Configuration;
use tvh_sync::input;
use tvh_sync::store::layout::Layout;
use tvh_sync::sync::{SyncOptions, Synchronizer};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tvh_sync=info"))
        )
        .init();

    tracing::info!("Starting tvh-sync");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/tvh-sync/tvh-sync.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    // Scraped channels and their ordering
    let channels = input::read_channels(&config.input.channels_file)?;
    let channel_list =
        input::read_channel_list(config.input.channel_list_file.as_deref(), &channels)?;
    tracing::info!("Channel list has {} entries", channel_list.len());

    // Load the current Tvheadend configuration
    let layout = Layout::new(&config.tvheadend.folder);
    let mut tvh = Configuration::read_from_disk(layout, &config.tvheadend.network_name);

    let synchronizer = Synchronizer::new(SyncOptions::from(&config.tvheadend));
    let report = synchronizer
        .run(&mut tvh, &channel_list, &channels)
        .context("Failed to synchronize Tvheadend configuration")?;

    tracing::info!("Configuration hash: {} -> {}", report.hash_before, report.hash_after);
    tracing::info!("tvh-sync finished");
    Ok(())
}
