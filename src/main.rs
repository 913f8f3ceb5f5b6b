use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};

use crate::args::Cli;
use crate::config::Config;
use crate::games::vrchat::{ChatboxSink, StatusSink};
use crate::now_playing::{NowPlaying, SpotifyWindowTitle};
use crate::session::Session;
use crate::source::{DryRunSource, MetricSource};

mod args;
mod config;
mod error;
mod games;
mod now_playing;
mod session;
mod source;
mod status;
mod trend;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(utils::convert_verbose_level_to_log_level(cli.verbose))
        .init();
    warn!("HR Chatbox Version v{}", env!("CARGO_PKG_VERSION"));
    info!("Starting HR Chatbox...");

    let mut config = Config::load_or_create(&cli.config);
    if config.show_spotify && !now_playing::SUPPORTED {
        warn!("Spotify lookup is only supported on Windows, disabling it");
        config.show_spotify = false;
    }

    let source: Box<dyn MetricSource> = if cli.dry_run {
        Box::new(DryRunSource::new())
    } else {
        source::from_config(&config).context("failed to build HTTP client")?
    };

    info!("=== HR Chatbox ===");
    info!("OSC Port: {}", config.osc_port);
    info!("Spotify Enabled: {}", config.show_spotify);
    info!("Trend Enabled: {}", config.show_trend);
    info!("HR Source: {}", source.describe());
    info!("==================");

    let sink: Option<Box<dyn StatusSink>> = match ChatboxSink::connect(config.osc_port).await {
        Ok(sink) => {
            info!("Sending chatbox updates to {}", sink.target());
            Some(Box::new(sink))
        }
        Err(err) => {
            error!("{err}");
            error!("Continuing without OSC output!");
            None
        }
    };

    let now_playing: Option<Box<dyn NowPlaying>> = if config.show_spotify {
        Some(Box::new(SpotifyWindowTitle::new()))
    } else {
        None
    };

    let mut session = Session::new(source, sink)
        .with_trend(config.show_trend)
        .with_now_playing(now_playing);

    session
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {err}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
