//! ecweather - Environment Canada city weather from the command line
//!
//! Fetches the latest citypage bulletin for a station and prints a normalized
//! summary, or computes sunrise and sunset for a location.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

use ecweather::cli::{sun_instant, Cli, Command};
use ecweather::data::weather::snapshot_from_xml;
use ecweather::data::{BulletinLocator, WeatherClient, WeatherSnapshot};
use ecweather::refresh::{RefreshConfig, RefreshHandle, RefreshMessage, SnapshotTracker};
use ecweather::report::{render_snapshot, render_sun_times};
use ecweather::sun::sun_times;

/// Prints a snapshot as JSON or as a text summary
fn print_snapshot(snapshot: &WeatherSnapshot, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", render_snapshot(snapshot));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let cli = Cli::parse();
    let locator = BulletinLocator::new().with_base_url(cli.base_url.clone());
    let client = WeatherClient::with_locator(locator);

    let command = cli.command();
    match command {
        Command::Current { json } => {
            let snapshot = client.fetch_snapshot(&cli.station, &cli.province).await?;
            print_snapshot(&snapshot, json)?;
        }
        Command::Parse { ref file, json } => {
            let xml = tokio::fs::read_to_string(file).await?;
            let snapshot = snapshot_from_xml(&xml, &cli.province)?;
            print_snapshot(&snapshot, json)?;
        }
        Command::Sun {
            lat,
            lng,
            date,
            tz,
            json,
        } => {
            let times = sun_times(lat, lng, sun_instant(date, tz), Some(tz));
            if json {
                println!("{}", serde_json::to_string_pretty(&times)?);
            } else {
                print!("{}", render_sun_times(&times, tz));
            }
        }
        Command::Watch { json, .. } => {
            let mut config = RefreshConfig::default();
            if let Some(interval) = command.interval() {
                config.interval = interval;
            }
            info!(
                "Watching {} ({}) every {}s, Ctrl-C to stop",
                cli.station,
                cli.province,
                config.interval.as_secs()
            );

            let mut handle = RefreshHandle::spawn(
                Arc::new(client),
                cli.station.clone(),
                cli.province.clone(),
                config,
            );
            let mut tracker = SnapshotTracker::new();

            loop {
                tokio::select! {
                    message = handle.receiver.recv() => {
                        match message {
                            Some(RefreshMessage::SnapshotUpdated { generation, snapshot }) => {
                                if tracker.apply(generation, snapshot) {
                                    if let Some(current) = tracker.current() {
                                        print_snapshot(current, json)?;
                                    }
                                } else {
                                    info!("Dropped stale result from refresh {}", generation);
                                }
                            }
                            Some(RefreshMessage::RefreshError { generation, message }) => {
                                warn!("Refresh {} failed: {}", generation, message);
                            }
                            Some(RefreshMessage::RefreshStarted { .. }) => {}
                            None => break,
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Stopping");
                        handle.shutdown().await;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
