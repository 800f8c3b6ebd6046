//! Background snapshot refresh
//!
//! Periodically fetches a station's snapshot in the background and reports
//! results over a tokio channel. A slow fetch may still be in flight when the
//! next tick fires; both run to completion, and each result carries the
//! generation of the tick that issued it so `SnapshotTracker` can keep only
//! the most recently issued one.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::data::{BulletinSource, WeatherClient, WeatherSnapshot};

/// Messages sent from background refresh to the consumer
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// A refresh was issued
    RefreshStarted { generation: u64 },
    /// A refresh produced a snapshot
    SnapshotUpdated {
        generation: u64,
        snapshot: WeatherSnapshot,
    },
    /// A refresh failed
    RefreshError { generation: u64, message: String },
}

/// Configuration for refresh intervals
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between refreshes
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900), // 15 minutes
            enabled: true,
        }
    }
}

/// Handle for controlling the background refresh system
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Creates a new RefreshHandle and spawns the refresh task
    ///
    /// The first refresh is issued immediately, then one per interval.
    ///
    /// # Arguments
    /// * `client` - Client used for every fetch
    /// * `station_code` - Citypage site code
    /// * `province` - Two-letter province code
    /// * `config` - Configuration for the refresh interval
    pub fn spawn<S>(
        client: Arc<WeatherClient<S>>,
        station_code: String,
        province: String,
        config: RefreshConfig,
    ) -> Self
    where
        S: BulletinSource + 'static,
    {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut generation: u64 = 0;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            generation += 1;
                            let _ = msg_tx.send(RefreshMessage::RefreshStarted { generation }).await;

                            let client = Arc::clone(&client);
                            let tx = msg_tx.clone();
                            let station_code = station_code.clone();
                            let province = province.clone();
                            tokio::spawn(async move {
                                let message = match client.fetch_snapshot(&station_code, &province).await {
                                    Ok(snapshot) => {
                                        debug!("Refresh {} produced a snapshot", generation);
                                        RefreshMessage::SnapshotUpdated { generation, snapshot }
                                    }
                                    Err(e) => {
                                        warn!("Refresh {} failed: {}", generation, e);
                                        RefreshMessage::RefreshError { generation, message: e.to_string() }
                                    }
                                };
                                let _ = tx.send(message).await;
                            });
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the refresh loop; fetches already in flight still report
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}

/// Keeps the snapshot from the most recently issued refresh
///
/// Results from an older generation that arrive after a newer one was
/// applied are dropped.
#[derive(Debug, Default)]
pub struct SnapshotTracker {
    applied_generation: Option<u64>,
    current: Option<WeatherSnapshot>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a result from `generation` would be dropped
    pub fn is_stale(&self, generation: u64) -> bool {
        self.applied_generation.is_some_and(|applied| generation <= applied)
    }

    /// Applies a snapshot unless it is stale; returns whether it was applied
    pub fn apply(&mut self, generation: u64, snapshot: WeatherSnapshot) -> bool {
        if self.is_stale(generation) {
            return false;
        }
        self.applied_generation = Some(generation);
        self.current = Some(snapshot);
        true
    }

    /// The snapshot currently shown
    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }
}
