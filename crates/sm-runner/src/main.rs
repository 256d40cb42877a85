//! # sm-runner
//!
//! Mirrors the spot market feeds of one session into local projections.
//!
//! Loads a JSON configuration file, binds the configured subaccount, opens
//! the configured feeds over WebSocket and logs a projection summary at a
//! fixed interval until Ctrl+C, which resets the session.
//!
//! With `--replay`, frames are read from a JSON-lines capture instead of the
//! network, one `{"stream": "<feed>", "frame": {...}}` object per line.
//!
//! # Usage
//!
//! ```bash
//! sm-runner config.json --log-level info
//! sm-runner config.json --replay capture.jsonl
//! ```

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Deserialize;
use sm_core::config::AppConfig;
use sm_core::logging::LogFormat;
use sm_core::types::StreamKey;
use sm_stream::{InMemoryTransport, PingConfig, SpotStore, SpotStreams, Transport, WsTransport};
use tracing::{debug, info, warn};

/// Spot market mirror runner.
#[derive(Parser)]
#[command(name = "sm-runner", about = "Spot market mirror runner")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output (overrides `mirror.log_path`).
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit console logs as JSON lines.
    #[arg(long)]
    log_json: bool,

    /// Replay a JSON-lines frame capture instead of connecting.
    #[arg(long)]
    replay: Option<PathBuf>,
}

/// One line of a replay capture.
#[derive(Debug, Deserialize)]
struct ReplayLine {
    stream: StreamKey,
    frame: serde_json::Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = sm_core::config::load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 2. Initialize logging
    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Pretty };
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    sm_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name(), format)?;

    info!(
        "sm-runner starting: config={}, endpoint={}, capacity={}",
        cli.config.display(),
        config.endpoint,
        config.effective_capacity()
    );

    // 3. Build the store and the transport
    let (store, updates) = SpotStore::with_notifier(config.effective_capacity(), config.notify_capacity());
    let store = Arc::new(store);
    store.set_active_markets(config.active_markets.iter().cloned());

    let replay = cli.replay.as_ref().map(|_| InMemoryTransport::new());
    let transport: Arc<dyn Transport> = match &replay {
        Some(memory) => Arc::new(memory.clone()),
        None => {
            let ping = config.ping_interval().map(|interval| PingConfig {
                interval,
                payload: sm_core::ws::PingPayload::WebSocketPing,
            });
            Arc::new(WsTransport::new(config.endpoint.clone(), tokio::runtime::Handle::current()).with_ping(ping))
        }
    };
    let streams = SpotStreams::new(transport, Arc::clone(&store));

    // 4. Bind the session and open feeds
    if let Some(subaccount_id) = &config.subaccount_id {
        streams.set_subaccount(subaccount_id.clone());
    }
    let opened = open_feeds(&streams, &config);
    info!("{opened} feed(s) opened: {:?}", streams.registry().active_keys());

    // 5. Consume update notifications
    let stop = Arc::new(AtomicBool::new(false));
    let consumer = {
        let stop = Arc::clone(&stop);
        tokio::task::spawn_blocking(move || consume_updates(updates, stop))
    };

    // 6. Run until the capture is exhausted or Ctrl+C
    match (&cli.replay, &replay) {
        (Some(path), Some(memory)) => {
            let applied = replay_capture(path, memory)?;
            info!("replayed {applied} frame(s) from {}", path.display());
        }
        _ => {
            let mut summary = tokio::time::interval(config.summary_interval());
            summary.tick().await;
            info!("running, press Ctrl+C to stop");
            loop {
                tokio::select! {
                    _ = summary.tick() => info!("projections: {}", store.summary()),
                    res = tokio::signal::ctrl_c() => {
                        res?;
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    // 7. Tear down
    info!("final projections: {}", store.summary());
    streams.reset();
    stop.store(true, Ordering::Relaxed);
    let updates_seen = consumer.await?;
    info!("{updates_seen} update notification(s) consumed, goodbye");
    Ok(())
}

/// Subscribe every configured feed. Returns how many opened.
fn open_feeds(streams: &SpotStreams, config: &AppConfig) -> usize {
    config
        .effective_feeds()
        .into_iter()
        .filter(|key| {
            let market_id = if key.is_account_scoped() {
                config.account_market()
            } else {
                config.market_id.clone()
            };
            let opened = streams.subscribe(*key, market_id);
            if !opened {
                warn!("[{key}] not opened");
            }
            opened
        })
        .count()
}

/// Feed every line of a capture file to the in-memory transport.
fn replay_capture(path: &Path, memory: &InMemoryTransport) -> Result<usize> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut applied = 0;
    for (idx, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayLine = match serde_json::from_str(&line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("line {}: skipped: {e}", idx + 1);
                continue;
            }
        };
        match memory.push_frame(entry.stream, &entry.frame.to_string()) {
            Ok(true) => applied += 1,
            Ok(false) => debug!("line {}: [{}] not subscribed", idx + 1, entry.stream),
            Err(e) => warn!("line {}: {e}", idx + 1),
        }
    }
    Ok(applied)
}

/// Drain change notifications until `stop` is set. Returns how many were seen.
fn consume_updates(updates: Receiver<StreamKey>, stop: Arc<AtomicBool>) -> u64 {
    let mut seen = 0;
    while !stop.load(Ordering::Relaxed) {
        match updates.recv_timeout(Duration::from_millis(200)) {
            Ok(key) => {
                seen += 1;
                debug!("[{key}] projection updated");
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    seen
}
