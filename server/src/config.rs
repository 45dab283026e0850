//! Server configuration and its command-line / environment source.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Runtime configuration for the canvas server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_address: SocketAddr,
    /// Canonical persisted bitmap.
    pub save_path: PathBuf,
    /// Minimum spacing between disk writes.
    pub save_throttle: Duration,
    /// Cron expression for automatic clears.
    pub clear_cron: Option<String>,
    /// Interval of the full-snapshot rebroadcast. `None` disables it.
    pub snapshot_interval: Option<Duration>,
    /// Stored history revisions. Zero disables history.
    pub history_capacity: usize,
    /// Outbound broadcast channel capacity per session.
    pub broadcast_capacity: usize,
    /// Canvas actor mailbox size.
    pub mailbox_capacity: usize,
    /// Client message limits.
    pub protocol_limits: protocol::Limits,
    /// Limits for loading the persisted bitmap and restoring history images.
    pub bitmap_limits: bitmap::Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3001),
            save_path: PathBuf::from("./drawings/current.bmp"),
            save_throttle: Duration::from_secs(5),
            clear_cron: None,
            snapshot_interval: Some(Duration::from_secs(5)),
            history_capacity: 20,
            broadcast_capacity: 256,
            mailbox_capacity: 1024,
            protocol_limits: protocol::Limits::default(),
            bitmap_limits: bitmap::Limits::default(),
        }
    }
}

/// Command-line arguments. Every flag can also come from the environment.
#[derive(Debug, Parser)]
#[command(name = "scrawl-server")]
#[command(author, version, about = "Shared canvas WebSocket server", long_about = None)]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Path of the persisted bitmap
    #[arg(long, env = "SAVE_PATH", default_value = "./drawings/current.bmp")]
    pub save_path: PathBuf,

    /// Minimum milliseconds between disk writes
    #[arg(long, env = "SAVE_THROTTLE_MS", default_value_t = 5000)]
    pub save_throttle_ms: u64,

    /// Cron expression that clears the canvas (5 or 6 fields)
    #[arg(long, env = "CLEAR_CRON")]
    pub clear_cron: Option<String>,

    /// Seconds between full snapshot rebroadcasts (0 disables)
    #[arg(long, env = "SNAPSHOT_INTERVAL_SECS", default_value_t = 5)]
    pub snapshot_interval_secs: u64,

    /// Number of history revisions kept in memory (0 disables history)
    #[arg(long, env = "HISTORY_CAPACITY", default_value_t = 20)]
    pub history_capacity: usize,

    /// Broadcast channel capacity
    #[arg(long, env = "BROADCAST_CAPACITY", default_value_t = 256)]
    pub broadcast_capacity: usize,

    /// Largest accepted WebSocket text frame in bytes
    #[arg(long, env = "MAX_MESSAGE_BYTES", default_value_t = 256 * 1024)]
    pub max_message_bytes: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let defaults = Self::default();
        Self {
            listen_address: SocketAddr::new(args.bind, args.port),
            save_path: args.save_path,
            save_throttle: Duration::from_millis(args.save_throttle_ms),
            clear_cron: args.clear_cron.filter(|expr| !expr.trim().is_empty()),
            snapshot_interval: (args.snapshot_interval_secs > 0)
                .then(|| Duration::from_secs(args.snapshot_interval_secs)),
            history_capacity: args.history_capacity,
            broadcast_capacity: args.broadcast_capacity.max(1),
            protocol_limits: protocol::Limits {
                max_message_bytes: args.max_message_bytes,
                ..defaults.protocol_limits
            },
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_canvas_service() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_address.port(), 3001);
        assert_eq!(config.save_path, PathBuf::from("./drawings/current.bmp"));
        assert_eq!(config.save_throttle, Duration::from_millis(5000));
        assert_eq!(config.snapshot_interval, Some(Duration::from_secs(5)));
        assert!(config.clear_cron.is_none());
    }

    #[test]
    fn args_override_defaults() {
        let args = Args::try_parse_from([
            "scrawl-server",
            "--port",
            "8080",
            "--bind",
            "127.0.0.1",
            "--save-throttle-ms",
            "250",
            "--snapshot-interval-secs",
            "0",
            "--clear-cron",
            "0 0 * * *",
            "--max-message-bytes",
            "1024",
        ])
        .unwrap();
        let config = ServerConfig::from(args);

        assert_eq!(config.listen_address, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.save_throttle, Duration::from_millis(250));
        assert_eq!(config.snapshot_interval, None);
        assert_eq!(config.clear_cron.as_deref(), Some("0 0 * * *"));
        assert_eq!(config.protocol_limits.max_message_bytes, 1024);
        assert_eq!(
            config.protocol_limits.max_points,
            protocol::Limits::default().max_points
        );
    }

    #[test]
    fn blank_cron_is_ignored() {
        let args = Args::try_parse_from(["scrawl-server", "--clear-cron", "  "]).unwrap();
        assert!(ServerConfig::from(args).clear_cron.is_none());
    }
}
