//! Process configuration: command-line flags with environment fallbacks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::state::LiveSettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "truck-tracker", version, about = "Live vehicle tracking server")]
pub struct Config {
    /// SQLite connection URL of the position store.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:tracking.db")]
    pub database_url: String,

    /// Maximum pooled connections to the position store.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = truck_tracker_db::DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory served at `/`. Ignored if it does not exist.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Seconds between two pushes on a live connection.
    #[arg(long, env = "PUSH_INTERVAL_SECS", default_value_t = 5)]
    pub push_interval_secs: u64,

    /// How long each live cycle waits for an already-buffered client message.
    #[arg(long, env = "FILTER_READ_TIMEOUT_MS", default_value_t = 10)]
    pub filter_read_timeout_ms: u64,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The static directory, if it exists on disk.
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.static_dir.is_dir().then(|| self.static_dir.clone())
    }

    pub fn live_settings(&self) -> LiveSettings {
        LiveSettings {
            push_interval: Duration::from_secs(self.push_interval_secs.max(1)),
            filter_read_timeout: Duration::from_millis(self.filter_read_timeout_ms),
        }
    }
}
