// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use truck_tracker_db::PositionRepository;

/// Timing of the live push loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    /// Time between two snapshot pushes on one connection.
    pub push_interval: Duration,
    /// Bounded wait for a pending client message at the top of each cycle.
    pub filter_read_timeout: Duration,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            push_interval: Duration::from_secs(5),
            filter_read_timeout: Duration::from_millis(10),
        }
    }
}

/// Shared application state accessible from all route handlers.
///
/// Live sessions only read from it; each session keeps its own filter.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Position source shared by every request and live session.
    pub repo: Arc<dyn PositionRepository>,
    pub live: LiveSettings,
    /// Cancelled on server shutdown; live sessions close when it fires.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(repo: Arc<dyn PositionRepository>) -> Arc<Self> {
        Self::with_settings(repo, LiveSettings::default(), CancellationToken::new())
    }

    pub fn with_settings(
        repo: Arc<dyn PositionRepository>,
        live: LiveSettings,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            repo,
            live,
            shutdown,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truck_tracker_db::Database;

    #[tokio::test]
    async fn test_new_state_defaults() {
        let db = Database::new_in_memory().await.unwrap();
        let state = AppState::new(Arc::new(db));

        assert_eq!(state.live, LiveSettings::default());
        assert!(state.uptime_secs() < 5);
        assert!(!state.shutdown.is_cancelled());
    }
}
