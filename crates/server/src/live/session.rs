// crates/server/src/live/session.rs
//! One WebSocket client's push loop.
//!
//! Each cycle reads at most one pending filter update (bounded wait), pushes
//! a fresh snapshot for the session's filter, then sleeps for the push
//! interval while still listening to the socket. Updates received during the
//! sleep are merged and take effect on the next cycle.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use tokio_util::sync::CancellationToken;
use truck_tracker_core::Filter;
use truck_tracker_db::PositionRepository;

use super::protocol::{parse_filter_update, ClientMessageError};
use crate::metrics;
use crate::snapshot::{assemble, now_epoch};
use crate::state::{AppState, LiveSettings};

/// Close code sent when the server is going away.
const CLOSE_GOING_AWAY: u16 = 1001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Streaming,
    Closed(CloseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ClientClosed,
    SocketError,
    SendFailed,
    Shutdown,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::ClientClosed => "client_closed",
            CloseReason::SocketError => "socket_error",
            CloseReason::SendFailed => "send_failed",
            CloseReason::Shutdown => "shutdown",
        }
    }
}

/// Keeps `live_sessions_active` accurate even if the session task is
/// cancelled or panics.
struct SessionGauge;

impl SessionGauge {
    fn open() -> Self {
        metrics::record_session_opened();
        Self
    }
}

impl Drop for SessionGauge {
    fn drop(&mut self) {
        metrics::record_session_closed();
    }
}

pub struct LiveSession {
    filter: Filter,
    phase: SessionPhase,
    repo: Arc<dyn PositionRepository>,
    settings: LiveSettings,
    shutdown: CancellationToken,
}

impl LiveSession {
    pub fn new(filter: Filter, state: &AppState) -> Self {
        Self {
            filter,
            phase: SessionPhase::Connecting,
            repo: state.repo.clone(),
            settings: state.live,
            shutdown: state.shutdown.clone(),
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Drive the session until the client leaves or the server shuts down.
    ///
    /// On return the session is in `SessionPhase::Closed` with the same reason.
    pub async fn run(&mut self, mut socket: WebSocket) -> CloseReason {
        let _gauge = SessionGauge::open();
        self.begin_streaming();

        let reason = self.stream(&mut socket).await;

        if reason == CloseReason::Shutdown {
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CLOSE_GOING_AWAY,
                    reason: "Server shutting down".into(),
                })))
                .await;
        }

        self.finish(reason);
        reason
    }

    fn begin_streaming(&mut self) {
        self.phase = SessionPhase::Streaming;
        tracing::info!(filter = ?self.filter, "Live session connected");
    }

    fn finish(&mut self, reason: CloseReason) {
        self.phase = SessionPhase::Closed(reason);
        tracing::info!(reason = reason.as_str(), "Live session closed");
    }

    async fn stream(&mut self, socket: &mut WebSocket) -> CloseReason {
        let shutdown = self.shutdown.clone();
        loop {
            if shutdown.is_cancelled() {
                return CloseReason::Shutdown;
            }

            // 1. Pick up a filter update the client already sent, if any.
            if let Ok(incoming) =
                tokio::time::timeout(self.settings.filter_read_timeout, socket.recv()).await
            {
                if let Some(reason) = self.handle_incoming(incoming) {
                    return reason;
                }
            }

            // 2-3. Snapshot and push.
            let snapshot = assemble(self.repo.as_ref(), &self.filter, now_epoch()).await;
            let features = snapshot.len();
            match serde_json::to_string(&snapshot.into_live_message()) {
                Ok(payload) => {
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        return CloseReason::SendFailed;
                    }
                    metrics::record_snapshot_pushed(features);
                    tracing::debug!(features, "Pushed live snapshot");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize live snapshot");
                }
            }

            // 4. Wait, still watching the socket and the shutdown signal.
            let wait = tokio::time::sleep(self.settings.push_interval);
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    _ = &mut wait => break,
                    _ = shutdown.cancelled() => return CloseReason::Shutdown,
                    incoming = socket.recv() => {
                        if let Some(reason) = self.handle_incoming(incoming) {
                            return reason;
                        }
                    }
                }
            }
        }
    }

    /// Apply one socket event. Returns the close reason if the session is over.
    fn handle_incoming(
        &mut self,
        incoming: Option<Result<Message, axum::Error>>,
    ) -> Option<CloseReason> {
        match incoming {
            None | Some(Ok(Message::Close(_))) => Some(CloseReason::ClientClosed),
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Live socket error");
                Some(CloseReason::SocketError)
            }
            Some(Ok(Message::Text(text))) => {
                self.apply_client_message(parse_filter_update(text.as_str()));
                None
            }
            Some(Ok(Message::Binary(_))) => {
                self.apply_client_message(Err(ClientMessageError::Binary));
                None
            }
            // axum answers pings itself
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => None,
        }
    }

    fn apply_client_message(
        &mut self,
        update: Result<truck_tracker_core::FilterUpdate, ClientMessageError>,
    ) {
        match update {
            Ok(update) => {
                self.filter.apply(update);
                tracing::info!(filter = ?self.filter, "Live filter updated");
            }
            Err(e) => {
                metrics::record_client_message_rejected();
                tracing::warn!(error = %e, "Ignoring malformed live message");
            }
        }
    }
}
