//! WebSocket entry point for live tracking.
//!
//! `GET /ws?car_filter=&date_from=&date_to=` upgrades to a WebSocket that
//! receives a snapshot every push interval. Query parameters seed the
//! session's filter; invalid dates are rejected with 400 before the upgrade.

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use truck_tracker_core::Filter;

use crate::error::ApiResult;
use crate::live::LiveSession;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
    pub car_filter: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_live_handler))
}

async fn ws_live_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let filter = Filter::from_params(
        query.car_filter.as_deref(),
        query.date_from.as_deref(),
        query.date_to.as_deref(),
    )?;

    Ok(ws.on_upgrade(move |socket| async move {
        let mut session = LiveSession::new(filter, &state);
        session.run(socket).await;
    }))
}
