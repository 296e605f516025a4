//! Vehicle listing endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::metrics::RequestTimer;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    /// Sorted ascending.
    pub vehicles: Vec<String>,
}

/// GET /api/vehicles - Every vehicle id with at least one recorded position.
pub async fn list_vehicles(State(state): State<Arc<AppState>>) -> ApiResult<Json<VehiclesResponse>> {
    let timer = RequestTimer::new("vehicles");
    let result: ApiResult<_> = state
        .repo
        .list_vehicle_ids()
        .await
        .map(|ids| {
            Json(VehiclesResponse {
                vehicles: ids.into_iter().collect(),
            })
        })
        .map_err(Into::into);
    timer.finish_result(&result);
    result
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/vehicles", get(list_vehicles))
}
