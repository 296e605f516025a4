//! Position query endpoints.
//!
//! - `GET /api/trucks` - latest position of every matching vehicle as GeoJSON
//! - `GET /api/trucks/{car_id}` - full position history of one vehicle

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use truck_tracker_core::{parse_date, FeatureCollection, Filter, PositionRecord};

use crate::error::{ApiError, ApiResult};
use crate::metrics::RequestTimer;
use crate::snapshot::{now_epoch, try_assemble};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrucksQuery {
    /// Single id or comma-separated list.
    pub car: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<PositionRecord>,
}

/// GET /api/trucks?car=&date_from=&date_to=
pub async fn latest_positions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrucksQuery>,
) -> ApiResult<Json<FeatureCollection>> {
    let timer = RequestTimer::new("trucks");
    let result = snapshot_for_query(&state, &query).await.map(Json);
    timer.finish_result(&result);
    result
}

async fn snapshot_for_query(state: &AppState, query: &TrucksQuery) -> ApiResult<FeatureCollection> {
    let filter = Filter::from_params(
        query.car.as_deref(),
        query.date_from.as_deref(),
        query.date_to.as_deref(),
    )?;
    let snapshot = try_assemble(state.repo.as_ref(), &filter, now_epoch()).await?;
    tracing::debug!(features = snapshot.len(), "Served position snapshot");
    Ok(snapshot.into_feature_collection())
}

/// GET /api/trucks/{car_id}?date_from=&date_to=
///
/// Repository failures surface as 500; an empty history is a valid answer.
pub async fn vehicle_history(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let timer = RequestTimer::new("history");
    let result = history_for_vehicle(&state, &car_id, &query)
        .await
        .map(|history| Json(HistoryResponse { history }));
    timer.finish_result(&result);
    result
}

async fn history_for_vehicle(
    state: &AppState,
    car_id: &str,
    query: &HistoryQuery,
) -> ApiResult<Vec<PositionRecord>> {
    if car_id.trim().is_empty() {
        return Err(ApiError::BadRequest("car_id must not be empty".to_string()));
    }
    let date_from = parse_date("date_from", query.date_from.as_deref())?;
    let date_to = parse_date("date_to", query.date_to.as_deref())?;

    let history = state.repo.history(car_id, date_from, date_to).await?;
    tracing::debug!(car_id, records = history.len(), "Served vehicle history");
    Ok(history)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trucks", get(latest_positions))
        .route("/trucks/{car_id}", get(vehicle_history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_history_response_shape() {
        let response = HistoryResponse {
            history: vec![PositionRecord::new(
                "T1",
                52.5,
                13.4,
                1_714_560_000,
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            )],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["history"][0]["car"], "T1");
        assert_eq!(json["history"][0]["date"], "2024-05-01");
        assert_eq!(json["history"][0]["timestamp"], 1_714_560_000);
    }
}
