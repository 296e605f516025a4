// crates/db/src/repository.rs
//! Read-side interface the live stream and query endpoints depend on.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use truck_tracker_core::{Filter, PositionRecord};

use crate::{Database, DbResult};

/// Source of position data.
///
/// Implementations are shared by every connected client at once and must be
/// safe for concurrent use.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// At most one record per vehicle: the newest one passing `filter`.
    async fn latest_per_vehicle(&self, filter: &Filter) -> DbResult<Vec<PositionRecord>>;

    /// Every record for `vehicle_id` within the optional date bounds,
    /// newest first.
    async fn history(
        &self,
        vehicle_id: &str,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DbResult<Vec<PositionRecord>>;

    /// Distinct vehicle identifiers ever recorded.
    async fn list_vehicle_ids(&self) -> DbResult<BTreeSet<String>>;
}

#[async_trait]
impl PositionRepository for Database {
    async fn latest_per_vehicle(&self, filter: &Filter) -> DbResult<Vec<PositionRecord>> {
        let records = self.get_latest_positions(filter).await?;
        tracing::debug!(
            vehicles = filter.vehicle_ids.len(),
            rows = records.len(),
            "Fetched latest positions"
        );
        Ok(records)
    }

    async fn history(
        &self,
        vehicle_id: &str,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DbResult<Vec<PositionRecord>> {
        let records = self.get_position_history(vehicle_id, date_from, date_to).await?;
        tracing::debug!(vehicle_id, rows = records.len(), "Fetched position history");
        Ok(records)
    }

    async fn list_vehicle_ids(&self) -> DbResult<BTreeSet<String>> {
        self.get_vehicle_ids().await
    }
}
