//! Snapshot assembly on top of the position repository.
//!
//! Two flavours: the query endpoints propagate repository failures, the live
//! channel degrades to an empty snapshot and tries again next cycle.

use truck_tracker_core::{Filter, Snapshot};
use truck_tracker_db::{DbResult, PositionRepository};

/// Current wall-clock time in epoch seconds.
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Build a snapshot, returning any repository error to the caller.
pub async fn try_assemble(
    repo: &dyn PositionRepository,
    filter: &Filter,
    now: i64,
) -> DbResult<Snapshot> {
    let records = repo.latest_per_vehicle(filter).await?;
    Ok(Snapshot::from_records(&records, now))
}

/// Build a snapshot, falling back to the empty snapshot on repository failure.
pub async fn assemble(repo: &dyn PositionRepository, filter: &Filter, now: i64) -> Snapshot {
    match try_assemble(repo, filter, now).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(
                error = %e,
                connection = e.is_connection(),
                "Snapshot query failed, sending empty snapshot"
            );
            crate::metrics::record_snapshot_degraded();
            Snapshot::empty()
        }
    }
}
