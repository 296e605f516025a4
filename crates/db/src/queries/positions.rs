// crates/db/src/queries/positions.rs
// Position CRUD: batch insert, latest-per-vehicle, history, vehicle listing.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use truck_tracker_core::{Filter, PositionRecord, DATE_FORMAT};

use crate::{Database, DbResult};

const POSITION_COLUMNS: &str = r#"car, latitude, longitude, "timestamp", date"#;

/// A tracking_data row with its `date` column already parsed.
#[derive(Debug, Clone)]
pub struct PositionRow {
    pub car: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
    pub date: NaiveDate,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for PositionRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        let raw_date: String = row.try_get("date")?;
        let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "date".to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Self {
            car: row.try_get("car")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            timestamp: row.try_get("timestamp")?,
            date,
        })
    }
}

impl From<PositionRow> for PositionRecord {
    fn from(row: PositionRow) -> Self {
        PositionRecord {
            vehicle_id: row.car,
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp: row.timestamp,
            date: row.date,
        }
    }
}

/// Append `AND date >= ? AND date <= ?` for whichever bounds are set.
///
/// Dates are stored as `YYYY-MM-DD` text, so lexical comparison matches
/// calendar order.
fn push_date_range(qb: &mut QueryBuilder<'_, Sqlite>, date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) {
    if let Some(from) = date_from {
        qb.push(" AND date >= ");
        qb.push_bind(from.format(DATE_FORMAT).to_string());
    }
    if let Some(to) = date_to {
        qb.push(" AND date <= ");
        qb.push_bind(to.format(DATE_FORMAT).to_string());
    }
}

/// Append `AND car IN (?, ?, ...)` when the set is non-empty.
fn push_vehicle_ids<'args>(qb: &mut QueryBuilder<'args, Sqlite>, vehicle_ids: &'args BTreeSet<String>) {
    if vehicle_ids.is_empty() {
        return;
    }
    qb.push(" AND car IN (");
    let mut sep = qb.separated(", ");
    for id in vehicle_ids {
        sep.push_bind(id.as_str());
    }
    sep.push_unseparated(")");
}

impl Database {
    /// Batch insert position fixes in one transaction.
    ///
    /// Returns the number of rows inserted.
    pub async fn insert_positions(&self, records: &[PositionRecord]) -> DbResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool().begin().await?;
        let mut inserted = 0;
        for record in records {
            let result = sqlx::query(
                r#"INSERT INTO tracking_data (car, latitude, longitude, "timestamp", date)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )
            .bind(&record.vehicle_id)
            .bind(record.latitude)
            .bind(record.longitude)
            .bind(record.timestamp)
            .bind(record.date.format(DATE_FORMAT).to_string())
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Newest fix per vehicle among the rows that pass `filter`.
    ///
    /// The date range is applied before picking the newest row, so a vehicle
    /// whose newest fix lies outside the range reports its newest fix inside
    /// it. Rows come back ordered by vehicle id.
    pub async fn get_latest_positions(&self, filter: &Filter) -> DbResult<Vec<PositionRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            r#"SELECT {POSITION_COLUMNS} FROM (
                SELECT {POSITION_COLUMNS},
                       ROW_NUMBER() OVER (PARTITION BY car ORDER BY "timestamp" DESC) AS rn
                FROM tracking_data
                WHERE 1=1"#
        ));
        push_vehicle_ids(&mut qb, &filter.vehicle_ids);
        push_date_range(&mut qb, filter.date_from, filter.date_to);
        qb.push(") WHERE rn = 1 ORDER BY car");

        let rows: Vec<PositionRow> = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(PositionRecord::from).collect())
    }

    /// All fixes for one vehicle, newest first.
    pub async fn get_position_history(
        &self,
        vehicle_id: &str,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DbResult<Vec<PositionRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {POSITION_COLUMNS} FROM tracking_data WHERE car = "
        ));
        qb.push_bind(vehicle_id);
        push_date_range(&mut qb, date_from, date_to);
        qb.push(r#" ORDER BY "timestamp" DESC"#);

        let rows: Vec<PositionRow> = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(PositionRecord::from).collect())
    }

    /// Every vehicle id that has at least one fix.
    pub async fn get_vehicle_ids(&self) -> DbResult<BTreeSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT car FROM tracking_data")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(|(car,)| car).collect())
    }
}
