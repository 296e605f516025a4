/// Inline SQL migrations for the position store.
///
/// Applied in order; the index of each entry (1-based) is its version in the
/// `_migrations` table.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: raw GPS fixes, one row per (car, timestamp) report
    r#"
CREATE TABLE IF NOT EXISTS tracking_data (
    car TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    "timestamp" INTEGER NOT NULL,
    date TEXT NOT NULL
);
"#,
    // Migration 2: latest-per-vehicle and history lookups
    r#"
CREATE INDEX IF NOT EXISTS idx_tracking_car_ts ON tracking_data(car, "timestamp" DESC);
"#,
    // Migration 3: date range filters
    r#"
CREATE INDEX IF NOT EXISTS idx_tracking_date ON tracking_data(date);
"#,
];
