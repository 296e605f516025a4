// crates/core/src/filter.rs
//! Vehicle/date filters shared by the live channel and the query endpoints.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::FilterError;

/// Date format used by every filter parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which positions a snapshot or history read should consider.
///
/// An empty `vehicle_ids` set means "all vehicles". Date bounds are inclusive
/// and compared against the record's calendar `date`, not its timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub vehicle_ids: BTreeSet<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A field-wise patch for a [`Filter`].
///
/// `None` leaves the field untouched; `Some(value)` replaces it, including
/// `Some(None)` / an empty set which clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub vehicle_ids: Option<BTreeSet<String>>,
    pub date_from: Option<Option<NaiveDate>>,
    pub date_to: Option<Option<NaiveDate>>,
}

impl Filter {
    /// Build a filter from raw query parameter values.
    ///
    /// `car` may hold a single id or a comma-separated list; blank date
    /// values are treated as absent.
    pub fn from_params(
        car: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            vehicle_ids: car.map(parse_vehicle_list).unwrap_or_default(),
            date_from: parse_date("date_from", date_from)?,
            date_to: parse_date("date_to", date_to)?,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.vehicle_ids.is_empty() && self.date_from.is_none() && self.date_to.is_none()
    }

    /// Merge an update into this filter. Fields the update leaves unset keep
    /// their current value.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(ids) = update.vehicle_ids {
            self.vehicle_ids = ids;
        }
        if let Some(from) = update.date_from {
            self.date_from = from;
        }
        if let Some(to) = update.date_to {
            self.date_to = to;
        }
    }
}

/// Split a comma-separated vehicle list, trimming whitespace and dropping
/// empty tokens. `"A, B,,"` yields `{A, B}`.
pub fn parse_vehicle_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an optional `YYYY-MM-DD` value. Missing or blank input is `Ok(None)`.
pub fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| FilterError::invalid_date(field, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_vehicle_list_trims_and_drops_empty() {
        assert_eq!(parse_vehicle_list("A, B"), ids(&["A", "B"]));
        assert_eq!(parse_vehicle_list(" A ,, B ,"), ids(&["A", "B"]));
        assert_eq!(parse_vehicle_list("T1"), ids(&["T1"]));
        assert!(parse_vehicle_list(" , ").is_empty());
    }

    #[test]
    fn test_comma_list_equals_union_of_singles() {
        let combined = parse_vehicle_list("A, B");
        let mut union = parse_vehicle_list("A");
        union.extend(parse_vehicle_list("B"));
        assert_eq!(combined, union);
    }

    #[test]
    fn test_from_params() {
        let filter = Filter::from_params(Some("T1,T2"), Some("2024-01-01"), None).unwrap();
        assert_eq!(filter.vehicle_ids, ids(&["T1", "T2"]));
        assert_eq!(filter.date_from, Some(date("2024-01-01")));
        assert_eq!(filter.date_to, None);
        assert!(!filter.is_unfiltered());

        let empty = Filter::from_params(None, Some(""), Some("  ")).unwrap();
        assert!(empty.is_unfiltered());
    }

    #[test]
    fn test_from_params_rejects_bad_date() {
        let err = Filter::from_params(None, None, Some("14/01/2024")).unwrap_err();
        assert_eq!(err, FilterError::invalid_date("date_to", "14/01/2024"));
        assert!(err.to_string().contains("date_to"));
    }

    #[test]
    fn test_partial_update_keeps_dates() {
        let mut filter = Filter::from_params(Some("A"), Some("2024-01-01"), Some("2024-01-31")).unwrap();
        filter.apply(FilterUpdate {
            vehicle_ids: Some(ids(&["X"])),
            ..Default::default()
        });

        assert_eq!(filter.vehicle_ids, ids(&["X"]));
        assert_eq!(filter.date_from, Some(date("2024-01-01")));
        assert_eq!(filter.date_to, Some(date("2024-01-31")));
    }

    #[test]
    fn test_update_can_clear_fields() {
        let mut filter = Filter::from_params(Some("A"), Some("2024-01-01"), None).unwrap();
        filter.apply(FilterUpdate {
            vehicle_ids: Some(BTreeSet::new()),
            date_from: Some(None),
            date_to: None,
        });
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_empty_update_is_noop() {
        let original = Filter::from_params(Some("A,B"), None, Some("2024-02-02")).unwrap();
        let mut filter = original.clone();
        filter.apply(FilterUpdate::default());
        assert_eq!(filter, original);
    }
}
