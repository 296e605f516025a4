//! Client-to-server messages on the live channel.
//!
//! The only accepted message is a filter update:
//!
//! ```json
//! {"filters": {"car": "T1,T2", "dateFrom": "2024-05-01", "dateTo": null}}
//! ```
//!
//! Each key is optional. An absent key keeps the session's current value,
//! `null` or `""` clears it. `car` may also be an array of ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use truck_tracker_core::{parse_date, parse_vehicle_list, FilterError, FilterUpdate};

#[derive(Debug, Error)]
pub enum ClientMessageError {
    #[error("Message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message has no `filters` object")]
    MissingFilters,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Binary frames are not supported")]
    Binary,
}

#[derive(Debug, Deserialize)]
struct ClientMessage {
    #[serde(default)]
    filters: Option<RawFilters>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFilters {
    #[serde(default, deserialize_with = "present")]
    car: Option<Option<VehicleSelection>>,
    #[serde(default, rename = "dateFrom", alias = "date_from", deserialize_with = "present")]
    date_from: Option<Option<String>>,
    #[serde(default, rename = "dateTo", alias = "date_to", deserialize_with = "present")]
    date_to: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VehicleSelection {
    List(String),
    Many(Vec<String>),
}

impl VehicleSelection {
    fn into_ids(self) -> BTreeSet<String> {
        match self {
            VehicleSelection::List(raw) => parse_vehicle_list(&raw),
            VehicleSelection::Many(ids) => ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Distinguishes a key given as `null` (`Some(None)`) from a missing key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Parse one text frame into a filter update.
///
/// Validation is all-or-nothing: if any field is invalid, nothing applies.
pub fn parse_filter_update(text: &str) -> Result<FilterUpdate, ClientMessageError> {
    let message: ClientMessage = serde_json::from_str(text)?;
    let raw = message.filters.ok_or(ClientMessageError::MissingFilters)?;

    Ok(FilterUpdate {
        vehicle_ids: raw
            .car
            .map(|car| car.map(VehicleSelection::into_ids).unwrap_or_default()),
        date_from: raw
            .date_from
            .map(|value| parse_date("dateFrom", value.as_deref()))
            .transpose()?,
        date_to: raw
            .date_to
            .map(|value| parse_date("dateTo", value.as_deref()))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_car_only_leaves_dates_untouched() {
        let update = parse_filter_update(r#"{"filters": {"car": "X"}}"#).unwrap();
        assert_eq!(
            update,
            FilterUpdate {
                vehicle_ids: Some(ids(&["X"])),
                date_from: None,
                date_to: None,
            }
        );
    }

    #[test]
    fn test_full_update() {
        let update = parse_filter_update(
            r#"{"filters": {"car": "A, B,,", "dateFrom": "2024-05-01", "dateTo": "2024-05-03"}}"#,
        )
        .unwrap();
        assert_eq!(update.vehicle_ids, Some(ids(&["A", "B"])));
        assert_eq!(update.date_from, Some(NaiveDate::from_ymd_opt(2024, 5, 1)));
        assert_eq!(update.date_to, Some(NaiveDate::from_ymd_opt(2024, 5, 3)));
    }

    #[test]
    fn test_car_array() {
        let update = parse_filter_update(r#"{"filters": {"car": [" T1 ", "", "T2"]}}"#).unwrap();
        assert_eq!(update.vehicle_ids, Some(ids(&["T1", "T2"])));
    }

    #[test]
    fn test_null_and_empty_clear_fields() {
        let update =
            parse_filter_update(r#"{"filters": {"car": null, "dateFrom": "", "dateTo": null}}"#)
                .unwrap();
        assert_eq!(update.vehicle_ids, Some(BTreeSet::new()));
        assert_eq!(update.date_from, Some(None));
        assert_eq!(update.date_to, Some(None));
    }

    #[test]
    fn test_snake_case_aliases() {
        let update = parse_filter_update(r#"{"filters": {"date_from": "2024-01-02"}}"#).unwrap();
        assert_eq!(update.date_from, Some(NaiveDate::from_ymd_opt(2024, 1, 2)));
    }

    #[test]
    fn test_empty_filters_object_is_noop() {
        let update = parse_filter_update(r#"{"filters": {}}"#).unwrap();
        assert_eq!(update, FilterUpdate::default());
    }

    #[test]
    fn test_malformed_messages_rejected() {
        assert!(matches!(
            parse_filter_update("not json"),
            Err(ClientMessageError::Json(_))
        ));
        assert!(matches!(
            parse_filter_update(r#"{"hello": 1}"#),
            Err(ClientMessageError::MissingFilters)
        ));
        assert!(matches!(
            parse_filter_update(r#"{"filters": null}"#),
            Err(ClientMessageError::MissingFilters)
        ));
        assert!(matches!(
            parse_filter_update(r#"{"filters": "T1"}"#),
            Err(ClientMessageError::Json(_))
        ));
        assert!(matches!(
            parse_filter_update(r#"{"filters": {"car": 42}}"#),
            Err(ClientMessageError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_date_rejects_whole_message() {
        let err = parse_filter_update(r#"{"filters": {"car": "T1", "dateTo": "05/01/2024"}}"#)
            .unwrap_err();
        assert!(matches!(err, ClientMessageError::Filter(_)));
        assert!(err.to_string().contains("dateTo"));
    }
}
