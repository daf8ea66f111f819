use crate::domain::climate::{ClimateTable, DateRange};
use crate::power::schema::RawSeriesResponse;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Provider fill values sit at -999; anything at or below this is "missing".
pub const MISSING_SENTINEL_MAX: f64 = -900.0;

/// Dates outside `range` are dropped, so the table never has more rows than requested days.
pub fn normalize(response: &RawSeriesResponse, range: &DateRange) -> ClimateTable {
    let mut series: BTreeMap<String, BTreeMap<NaiveDate, Option<f64>>> = BTreeMap::new();

    for (variable, values) in &response.parameters {
        let Value::Object(by_date) = values else {
            tracing::debug!(%variable, "skipping non-object parameter entry");
            continue;
        };

        let mut column = BTreeMap::new();
        let mut numeric = 0usize;
        for (key, value) in by_date {
            let Some(date) = parse_date_key(key) else {
                tracing::warn!(%variable, key = %key, "skipping unparseable date key");
                continue;
            };
            if !range.contains(date) {
                tracing::warn!(%variable, %date, "skipping date outside requested range");
                continue;
            }
            let parsed = value.as_f64().filter(|v| v.is_finite());
            if parsed.is_some() {
                numeric += 1;
            }
            column.insert(date, parsed.filter(|v| *v > MISSING_SENTINEL_MAX));
        }

        if numeric == 0 {
            tracing::debug!(%variable, "no numeric values; dropping column");
            continue;
        }
        series.insert(variable.clone(), column);
    }

    ClimateTable::from_series(series)
}

/// `YYYYMMDD`, exactly eight ASCII digits.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(raw: Value) -> RawSeriesResponse {
        RawSeriesResponse::from_value(raw).unwrap()
    }

    fn wide() -> DateRange {
        DateRange::ending_on(d(2026, 1, 4), 30).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sentinels_become_missing() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {
                "PRECTOTCORR": {"20260101": -999.0, "20260102": -900.0, "20260103": -899.9, "20260104": 0.0},
                "T2M": {"20260101": -999, "20260102": 21.5, "20260103": -1000.25, "20260104": 22.0}
            }}
        })), &wide());

        assert_eq!(
            table.column("PRECTOTCORR").unwrap(),
            &[None, None, Some(-899.9), Some(0.0)]
        );
        assert_eq!(table.column("T2M").unwrap(), &[None, Some(21.5), None, Some(22.0)]);
        for col in ["PRECTOTCORR", "T2M"] {
            assert!(table
                .column(col)
                .unwrap()
                .iter()
                .flatten()
                .all(|v| *v > MISSING_SENTINEL_MAX));
        }
    }

    #[test]
    fn rows_are_sorted_and_unique_across_variables() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {
                "T2M": {"20251231": 10.0, "20260102": 12.0, "20260101": 11.0},
                "RH2M": {"20260102": 60.0, "20251231": 55.0}
            }}
        })), &wide());

        assert_eq!(table.dates(), &[d(2025, 12, 31), d(2026, 1, 1), d(2026, 1, 2)]);
        assert!(table.dates().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.column("RH2M").unwrap(), &[Some(55.0), None, Some(60.0)]);
    }

    #[test]
    fn non_numeric_entries_are_missing() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {
                "T2M": {"20260101": "n/a", "20260102": null, "20260103": 19.0}
            }}
        })), &wide());
        assert_eq!(table.column("T2M").unwrap(), &[None, None, Some(19.0)]);
    }

    #[test]
    fn no_numeric_variables_yields_empty_table() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {
                "T2M": {"20260101": "bad", "20260102": null},
                "units": "C",
                "WS2M": {}
            }}
        })), &wide());
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);

        let table = normalize(&response(json!({"properties": {"parameter": {}}})), &wide());
        assert!(table.is_empty());
    }

    #[test]
    fn all_sentinel_column_is_kept_but_has_no_values() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {"PRECTOT": {"20260101": -999.0, "20260102": -999.0}}}
        })), &wide());
        assert!(!table.is_empty());
        assert_eq!(table.valid_count("PRECTOT"), 0);
        assert_eq!(table.mean("PRECTOT"), None);
    }

    #[test]
    fn dates_outside_range_are_dropped() {
        let range = DateRange::ending_on(d(2026, 7, 3), 3).unwrap();
        let table = normalize(
            &response(json!({
                "properties": {"parameter": {
                    "T2M": {
                        "20260629": 30.0, "20260630": 29.0,
                        "20260701": 25.0, "20260702": 27.0, "20260703": 26.0
                    },
                    "PRECTOTCORR": {"20260630": 99.0, "20260704": 1.0}
                }}
            })),
            &range,
        );
        assert_eq!(table.dates(), &[d(2026, 7, 1), d(2026, 7, 2), d(2026, 7, 3)]);
        assert!(table.len() <= range.days() as usize);
        assert_eq!(table.mean("T2M"), Some(26.0));
        assert!(!table.contains("PRECTOTCORR"));
    }

    #[test]
    fn parses_only_eight_digit_keys() {
        assert_eq!(parse_date_key("20240229"), Some(d(2024, 2, 29)));
        assert_eq!(parse_date_key("20230229"), None);
        assert_eq!(parse_date_key("2024-02-01"), None);
        assert_eq!(parse_date_key("202402011"), None);
        assert_eq!(parse_date_key("+2024021"), None);
        assert_eq!(parse_date_key("20241301"), None);
    }

    #[test]
    fn bad_date_keys_are_skipped() {
        let table = normalize(&response(json!({
            "properties": {"parameter": {"T2M": {"20260101": 1.0, "2026-01-02": 2.0, "ANN": 3.0}}}
        })), &wide());
        assert_eq!(table.dates(), &[d(2026, 1, 1)]);
    }
}
