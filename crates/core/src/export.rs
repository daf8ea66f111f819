use crate::domain::climate::{ClimateTable, Community};
use anyhow::Context;
use std::path::{Path, PathBuf};

pub fn raw_file_name(community: Community) -> String {
    format!("api_raw_{community}.json")
}

pub fn csv_file_name(community: Community) -> String {
    format!("nasa_power_{community}.csv")
}

/// `date` column then one column per variable; missing values are empty cells.
pub fn table_csv(table: &ClimateTable) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let variables: Vec<&str> = table.variables().collect();
    let mut header = Vec::with_capacity(variables.len() + 1);
    header.push("date");
    header.extend(variables.iter().copied());
    writer.write_record(&header).context("write csv header failed")?;

    for (idx, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(variables.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        for var in &variables {
            let cell = table
                .column(var)
                .and_then(|c| c[idx])
                .map(|v| v.to_string())
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record).context("write csv row failed")?;
    }

    let bytes = writer.into_inner().context("flush csv writer failed")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

/// Overwrites any previous artifact of the same name.
pub fn write_raw_json(
    dir: &Path,
    community: Community,
    raw: &serde_json::Value,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(raw_file_name(community));
    let body = serde_json::to_string_pretty(raw).context("serialize raw response failed")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir {} failed", dir.display()))?;
    std::fs::write(&path, body).with_context(|| format!("write {} failed", path.display()))?;
    Ok(path)
}

pub fn write_table_csv(
    dir: &Path,
    community: Community,
    table: &ClimateTable,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(csv_file_name(community));
    let body = table_csv(table)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir {} failed", dir.display()))?;
    std::fs::write(&path, body).with_context(|| format!("write {} failed", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample() -> ClimateTable {
        let d1 = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 7, 2).unwrap();
        ClimateTable::from_series(BTreeMap::from([
            (
                "PRECTOTCORR".to_string(),
                BTreeMap::from([(d1, Some(1.5)), (d2, None)]),
            ),
            (
                "T2M".to_string(),
                BTreeMap::from([(d1, Some(26.25)), (d2, Some(27.0))]),
            ),
        ]))
    }

    #[test]
    fn csv_has_date_column_and_blank_missing_cells() {
        let csv = table_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,PRECTOTCORR,T2M");
        assert_eq!(lines[1], "2026-07-01,1.5,26.25");
        assert_eq!(lines[2], "2026-07-02,,27");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_table_exports_header_only() {
        let csv = table_csv(&ClimateTable::default()).unwrap();
        assert_eq!(csv.trim_end(), "date");
    }

    #[test]
    fn artifacts_are_named_by_community_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_raw_json(dir.path(), Community::Agriculture, &json!({"a": 1})).unwrap();
        let second = write_raw_json(dir.path(), Community::Agriculture, &json!({"a": 2})).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("api_raw_AG.json"));
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
        assert_eq!(saved, json!({"a": 2}));

        let csv = write_table_csv(dir.path(), Community::RenewableEnergy, &sample()).unwrap();
        assert!(csv.ends_with("nasa_power_RE.csv"));
        assert!(std::fs::read_to_string(csv).unwrap().starts_with("date,"));
    }
}
