use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub const MIN_DAYS: u32 = 3;
pub const MAX_DAYS: u32 = 30;

pub const TEMPERATURE_VARIABLE: &str = "T2M";

/// Precipitation column names, most preferred first.
pub const PRECIPITATION_VARIABLES: [&str; 5] = ["PRECTOT", "PRECTOTCORR", "PRCP", "RAIN", "APCP"];

/// Candidate parameter sets, richest first. The last one is a single variable.
pub const PARAMETER_SETS: [&[&str]; 4] = [
    &[
        "PRECTOT",
        "PRECTOTCORR",
        "T2M",
        "RH2M",
        "WS2M",
        "ALLSKY_SFC_SW_DWN",
    ],
    &["PRECTOTCORR", "T2M", "RH2M", "WS2M"],
    &["PRECTOTCORR", "T2M"],
    &["T2M"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("day count must be {MIN_DAYS}..={MAX_DAYS} (got {0})")]
    DaysOutOfRange(u32),
}

impl DateRange {
    /// `days` calendar days ending on (and including) `end`.
    pub fn ending_on(end: NaiveDate, days: u32) -> Result<Self, DateRangeError> {
        if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
            return Err(DateRangeError::DaysOutOfRange(days));
        }
        let start = end - Duration::days(i64::from(days) - 1);
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    pub fn provider_start(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    pub fn provider_end(&self) -> String {
        self.end.format("%Y%m%d").to_string()
    }
}

/// POWER collection profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Community {
    #[serde(rename = "AG")]
    Agriculture,
    #[serde(rename = "RE")]
    RenewableEnergy,
}

impl Community {
    pub const ALL: [Community; 2] = [Community::Agriculture, Community::RenewableEnergy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Community::Agriculture => "AG",
            Community::RenewableEnergy => "RE",
        }
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Community {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AG" => Ok(Community::Agriculture),
            "RE" => Ok(Community::RenewableEnergy),
            other => anyhow::bail!("unknown community {other:?} (expected AG or RE)"),
        }
    }
}

/// Date-indexed table of daily values. Dates ascending and unique; every
/// column holds exactly one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClimateTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl ClimateTable {
    pub fn from_series(series: BTreeMap<String, BTreeMap<NaiveDate, Option<f64>>>) -> Self {
        let dates: Vec<NaiveDate> = series
            .values()
            .flat_map(|s| s.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = series
            .into_iter()
            .map(|(name, values)| {
                let aligned = dates
                    .iter()
                    .map(|d| values.get(d).copied().flatten())
                    .collect();
                (name, aligned)
            })
            .collect();

        Self { dates, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn valid_count(&self, name: &str) -> usize {
        self.column(name)
            .map(|c| c.iter().filter(|v| v.is_some()).count())
            .unwrap_or(0)
    }

    /// Non-missing count per column.
    pub fn quality(&self) -> BTreeMap<String, usize> {
        self.columns
            .keys()
            .map(|k| (k.clone(), self.valid_count(k)))
            .collect()
    }

    /// Mean over non-missing values; `None` when the column is absent or all missing.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let col = self.column(name)?;
        let (sum, n) = col
            .iter()
            .flatten()
            .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
        if n == 0 {
            return None;
        }
        Some(sum / n as f64)
    }

    /// Value on the last date and its change from the previous date.
    pub fn latest(&self, name: &str) -> Option<SeriesMetric> {
        let col = self.column(name)?;
        if self.valid_count(name) == 0 {
            return None;
        }
        let latest = col.last().copied().flatten();
        let previous = col.len().checked_sub(2).and_then(|i| col[i]);
        let delta = match (latest, previous) {
            (Some(now), Some(prev)) => Some(now - prev),
            _ => None,
        };
        Some(SeriesMetric {
            variable: name.to_string(),
            latest,
            delta,
        })
    }

    /// First precipitation column present, by preference order.
    pub fn precipitation_variable(&self) -> Option<&'static str> {
        PRECIPITATION_VARIABLES
            .iter()
            .copied()
            .find(|k| self.contains(k))
    }

    /// Rows for the last `n` dates, oldest first.
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, Vec<Option<f64>>)> {
        let skip = self.dates.len().saturating_sub(n);
        self.dates
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, d)| (*d, self.columns.values().map(|c| c[i]).collect()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMetric {
    pub variable: String,
    pub latest: Option<f64>,
    pub delta: Option<f64>,
}
