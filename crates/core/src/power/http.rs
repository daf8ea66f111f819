use crate::config::Settings;
use crate::power::{ClimateSource, PowerRequest, SourceReply};
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 25;
const DAILY_POINT_PATH: &str = "/api/temporal/daily/point";

/// NASA POWER daily point endpoint.
#[derive(Debug, Clone)]
pub struct PowerClient {
    http: reqwest::Client,
    base_url: String,
}

impl PowerClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = std::env::var("POWER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build POWER http client")?;

        Ok(Self {
            http,
            base_url: settings.power_base_url.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), DAILY_POINT_PATH)
    }

    fn query(req: &PowerRequest) -> Vec<(&'static str, String)> {
        vec![
            ("parameters", req.parameter_list()),
            ("community", req.community.as_str().to_string()),
            ("longitude", req.coordinate.longitude().to_string()),
            ("latitude", req.coordinate.latitude().to_string()),
            ("start", req.range.provider_start()),
            ("end", req.range.provider_end()),
            ("format", "JSON".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl ClimateSource for PowerClient {
    fn source_name(&self) -> &'static str {
        "nasa_power"
    }

    fn target(&self, req: &PowerRequest) -> String {
        let query = Self::query(req)
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.url())
    }

    async fn send(&self, req: &PowerRequest) -> Result<SourceReply> {
        let res = self
            .http
            .get(self.url())
            .query(&Self::query(req))
            .send()
            .await
            .context("POWER request failed")?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .context("failed to read POWER response body")?;

        Ok(SourceReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::climate::{Community, DateRange, PARAMETER_SETS};
    use crate::domain::location::Coordinate;
    use chrono::NaiveDate;

    #[test]
    fn target_lists_every_query_parameter() {
        let client = PowerClient {
            http: reqwest::Client::new(),
            base_url: "https://power.example.org/".to_string(),
        };
        let req = PowerRequest {
            coordinate: Coordinate::try_new(23.18, 79.95).unwrap(),
            range: DateRange::ending_on(NaiveDate::from_ymd_opt(2026, 7, 10).unwrap(), 10).unwrap(),
            community: Community::Agriculture,
            parameters: PARAMETER_SETS[2],
        };

        assert_eq!(
            client.target(&req),
            "https://power.example.org/api/temporal/daily/point?parameters=PRECTOTCORR,T2M\
             &community=AG&longitude=79.95&latitude=23.18&start=20260701&end=20260710&format=JSON"
        );
    }
}
