use crate::config::Settings;
use crate::domain::location::Coordinate;
use crate::geocode::{GeocodeMatch, Geocoder};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const SEARCH_PATH: &str = "/search";

/// OpenStreetMap Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = std::env::var("GEOCODER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build geocoder http client")?;

        Ok(Self {
            http,
            base_url: settings.geocoder_base_url.clone(),
            user_agent: settings.geocoder_user_agent.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        // Nominatim's usage policy rejects requests without an identifying agent.
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    fn provider_name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, place: &str) -> Result<Option<GeocodeMatch>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[("q", place), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .context("geocoder request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read geocoder response")?;
        if !status.is_success() {
            anyhow::bail!("geocoder HTTP {status}: {}", excerpt(&text, 300));
        }

        parse_first_hit(&text)
    }
}

fn parse_first_hit(text: &str) -> Result<Option<GeocodeMatch>> {
    let hits = serde_json::from_str::<Vec<SearchHit>>(text)
        .with_context(|| format!("geocoder response is not a result list: {}", excerpt(text, 300)))?;

    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let latitude = hit
        .lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("geocoder returned non-numeric lat {:?}", hit.lat))?;
    let longitude = hit
        .lon
        .trim()
        .parse::<f64>()
        .with_context(|| format!("geocoder returned non-numeric lon {:?}", hit.lon))?;

    Ok(Some(GeocodeMatch {
        coordinate: Coordinate::try_new(latitude, longitude)?,
        display_name: hit.display_name,
    }))
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
