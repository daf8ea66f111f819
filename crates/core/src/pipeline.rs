use crate::advisory::{self, AdvisoryInput};
use crate::config::Settings;
use crate::domain::advisory::{Advisory, Language, SoilType};
use crate::domain::climate::{
    ClimateTable, Community, DateRange, DateRangeError, SeriesMetric, TEMPERATURE_VARIABLE,
};
use crate::domain::location::{LocationError, LocationQuery, ResolvedLocation};
use crate::export;
use crate::geocode::{self, nominatim::NominatimGeocoder, Geocoder};
use crate::normalize;
use crate::power::error::FetchFailure;
use crate::power::{self, http::PowerClient, ClimateSource};
use crate::speech::{self, AudioPreview, SpeechSynthesizer};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const RECENT_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// Advisory text only.
    Simple,
    /// Adds data quality, latest metrics, recent rows, and artifacts; audio when asked for.
    #[default]
    Full,
}

/// Everything one user action asked for. Built once; the pipeline never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryRequest {
    pub location: LocationQuery,
    pub days: u32,
    pub soil: SoilType,
    pub language: Language,
    pub community: Community,
    pub compare_communities: bool,
    pub presentation: Presentation,
    /// Save raw JSON and CSV when an output directory is configured.
    pub write_artifacts: bool,
    /// Call the speech provider for the spoken advisory.
    pub synthesize_audio: bool,
}

impl AdvisoryRequest {
    pub fn communities(&self) -> Vec<Community> {
        if self.compare_communities {
            Community::ALL.to_vec()
        } else {
            vec![self.community]
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub climate: Arc<dyn ClimateSource>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub output_dir: Option<PathBuf>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::from_settings(settings)?),
            climate: Arc::new(PowerClient::from_settings(settings)?),
            speech: speech::from_settings(settings)?,
            output_dir: settings.output_dir.as_ref().map(PathBuf::from),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryReport {
    pub location: ResolvedLocation,
    pub range: DateRange,
    pub presentation: Presentation,
    pub communities: Vec<CommunityReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comparison: Vec<ComparisonRow>,
}

impl AdvisoryReport {
    pub fn first_success(&self) -> Option<(Community, &FetchedSeries)> {
        self.communities.iter().find_map(|c| match &c.outcome {
            CommunityOutcome::Fetched(s) => Some((c.community, s.as_ref())),
            CommunityOutcome::Failed { .. } => None,
        })
    }

    /// Last failure when no community produced data.
    pub fn all_failed(&self) -> Option<&FetchFailure> {
        if self.first_success().is_some() {
            return None;
        }
        self.communities.iter().rev().find_map(|c| match &c.outcome {
            CommunityOutcome::Failed { failure } => Some(failure),
            CommunityOutcome::Fetched(_) => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommunityReport {
    pub community: Community,
    #[serde(flatten)]
    pub outcome: CommunityOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommunityOutcome {
    Fetched(Box<FetchedSeries>),
    Failed { failure: FetchFailure },
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedSeries {
    pub parameters: Vec<String>,
    pub attempts: usize,
    pub table: ClimateTable,
    pub advisory: Advisory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SeriesDetails>,
    pub audio_available: bool,
    #[serde(skip)]
    pub audio: Option<AudioPreview>,
    #[serde(skip)]
    pub raw: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesDetails {
    pub quality: BTreeMap<String, usize>,
    pub temperature: Option<SeriesMetric>,
    pub precipitation: Option<SeriesMetric>,
    pub recent: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl SeriesDetails {
    fn from_table(table: &ClimateTable) -> Self {
        Self {
            quality: table.quality(),
            temperature: table.latest(TEMPERATURE_VARIABLE),
            precipitation: table.precipitation_variable().and_then(|k| table.latest(k)),
            recent: table.tail(RECENT_ROWS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub community: Community,
    pub average_rainfall: Option<f64>,
    pub average_temperature: Option<f64>,
}

/// Resolve -> fetch -> normalize -> advise, once per requested community.
///
/// Location and day-count problems abort the request. A failed fetch only
/// marks that community as failed; the others still run.
pub async fn run(
    services: &Services,
    request: AdvisoryRequest,
    today: NaiveDate,
) -> Result<AdvisoryReport, PipelineError> {
    let range = DateRange::ending_on(today, request.days)?;
    let location = geocode::resolve(services.geocoder.as_ref(), &request.location).await?;

    tracing::info!(
        coordinate = %location.coordinate,
        start = %range.start(),
        end = %range.end(),
        compare = request.compare_communities,
        "advisory run started"
    );

    let mut communities = Vec::new();
    for community in request.communities() {
        let outcome = match power::fetch_with_fallback(
            services.climate.as_ref(),
            location.coordinate,
            range,
            community,
        )
        .await
        {
            Ok(fetched) => {
                let series =
                    build_series(services, &request, &location, range, today, fetched).await;
                CommunityOutcome::Fetched(Box::new(series))
            }
            Err(failure) => {
                tracing::error!(%community, error = %failure, "community fetch failed");
                CommunityOutcome::Failed { failure }
            }
        };
        communities.push(CommunityReport { community, outcome });
    }

    let comparison = if request.compare_communities {
        communities
            .iter()
            .filter_map(|c| match &c.outcome {
                CommunityOutcome::Fetched(s) => Some(ComparisonRow {
                    community: c.community,
                    average_rainfall: s.advisory.average_rainfall,
                    average_temperature: s.advisory.average_temperature,
                }),
                CommunityOutcome::Failed { .. } => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(AdvisoryReport {
        location,
        range,
        presentation: request.presentation,
        communities,
        comparison,
    })
}

async fn build_series(
    services: &Services,
    request: &AdvisoryRequest,
    location: &ResolvedLocation,
    range: DateRange,
    today: NaiveDate,
    fetched: power::FetchSuccess,
) -> FetchedSeries {
    let community = fetched.community;
    let table = normalize::normalize(&fetched.response, &range);
    if table.is_empty() {
        tracing::warn!(%community, "no numeric time series after normalization");
    }

    let advisory = advisory::advise(
        &table,
        AdvisoryInput {
            coordinate: location.coordinate,
            soil: request.soil,
            language: request.language,
            month: today.month(),
        },
    );

    let full = request.presentation == Presentation::Full;

    let audio = match (&services.speech, full && request.synthesize_audio) {
        (Some(synth), true) => {
            speech::preview(synth.as_ref(), &advisory.spoken_text, request.language).await
        }
        _ => None,
    };

    let mut artifacts = Vec::new();
    if let (Some(dir), true) = (&services.output_dir, full && request.write_artifacts) {
        match export::write_raw_json(dir, community, &fetched.response.raw) {
            Ok(path) => artifacts.push(path),
            Err(err) => tracing::warn!(%community, error = %err, "raw response not saved"),
        }
        match export::write_table_csv(dir, community, &table) {
            Ok(path) => artifacts.push(path),
            Err(err) => tracing::warn!(%community, error = %err, "csv not saved"),
        }
    }

    FetchedSeries {
        parameters: fetched.parameters.iter().map(|p| p.to_string()).collect(),
        attempts: fetched.attempts,
        details: full.then(|| SeriesDetails::from_table(&table)),
        table,
        advisory,
        audio_available: audio.is_some(),
        audio,
        raw: fetched.response.raw,
        artifacts,
    }
}
