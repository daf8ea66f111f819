use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farmnav_core::domain::advisory::{Language, SoilType};
use farmnav_core::domain::climate::Community;
use farmnav_core::domain::location::{LocationError, LocationQuery};
use farmnav_core::pipeline::{self, AdvisoryReport, AdvisoryRequest, PipelineError, Presentation, Services};
use farmnav_core::power::error::FetchFailure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = farmnav_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let services = match Services::from_settings(&settings) {
        Ok(services) => services,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "provider clients could not be built");
            return Err(e);
        }
    };

    let state = AppState {
        services,
        utc_offset_minutes: settings.utc_offset_minutes,
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/advisory", get(get_advisory))
        .route("/advisory/table.csv", get(get_table_csv))
        .route("/advisory/raw.json", get(get_raw_json))
        .route("/advisory/speech", get(get_speech))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    services: Services,
    utc_offset_minutes: i32,
}

#[derive(Debug, Default, Deserialize)]
struct AdvisoryParams {
    lat: Option<f64>,
    lon: Option<f64>,
    place: Option<String>,
    days: Option<u32>,
    soil: Option<String>,
    language: Option<String>,
    community: Option<String>,
    #[serde(default)]
    compare: bool,
    #[serde(default)]
    simple: bool,
    /// YYYY-MM-DD; defaults to the configured local date.
    today: Option<String>,
}

impl AdvisoryParams {
    fn request(&self) -> anyhow::Result<AdvisoryRequest> {
        let location = match (self.lat, self.lon, self.place.as_deref()) {
            (Some(latitude), Some(longitude), None) => LocationQuery::Coordinates {
                latitude,
                longitude,
            },
            (None, None, Some(place)) => LocationQuery::Place(place.to_string()),
            _ => anyhow::bail!("give either lat and lon, or place"),
        };

        Ok(AdvisoryRequest {
            location,
            days: self.days.unwrap_or(10),
            soil: parse_or(self.soil.as_deref(), SoilType::Loamy)?,
            language: parse_or(self.language.as_deref(), Language::English)?,
            community: parse_or(self.community.as_deref(), Community::Agriculture)?,
            compare_communities: self.compare,
            presentation: if self.simple {
                Presentation::Simple
            } else {
                Presentation::Full
            },
            write_artifacts: true,
            synthesize_audio: false,
        })
    }
}

fn parse_or<T>(value: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    value.map_or(Ok(default), str::parse)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<FetchFailure>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: impl std::fmt::Display) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                diagnostic: None,
            },
        }
    }

    fn bad_request(err: anyhow::Error) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("{err:#}"))
    }

    fn from_pipeline(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::DateRange(_) => StatusCode::BAD_REQUEST,
            PipelineError::Location(LocationError::NotFound(_)) => StatusCode::NOT_FOUND,
            PipelineError::Location(e) if e.is_user_input() => StatusCode::BAD_REQUEST,
            PipelineError::Location(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
            return Self::new(status, "location service unavailable; try again");
        }
        Self::new(status, err)
    }

    fn no_data(failure: &FetchFailure) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorBody {
                error: "climate data unavailable for every community".to_string(),
                diagnostic: Some(failure.clone()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// What the handler sends back, which decides the side effects a run may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    /// JSON report; saves artifacts when an output directory is configured.
    Report,
    /// CSV or raw JSON body; no files and no speech.
    Download,
    /// Audio bytes only.
    Speech,
}

impl AppState {
    /// Runs the pipeline; fails when no community produced data.
    async fn advise(&self, params: &AdvisoryParams, output: Output) -> Result<AdvisoryReport, ApiError> {
        let mut request = params.request().map_err(ApiError::bad_request)?;
        request.write_artifacts = output == Output::Report;
        if output == Output::Speech {
            request.presentation = Presentation::Full;
            request.synthesize_audio = true;
        }
        let today = farmnav_core::time::local_date::resolve_today(
            params.today.as_deref(),
            chrono::Utc::now(),
            self.utc_offset_minutes,
        )
        .map_err(ApiError::bad_request)?;

        let report = pipeline::run(&self.services, request, today)
            .await
            .map_err(ApiError::from_pipeline)?;

        if let Some(failure) = report.all_failed() {
            tracing::error!(error = %failure, "advisory request produced no data");
            return Err(ApiError::no_data(failure));
        }
        Ok(report)
    }
}

async fn get_advisory(
    State(state): State<AppState>,
    Query(params): Query<AdvisoryParams>,
) -> Result<Json<AdvisoryReport>, ApiError> {
    Ok(Json(state.advise(&params, Output::Report).await?))
}

async fn get_table_csv(
    State(state): State<AppState>,
    Query(params): Query<AdvisoryParams>,
) -> Result<Response, ApiError> {
    let report = state.advise(&params, Output::Download).await?;
    let Some((_, series)) = report.first_success() else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "no table"));
    };
    let body = farmnav_core::export::table_csv(&series.table).map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "csv export failed")
    })?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
}

async fn get_raw_json(
    State(state): State<AppState>,
    Query(params): Query<AdvisoryParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.advise(&params, Output::Download).await?;
    let Some((_, series)) = report.first_success() else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "no raw response"));
    };
    Ok(Json(series.raw.clone()))
}

async fn get_speech(
    State(state): State<AppState>,
    Query(params): Query<AdvisoryParams>,
) -> Result<Response, ApiError> {
    let report = state.advise(&params, Output::Speech).await?;
    let audio = report
        .first_success()
        .and_then(|(_, series)| series.audio.as_ref());
    Ok(match audio {
        Some(audio) => ([(header::CONTENT_TYPE, audio.mime)], audio.bytes.clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &farmnav_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
