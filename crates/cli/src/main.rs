use anyhow::Context;
use clap::Parser;
use farmnav_core::domain::advisory::{Language, SoilType};
use farmnav_core::domain::climate::Community;
use farmnav_core::domain::location::LocationQuery;
use farmnav_core::pipeline::{self, AdvisoryRequest, Presentation, Services};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "farmnav", about = "Weather-based crop advisory for a farm location")]
struct Args {
    /// Latitude in decimal degrees (use with --lon).
    #[arg(long, requires = "lon", conflicts_with = "place", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees (use with --lat).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Place name to geocode, e.g. "Jabalpur, India".
    #[arg(long)]
    place: Option<String>,

    /// Days of history ending today (3-30).
    #[arg(long, default_value_t = 10)]
    days: u32,

    #[arg(long, default_value = "loamy")]
    soil: SoilType,

    /// en or hi.
    #[arg(long, default_value = "en")]
    language: Language,

    /// AG or RE.
    #[arg(long, default_value = "AG")]
    community: Community,

    /// Run both communities and print a comparison.
    #[arg(long)]
    compare: bool,

    /// Advisory text only.
    #[arg(long)]
    simple: bool,

    /// Override today's date (YYYY-MM-DD).
    #[arg(long)]
    today: Option<String>,

    /// Where to save raw JSON and CSV. Defaults to ADVISORY_OUTPUT_DIR.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Synthesize the spoken advisory and write the audio here.
    #[arg(long)]
    audio_out: Option<PathBuf>,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn location(&self) -> anyhow::Result<LocationQuery> {
        match (self.lat, self.lon, &self.place) {
            (Some(latitude), Some(longitude), None) => Ok(LocationQuery::Coordinates {
                latitude,
                longitude,
            }),
            (None, None, Some(place)) => Ok(LocationQuery::Place(place.clone())),
            _ => anyhow::bail!("give either --lat and --lon, or --place"),
        }
    }

    fn request(&self) -> anyhow::Result<AdvisoryRequest> {
        Ok(AdvisoryRequest {
            location: self.location()?,
            days: self.days,
            soil: self.soil,
            language: self.language,
            community: self.community,
            compare_communities: self.compare,
            presentation: if self.simple {
                Presentation::Simple
            } else {
                Presentation::Full
            },
            write_artifacts: true,
            synthesize_audio: self.audio_out.is_some(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = farmnav_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "advisory run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: &Args, settings: &farmnav_core::config::Settings) -> anyhow::Result<()> {
    let request = args.request()?;
    let today = farmnav_core::time::local_date::resolve_today(
        args.today.as_deref(),
        chrono::Utc::now(),
        settings.utc_offset_minutes,
    )?;

    let mut services = Services::from_settings(settings)?;
    if let Some(dir) = &args.out_dir {
        services.output_dir = Some(dir.clone());
    }

    let report = pipeline::run(&services, request, today).await?;

    if args.json {
        let body = serde_json::to_string_pretty(&report).context("serialize report failed")?;
        println!("{body}");
    } else {
        print!("{}", render::report(&report));
    }

    if let Some(path) = &args.audio_out {
        match report.first_success().and_then(|(_, s)| s.audio.as_ref()) {
            Some(audio) => {
                std::fs::write(path, &audio.bytes)
                    .with_context(|| format!("write audio to {} failed", path.display()))?;
                tracing::info!(path = %path.display(), mime = audio.mime, "audio saved");
            }
            None => tracing::warn!("no audio preview available; nothing written"),
        }
    }

    if let Some(failure) = report.all_failed() {
        anyhow::bail!("no climate data for any community: {failure}");
    }
    Ok(())
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
