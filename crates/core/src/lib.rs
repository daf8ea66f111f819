pub mod advisory;
pub mod domain;
pub mod export;
pub mod geocode;
pub mod normalize;
pub mod pipeline;
pub mod power;
pub mod speech;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_POWER_BASE_URL: &str = "https://power.larc.nasa.gov";
    const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
    const DEFAULT_GEOCODER_USER_AGENT: &str = "farm_navigator";
    const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";
    // IST; season and date range are computed on the farmer's calendar.
    const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TtsProvider {
        Google,
        Command,
        Disabled,
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub power_base_url: String,
        pub geocoder_base_url: String,
        pub geocoder_user_agent: String,
        pub tts_provider: TtsProvider,
        pub tts_base_url: String,
        pub tts_command: Option<String>,
        pub tts_spool_dir: Option<String>,
        pub output_dir: Option<String>,
        pub utc_offset_minutes: i32,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let tts_provider = match std::env::var("TTS_PROVIDER") {
                Ok(s) => parse_tts_provider(&s)?,
                Err(_) => TtsProvider::Google,
            };

            let utc_offset_minutes = match std::env::var("ADVISORY_UTC_OFFSET_MINUTES") {
                Ok(s) => s.trim().parse::<i32>().with_context(|| {
                    format!("ADVISORY_UTC_OFFSET_MINUTES must be an integer (got {s:?})")
                })?,
                Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
            };
            anyhow::ensure!(
                (-14 * 60..=14 * 60).contains(&utc_offset_minutes),
                "ADVISORY_UTC_OFFSET_MINUTES out of range: {utc_offset_minutes}"
            );

            Ok(Self {
                power_base_url: env_or("POWER_BASE_URL", DEFAULT_POWER_BASE_URL),
                geocoder_base_url: env_or("GEOCODER_BASE_URL", DEFAULT_GEOCODER_BASE_URL),
                geocoder_user_agent: env_or("GEOCODER_USER_AGENT", DEFAULT_GEOCODER_USER_AGENT),
                tts_provider,
                tts_base_url: env_or("TTS_BASE_URL", DEFAULT_TTS_BASE_URL),
                tts_command: non_empty_env("TTS_COMMAND"),
                tts_spool_dir: non_empty_env("TTS_SPOOL_DIR"),
                output_dir: non_empty_env("ADVISORY_OUTPUT_DIR"),
                utc_offset_minutes,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_tts_command(&self) -> anyhow::Result<&str> {
            self.tts_command
                .as_deref()
                .context("TTS_COMMAND is required when TTS_PROVIDER=command")
        }
    }

    fn env_or(key: &str, default: &str) -> String {
        non_empty_env(key).unwrap_or_else(|| default.to_string())
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_tts_provider(s: &str) -> anyhow::Result<TtsProvider> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "" => Ok(TtsProvider::Google),
            "command" => Ok(TtsProvider::Command),
            "none" | "off" | "disabled" => Ok(TtsProvider::Disabled),
            other => anyhow::bail!("unknown TTS_PROVIDER: {other}"),
        }
    }

}
