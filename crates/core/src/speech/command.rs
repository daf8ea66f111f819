use crate::config::Settings;
use crate::domain::advisory::Language;
use crate::speech::SpeechSynthesizer;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const OUT_PLACEHOLDER: &str = "{out}";
const TEXT_PLACEHOLDER: &str = "{text}";
const LANG_PLACEHOLDER: &str = "{lang}";

/// Runs a local TTS program that can only write to a file, e.g.
/// `espeak-ng -v {lang} -w {out} {text}`.
///
/// The output file lives in a `tempfile` guard, so it is removed when
/// synthesis returns, whether the program failed, timed out, or succeeded.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    spool_dir: PathBuf,
    timeout: Duration,
    suffix: String,
    mime: &'static str,
}

impl CommandSynthesizer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let command = settings.require_tts_command()?;
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().context("TTS_COMMAND is empty")?;
        let args: Vec<String> = parts.collect();

        let timeout_secs = std::env::var("TTS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let spool_dir = settings
            .tts_spool_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Self::new(program, args, spool_dir, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        program: String,
        args: Vec<String>,
        spool_dir: PathBuf,
        timeout: Duration,
    ) -> Result<Self> {
        anyhow::ensure!(
            args.iter().any(|a| a.contains(OUT_PLACEHOLDER)),
            "TTS command must take the output path via {OUT_PLACEHOLDER}"
        );
        Ok(Self {
            program,
            args,
            spool_dir,
            timeout,
            suffix: ".wav".to_string(),
            mime: "audio/wav",
        })
    }

    fn render_args(&self, out: &str, text: &str, language: Language) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace(OUT_PLACEHOLDER, out)
                    .replace(LANG_PLACEHOLDER, language.code())
                    .replace(TEXT_PLACEHOLDER, text)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn provider_name(&self) -> &'static str {
        "command"
    }

    fn mime(&self) -> &'static str {
        self.mime
    }

    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let spool = tempfile::Builder::new()
            .prefix("farmnav-tts-")
            .suffix(&self.suffix)
            .tempfile_in(&self.spool_dir)
            .with_context(|| {
                format!("failed to create TTS spool file in {}", self.spool_dir.display())
            })?;
        let out = spool.path().to_string_lossy().into_owned();

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.render_args(&out, text, language))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .with_context(|| format!("TTS command timed out after {:?}", self.timeout))?
            .with_context(|| format!("failed to run TTS command {:?}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "TTS command exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        let audio = tokio::fs::read(spool.path())
            .await
            .context("failed to read TTS output")?;
        anyhow::ensure!(!audio.is_empty(), "TTS command wrote no audio");

        tracing::debug!(bytes = audio.len(), %language, "command synthesis complete");
        Ok(audio)
    }
}
