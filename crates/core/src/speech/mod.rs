pub mod command;
pub mod google;

use crate::config::{Settings, TtsProvider};
use crate::domain::advisory::Language;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPreview {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn provider_name(&self) -> &'static str;

    fn mime(&self) -> &'static str;

    async fn synthesize(&self, text: &str, language: Language) -> anyhow::Result<Vec<u8>>;
}

/// Synthesize `text`; any failure means "no audio preview" rather than an error.
pub async fn preview(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    language: Language,
) -> Option<AudioPreview> {
    match synthesizer.synthesize(text, language).await {
        Ok(bytes) if bytes.is_empty() => {
            tracing::warn!(
                provider = synthesizer.provider_name(),
                %language,
                "speech synthesis returned no audio"
            );
            None
        }
        Ok(bytes) => Some(AudioPreview {
            mime: synthesizer.mime(),
            bytes,
        }),
        Err(err) => {
            let detail = format!("{err:#}");
            tracing::warn!(
                provider = synthesizer.provider_name(),
                %language,
                error = %detail,
                "speech synthesis failed; no audio preview"
            );
            None
        }
    }
}

pub fn from_settings(settings: &Settings) -> anyhow::Result<Option<Arc<dyn SpeechSynthesizer>>> {
    Ok(match settings.tts_provider {
        TtsProvider::Google => Some(Arc::new(google::GoogleTranslateTts::from_settings(settings)?)),
        TtsProvider::Command => Some(Arc::new(command::CommandSynthesizer::from_settings(settings)?)),
        TtsProvider::Disabled => None,
    })
}
