use crate::config::Settings;
use crate::domain::advisory::Language;
use crate::speech::SpeechSynthesizer;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 20;
const TTS_PATH: &str = "/translate_tts";
// The endpoint rejects long queries; split on whitespace below this size.
const MAX_CHUNK_CHARS: usize = 100;

/// Google Translate's public TTS endpoint. Returns MP3 in memory.
#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateTts {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = std::env::var("TTS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build TTS http client")?;

        Ok(Self {
            http,
            base_url: settings.tts_base_url.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), TTS_PATH)
    }

    async fn fetch_chunk(&self, chunk: &str, language: Language) -> Result<Vec<u8>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let res = self
            .http
            .get(self.url())
            .headers(headers)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language.code()),
                ("client", "tw-ob"),
            ])
            .send()
            .await
            .context("TTS request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "TTS HTTP {status}");
        let bytes = res.bytes().await.context("failed to read TTS audio")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    fn provider_name(&self) -> &'static str {
        "google_translate_tts"
    }

    fn mime(&self) -> &'static str {
        "audio/mpeg"
    }

    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        anyhow::ensure!(!chunks.is_empty(), "nothing to synthesize");

        // MP3 frames concatenate into a playable stream.
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let part = self
                .fetch_chunk(chunk, language)
                .await
                .with_context(|| format!("TTS chunk {} of {}", idx + 1, chunks.len()))?;
            audio.extend_from_slice(&part);
        }
        Ok(audio)
    }
}

/// Greedy whitespace packing; a single word longer than `max` is split on char boundaries.
fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max).collect();
            word = word.chars().skip(max).collect();
            out.push(head);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("  Hello.   Rice  ", 100), vec!["Hello. Rice"]);
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn chunks_respect_limit_and_keep_words() {
        let text = "नमस्ते। आपके खेत के लिए सिफारिश: धान की सिफारिश: वर्षा और तापमान अनुकूल हैं।";
        let chunks = chunk_text(text, 20);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn oversized_word_is_split() {
        let chunks = chunk_text("ab abcdefghij cd", 4);
        assert_eq!(chunks, vec!["ab", "abcd", "efgh", "ij", "cd"]);
    }
}
