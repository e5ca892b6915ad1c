use crate::openai::OpenAiClient;
use crate::provider::LlmResult;
use phonebot_models::TtsConfig;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const FALLBACK_UTTERANCE: &str = "I'm sorry, I didn't catch that.";

/// Text-to-speech with an on-disk mp3 cache keyed by file name.
pub struct SpeechSynthesizer {
    client: OpenAiClient,
    config: TtsConfig,
}

impl SpeechSynthesizer {
    pub fn new(client: OpenAiClient, config: TtsConfig) -> Self {
        Self { client, config }
    }

    pub fn audio_dir(&self) -> &Path {
        Path::new(&self.config.audio_dir)
    }

    /// Path the audio for `text` is cached at.
    pub fn cache_path(&self, text: &str, filename: Option<&str>) -> PathBuf {
        let text = utterance(text);
        let name = match filename {
            Some(name) if !name.trim().is_empty() => sanitize_file_name(name),
            _ => cache_key(text),
        };
        self.audio_dir().join(format!("{}.mp3", name))
    }

    #[instrument(skip(self, text))]
    pub async fn synthesize(&self, text: &str, filename: Option<&str>) -> LlmResult<PathBuf> {
        let path = self.cache_path(text, filename);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }

        tokio::fs::create_dir_all(self.audio_dir()).await?;
        info!(voice = %self.config.voice, path = %path.display(), "Synthesizing speech");

        let audio = self
            .client
            .speech(&self.config.model, &self.config.voice, utterance(text))
            .await?;
        tokio::fs::write(&path, &audio).await?;
        Ok(path)
    }
}

fn utterance(text: &str) -> &str {
    if text.trim().is_empty() {
        FALLBACK_UTTERANCE
    } else {
        text
    }
}

pub fn cache_key(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
