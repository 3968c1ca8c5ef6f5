use crate::config::SpeechConfig;
use crate::domain::errors::AppError;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

/// Turns one piece of text into the bytes of an audio container.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, AppError>;
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    appkey: &'a str,
    text: &'a str,
    format: &'a str,
    sample_rate: u32,
    voice: &'a str,
    volume: u32,
    speech_rate: i32,
    pitch_rate: i32,
}

/// Client for the Alibaba Cloud NLS REST text-to-speech gateway.
pub struct NlsSpeechClient {
    client: Client,
    config: SpeechConfig,
}

impl NlsSpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self, AppError> {
        if config.appkey.trim().is_empty() || config.token.trim().is_empty() {
            return Err(AppError::Config(
                "speech appkey and token are required (set NLS_APPKEY / NLS_TOKEN or [speech] in the config file)"
                    .to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(NlsSpeechClient { client, config })
    }

    fn request<'a>(&'a self, text: &'a str) -> TtsRequest<'a> {
        TtsRequest {
            appkey: &self.config.appkey,
            text,
            format: &self.config.format,
            sample_rate: self.config.sample_rate,
            voice: &self.config.voice,
            volume: self.config.volume,
            speech_rate: self.config.speech_rate,
            pitch_rate: self.config.pitch_rate,
        }
    }
}

impl SpeechSynthesizer for NlsSpeechClient {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, AppError> {
        log::debug!("POST {} ({} chars, voice {})", self.config.endpoint, text.chars().count(), self.config.voice);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-NLS-Token", &self.config.token)
            .json(&self.request(text))
            .send()
            .map_err(|e| {
                log::error!("Speech request failed: {}", e);
                AppError::Http(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.text() {
                Ok(text) => text,
                Err(e) => format!("failed to read error response: {}", e),
            };
            log::error!("Speech synthesis failed (status {}): {}", status, body);
            return Err(AppError::Synthesis { status: status.as_u16(), body });
        }

        Ok(response.bytes()?.to_vec())
    }
}
