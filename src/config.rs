use crate::domain::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nls-gateway-cn-shanghai.aliyuncs.com/stream/v1/tts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub speech: SpeechConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub appkey: String,
    pub token: String,
    pub voice: String,
    pub format: String,
    pub sample_rate: u32,
    pub volume: u32,
    pub speech_rate: i32,
    pub pitch_rate: i32,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            appkey: String::new(),
            token: String::new(),
            voice: "xiaogang".to_string(),
            format: "wav".to_string(),
            sample_rate: 16000,
            volume: 50,
            speech_rate: 0,
            pitch_rate: 0,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub output_dir: String,
    pub silence_seconds: u32,
    pub request_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            output_dir: "output3".to_string(),
            silence_seconds: 2,
            request_delay_ms: 1000,
        }
    }
}

impl PipelineConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Settings {
    /// Defaults, overlaid by the TOML file at `path` (if any), overlaid by
    /// `NLS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut settings = match path {
            Some(path) => Self::from_toml(&fs::read_to_string(path)?)?,
            None => Settings::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(appkey) = lookup("NLS_APPKEY") {
            self.speech.appkey = appkey;
        }
        if let Some(token) = lookup("NLS_TOKEN") {
            self.speech.token = token;
        }
        if let Some(endpoint) = lookup("NLS_ENDPOINT") {
            self.speech.endpoint = endpoint;
        }
    }
}
