use crate::domain::errors::AppError;
use hound::SampleFormat;

/// One unit of narration text, mapped to exactly one audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub content: String,
}

impl Segment {
    /// Normalizes `text` and returns `None` when nothing is left.
    pub fn new(index: usize, text: &str) -> Option<Self> {
        let content = normalize(text);
        if content.is_empty() {
            return None;
        }
        Some(Segment { index, content })
    }

    /// Zero-padded file stem, e.g. `007`.
    pub fn file_stem(&self) -> String {
        format!("{:03}", self.index)
    }
}

/// Collapses every whitespace run (newlines included) into one space and trims.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Decoded uncompressed audio. `frame_data` holds the little-endian sample
/// bytes exactly as the container stores them.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub channels: u16,
    pub sample_width_bytes: u16,
    pub frame_rate: u32,
    pub sample_format: SampleFormat,
    pub frame_data: Vec<u8>,
}

impl AudioClip {
    pub fn new(
        channels: u16,
        sample_width_bytes: u16,
        frame_rate: u32,
        sample_format: SampleFormat,
        frame_data: Vec<u8>,
    ) -> Result<Self, AppError> {
        if channels == 0 || sample_width_bytes == 0 {
            return Err(AppError::InvalidClip(format!(
                "channels ({}) and sample width ({}) must be positive",
                channels, sample_width_bytes
            )));
        }
        let frame_size = channels as usize * sample_width_bytes as usize;
        if frame_data.len() % frame_size != 0 {
            return Err(AppError::InvalidClip(format!(
                "{} bytes of frame data is not a multiple of the {}-byte frame size",
                frame_data.len(),
                frame_size
            )));
        }
        Ok(AudioClip { channels, sample_width_bytes, frame_rate, sample_format, frame_data })
    }

    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.sample_width_bytes as usize
    }

    pub fn frame_count(&self) -> usize {
        self.frame_data.len() / self.frame_size()
    }
}

/// Whole seconds of silence appended to each clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceSpec {
    pub seconds: u32,
}

impl SilenceSpec {
    pub fn new(seconds: u32) -> Self {
        SilenceSpec { seconds }
    }
}

impl Default for SilenceSpec {
    fn default() -> Self {
        SilenceSpec { seconds: 2 }
    }
}
