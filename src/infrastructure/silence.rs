use crate::domain::entities::{AudioClip, SilenceSpec};
use crate::domain::errors::AppError;
use crate::infrastructure::wav::{read_clip, write_clip};
use std::path::Path;

/// Appends a fixed stretch of zero-valued frames to the end of a clip.
#[derive(Debug, Clone, Copy)]
pub struct SilencePadder {
    spec: SilenceSpec,
}

impl SilencePadder {
    pub fn new(spec: SilenceSpec) -> Self {
        SilencePadder { spec }
    }

    pub fn seconds(&self) -> u32 {
        self.spec.seconds
    }

    pub fn pad(&self, clip: &AudioClip) -> AudioClip {
        let silence_frames = clip.frame_rate as usize * self.spec.seconds as usize;
        let silence_len = clip.frame_size() * silence_frames;

        let mut frame_data = Vec::with_capacity(clip.frame_data.len() + silence_len);
        frame_data.extend_from_slice(&clip.frame_data);
        frame_data.resize(clip.frame_data.len() + silence_len, 0);

        AudioClip { frame_data, ..clip.clone() }
    }

    /// Reads the whole file, pads it in memory and swaps the result in
    /// atomically. On error the original file is left as it was.
    ///
    /// The rewrite uses hound's canonical header, which is
    /// `WAVE_FORMAT_EXTENSIBLE` for 24-bit or multichannel PCM. With zero
    /// seconds nothing changes, so the file is only validated, not rewritten.
    pub fn pad_file(&self, path: &Path) -> Result<(), AppError> {
        let clip = read_clip(path)?;
        if self.spec.seconds == 0 {
            log::debug!("No silence requested, {} left as is", path.display());
            return Ok(());
        }
        let padded = self.pad(&clip);
        write_clip(path, &padded)?;
        log::info!("Appended {}s of silence to {}", self.spec.seconds, path.display());
        Ok(())
    }
}
