use crate::domain::errors::AppError;
use crate::infrastructure::silence::SilencePadder;
use crate::infrastructure::speech::SpeechSynthesizer;
use crate::infrastructure::storage::write_atomic;
use crate::pipeline::report::RunReport;
use crate::preprocessing::segmenter::{Segmenter, TEXT_EXTENSION};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

pub const TEXTS_DIR: &str = "texts";
pub const AUDIOS_DIR: &str = "audios";
pub const AUDIO_EXTENSION: &str = "wav";

/// Where the narration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Presentation(PathBuf),
    Text(PathBuf),
}

impl Source {
    /// A presentation wins when both are given.
    pub fn select(pptx: Option<PathBuf>, text: Option<PathBuf>) -> Result<Self, AppError> {
        match (pptx, text) {
            (Some(pptx), Some(text)) => {
                log::warn!("Both --pptx and --text given; using {} and ignoring {}", pptx.display(), text.display());
                Ok(Source::Presentation(pptx))
            }
            (Some(pptx), None) => Ok(Source::Presentation(pptx)),
            (None, Some(text)) => Ok(Source::Text(text)),
            (None, None) => Err(AppError::Config(
                "provide a PowerPoint file (--pptx) or a text file (--text)".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub texts: PathBuf,
    pub audios: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        OutputLayout { texts: root.join(TEXTS_DIR), audios: root.join(AUDIOS_DIR) }
    }

    pub fn create(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.texts)?;
        fs::create_dir_all(&self.audios)?;
        Ok(())
    }
}

/// A numbered text file waiting for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFile {
    pub index: usize,
    pub stem: String,
    pub path: PathBuf,
}

/// Text files in `dir` whose stem is a number, in numeric order.
pub fn list_segment_files(dir: &Path) -> Result<Vec<SegmentFile>, AppError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TEXT_EXTENSION) || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        match stem.parse::<usize>() {
            Ok(index) => files.push(SegmentFile { index, stem, path }),
            Err(_) => log::warn!("Ignoring {}: name is not a segment number", path.display()),
        }
    }
    files.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.stem.cmp(&b.stem)));
    Ok(files)
}

pub struct Pipeline<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    padder: SilencePadder,
    request_delay: Duration,
    show_progress: bool,
    sleep: Box<dyn Fn(Duration) + 'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(synthesizer: &'a dyn SpeechSynthesizer, padder: SilencePadder, request_delay: Duration) -> Self {
        Pipeline { synthesizer, padder, request_delay, show_progress: false, sleep: Box::new(thread::sleep) }
    }

    /// Replaces the blocking sleep used between requests.
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + 'a) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Segments `source` into `<output_root>/texts`, then synthesizes every
    /// segment into `<output_root>/audios`.
    pub fn run(&self, source: &Source, output_root: &Path) -> Result<RunReport, AppError> {
        let layout = OutputLayout::new(output_root);
        layout.create()?;

        let segmenter = Segmenter::new(&layout.texts);
        match source {
            Source::Presentation(path) => {
                log::info!("Extracting speaker notes from {}", path.display());
                segmenter.process_presentation(path)?;
            }
            Source::Text(path) => {
                log::info!("Splitting {} into paragraphs", path.display());
                segmenter.process_text_file(path)?;
            }
        }

        log::info!("Generating speech ({}s of trailing silence per clip)", self.padder.seconds());
        let report = self.synthesize_dir(&layout.texts, &layout.audios)?;
        log::info!("Audio files saved to {}", layout.audios.display());
        Ok(report)
    }

    pub fn synthesize_dir(&self, texts: &Path, audios: &Path) -> Result<RunReport, AppError> {
        fs::create_dir_all(audios)?;
        let files = list_segment_files(texts)?;
        if files.is_empty() {
            log::warn!("No text segments found in {}", texts.display());
        }

        let pb = self.progress_bar(files.len());
        let mut report = RunReport::default();

        for (pos, file) in files.iter().enumerate() {
            pb.set_message(format!("Segment {}", file.stem));
            let content = fs::read_to_string(&file.path)?;
            let text = content.trim();

            if text.is_empty() {
                report.skipped_empty.push(file.index);
            } else {
                let audio_path = audios.join(format!("{}.{}", file.stem, AUDIO_EXTENSION));
                if self.synthesize_segment(file, text, &audio_path, &mut report) && pos + 1 < files.len() {
                    self.pause();
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("Synthesis completed");
        log::info!("Synthesis finished: {}", report.summary());
        Ok(report)
    }

    /// Returns whether the remote call succeeded.
    fn synthesize_segment(&self, file: &SegmentFile, text: &str, audio_path: &Path, report: &mut RunReport) -> bool {
        let audio = match self.synthesizer.synthesize(text) {
            Ok(audio) => audio,
            Err(e) => {
                log::error!("Speech synthesis failed for segment {}: {}", file.stem, e);
                report.failed.push((file.index, e.to_string()));
                return false;
            }
        };

        if let Err(e) = write_atomic(audio_path, &audio) {
            log::error!("Could not save {}: {}", audio_path.display(), e);
            report.failed.push((file.index, e.to_string()));
            return true;
        }
        log::info!("Speech synthesized: {}", audio_path.display());

        if let Err(e) = self.padder.pad_file(audio_path) {
            log::warn!("Could not append silence to {}: {}", audio_path.display(), e);
            report.unpadded.push(file.index);
        }
        report.synthesized.push(file.index);
        true
    }

    fn pause(&self) {
        if !self.request_delay.is_zero() {
            (self.sleep)(self.request_delay);
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}
