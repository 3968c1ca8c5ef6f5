use crate::domain::entities::Segment;
use crate::domain::errors::AppError;
use crate::preprocessing::slides::SlideDeck;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEXT_EXTENSION: &str = "txt";

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Splits on blank lines and numbers the surviving paragraphs from 1.
pub fn paragraph_segments(raw: &str) -> Vec<Segment> {
    PARAGRAPH_BREAK
        .split(raw)
        .filter(|chunk| !chunk.trim().is_empty())
        .enumerate()
        .filter_map(|(i, chunk)| Segment::new(i + 1, chunk))
        .collect()
}

/// One segment per slide with notes, indexed by slide position.
pub fn slide_segments(deck: &SlideDeck) -> Vec<Segment> {
    deck.notes
        .iter()
        .enumerate()
        .filter_map(|(i, notes)| {
            let segment = notes.as_deref().and_then(|text| Segment::new(i + 1, text));
            if segment.is_none() {
                log::info!("Slide {} has no notes, skipped", i + 1);
            }
            segment
        })
        .collect()
}

/// Extracts narration segments from a source document and writes each one
/// to `<output_dir>/<NNN>.txt`.
pub struct Segmenter {
    output_dir: PathBuf,
}

impl Segmenter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Segmenter { output_dir: output_dir.into() }
    }

    pub fn setup_output_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    pub fn process_presentation(&self, path: &Path) -> Result<Vec<Segment>, AppError> {
        let deck = SlideDeck::open(path)?;
        let segments = slide_segments(&deck);
        self.save_segments(&segments)?;

        if segments.is_empty() {
            log::warn!("No speaker notes found in {}", path.display());
        } else {
            log::info!(
                "Extracted notes from {} of {} slides in {}",
                segments.len(),
                deck.len(),
                path.display()
            );
        }
        Ok(segments)
    }

    pub fn process_text_file(&self, path: &Path) -> Result<Vec<Segment>, AppError> {
        let raw = fs::read_to_string(path)?;
        let segments = paragraph_segments(&raw);
        self.save_segments(&segments)?;
        log::info!("Split {} into {} paragraphs", path.display(), segments.len());
        Ok(segments)
    }

    pub fn segment_path(&self, segment: &Segment) -> PathBuf {
        self.output_dir.join(format!("{}.{}", segment.file_stem(), TEXT_EXTENSION))
    }

    /// Stops at the first failed write; files written before it stay on disk.
    fn save_segments(&self, segments: &[Segment]) -> Result<(), AppError> {
        self.setup_output_dir()?;
        for segment in segments {
            fs::write(self.segment_path(segment), &segment.content)?;
            log::debug!("Wrote segment {}", segment.file_stem());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::slides::tests::build_pptx;

    fn contents(segments: &[Segment]) -> Vec<(usize, &str)> {
        segments.iter().map(|s| (s.index, s.content.as_str())).collect()
    }

    #[test]
    fn single_line_is_one_segment() {
        let segments = paragraph_segments("Welcome to the quarterly review.\n");
        assert_eq!(contents(&segments), vec![(1, "Welcome to the quarterly review.")]);
    }

    #[test]
    fn blank_line_runs_are_one_delimiter() {
        let segments = paragraph_segments("A\n\nB\n\n\nC");
        assert_eq!(contents(&segments), vec![(1, "A"), (2, "B"), (3, "C")]);
    }

    #[test]
    fn paragraphs_are_normalized_and_renumbered_without_gaps() {
        let raw = "\n\n  First line\n  continues here  \n \t \nSecond\r\n\r\n   \n\nThird\twith  tabs\n";
        let segments = paragraph_segments(raw);
        assert_eq!(
            contents(&segments),
            vec![(1, "First line continues here"), (2, "Second"), (3, "Third with tabs")]
        );
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(paragraph_segments(" \n\n \n").is_empty());
    }

    #[test]
    fn slide_indices_keep_gaps() {
        let deck = SlideDeck::from_notes(vec![
            None,
            Some("Hello\nworld".to_string()),
            Some("   \n ".to_string()),
            Some("Four".to_string()),
        ]);
        assert_eq!(contents(&slide_segments(&deck)), vec![(2, "Hello world"), (4, "Four")]);
    }

    #[test]
    fn presentation_writes_only_slides_with_notes() {
        let dir = tempfile::tempdir().unwrap();
        let deck_path = dir.path().join("deck.pptx");
        fs::write(&deck_path, build_pptx(&[None, Some(&["Hello", "world"][..]), None])).unwrap();
        let texts = dir.path().join("texts");

        let segments = Segmenter::new(&texts).process_presentation(&deck_path).unwrap();

        assert_eq!(contents(&segments), vec![(2, "Hello world")]);
        assert_eq!(fs::read_to_string(texts.join("002.txt")).unwrap(), "Hello world");
        assert!(!texts.join("001.txt").exists());
        assert!(!texts.join("003.txt").exists());
    }

    #[test]
    fn text_file_writes_numbered_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("script.txt");
        fs::write(&input, "大家好，\n欢迎。\n\nSecond slide").unwrap();
        let texts = dir.path().join("out").join("texts");

        Segmenter::new(&texts).process_text_file(&input).unwrap();

        assert_eq!(fs::read_to_string(texts.join("001.txt")).unwrap(), "大家好， 欢迎。");
        assert_eq!(fs::read_to_string(texts.join("002.txt")).unwrap(), "Second slide");
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Segmenter::new(dir.path()).process_text_file(&dir.path().join("absent.txt"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
