use hound::{SampleFormat, WavSpec, WavWriter};
use narrator::domain::entities::SilenceSpec;
use narrator::domain::errors::AppError;
use narrator::infrastructure::silence::SilencePadder;
use narrator::infrastructure::speech::SpeechSynthesizer;
use narrator::infrastructure::wav::read_clip;
use narrator::pipeline::driver::{Pipeline, Source};
use std::cell::RefCell;
use std::fs;
use std::io::Cursor;
use std::time::Duration;

/// Answers with a short 16 kHz mono clip, except for texts it was told to reject.
struct StubSynth {
    reject: &'static str,
    calls: RefCell<Vec<String>>,
}

impl SpeechSynthesizer for StubSynth {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, AppError> {
        self.calls.borrow_mut().push(text.to_string());
        if text == self.reject {
            return Err(AppError::Synthesis { status: 400, body: "{\"message\":\"rejected\"}".to_string() });
        }

        let spec = WavSpec { channels: 1, sample_rate: 16000, bits_per_sample: 16, sample_format: SampleFormat::Int };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for i in 0..1600 {
                writer.write_sample((i % 64) as i16 * 100)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

#[test]
fn failed_segment_is_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.txt");
    fs::write(&script, "Opening remarks.\n\nThis one fails.\n\n\nClosing\nthoughts.").unwrap();
    let output = dir.path().join("output3");
    let synth = StubSynth { reject: "This one fails.", calls: RefCell::new(Vec::new()) };

    let report = Pipeline::new(&synth, SilencePadder::new(SilenceSpec::default()), Duration::ZERO)
        .run(&Source::Text(script), &output)
        .unwrap();

    let audios = output.join("audios");
    assert!(audios.join("001.wav").exists());
    assert!(!audios.join("002.wav").exists());
    assert!(audios.join("003.wav").exists());

    assert_eq!(report.synthesized, vec![1, 3]);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failed[0].0, 2);
    assert!(!report.is_complete());

    assert_eq!(
        *synth.calls.borrow(),
        vec!["Opening remarks.".to_string(), "This one fails.".to_string(), "Closing thoughts.".to_string()]
    );
    assert_eq!(fs::read_to_string(output.join("texts").join("003.txt")).unwrap(), "Closing thoughts.");
}

#[test]
fn clips_carry_trailing_silence() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.txt");
    fs::write(&script, "Only paragraph").unwrap();
    let output = dir.path().join("out");
    let synth = StubSynth { reject: "", calls: RefCell::new(Vec::new()) };

    let report = Pipeline::new(&synth, SilencePadder::new(SilenceSpec::new(3)), Duration::ZERO)
        .run(&Source::Text(script), &output)
        .unwrap();

    assert!(report.is_complete());
    let clip = read_clip(&output.join("audios").join("001.wav")).unwrap();
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.sample_width_bytes, 2);
    assert_eq!(clip.frame_rate, 16000);
    assert_eq!(clip.frame_count(), 1600 + 16000 * 3);
    assert!(clip.frame_data[1600 * 2..].iter().all(|&b| b == 0));
    assert!(clip.frame_data[..1600 * 2].iter().any(|&b| b != 0));
}

#[test]
fn rerun_overwrites_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.txt");
    let output = dir.path().join("out");
    let synth = StubSynth { reject: "", calls: RefCell::new(Vec::new()) };
    let pipeline = Pipeline::new(&synth, SilencePadder::new(SilenceSpec::new(1)), Duration::ZERO);

    fs::write(&script, "First draft").unwrap();
    pipeline.run(&Source::Text(script.clone()), &output).unwrap();
    fs::write(&script, "Second draft").unwrap();
    pipeline.run(&Source::Text(script), &output).unwrap();

    assert_eq!(fs::read_to_string(output.join("texts").join("001.txt")).unwrap(), "Second draft");
    let clip = read_clip(&output.join("audios").join("001.wav")).unwrap();
    assert_eq!(clip.frame_count(), 1600 + 16000);
}
