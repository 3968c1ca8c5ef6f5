use crate::domain::entities::AudioClip;
use crate::domain::errors::AppError;
use crate::infrastructure::storage::write_atomic;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

pub fn read_clip(path: &Path) -> Result<AudioClip, AppError> {
    let reader = WavReader::new(BufReader::new(File::open(path)?))?;
    decode(reader)
}

pub fn decode_clip(bytes: &[u8]) -> Result<AudioClip, AppError> {
    decode(WavReader::new(Cursor::new(bytes))?)
}

fn decode<R: Read>(mut reader: WavReader<R>) -> Result<AudioClip, AppError> {
    let spec = reader.spec();
    let width = sample_width(&spec)?;
    let mut frame_data = Vec::with_capacity(reader.len() as usize * width as usize);

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => {
            // 8-bit PCM is unsigned on disk; hound hands it back centred on zero.
            for sample in reader.samples::<i8>() {
                frame_data.push((sample? as i16 + 128) as u8);
            }
        }
        (SampleFormat::Int, 16) => {
            for sample in reader.samples::<i16>() {
                frame_data.extend_from_slice(&sample?.to_le_bytes());
            }
        }
        (SampleFormat::Int, 24) => {
            for sample in reader.samples::<i32>() {
                frame_data.extend_from_slice(&sample?.to_le_bytes()[..3]);
            }
        }
        (SampleFormat::Int, 32) => {
            for sample in reader.samples::<i32>() {
                frame_data.extend_from_slice(&sample?.to_le_bytes());
            }
        }
        (SampleFormat::Float, 32) => {
            for sample in reader.samples::<f32>() {
                frame_data.extend_from_slice(&sample?.to_le_bytes());
            }
        }
        (format, bits) => {
            return Err(AppError::InvalidClip(format!("cannot decode {:?} with {} bits", format, bits)));
        }
    }

    AudioClip::new(spec.channels, width, spec.sample_rate, spec.sample_format, frame_data)
}

fn sample_width(spec: &WavSpec) -> Result<u16, AppError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8 | 16 | 24 | 32) | (SampleFormat::Float, 32) => {
            Ok(spec.bits_per_sample.div_ceil(8))
        }
        (format, bits) => Err(AppError::InvalidClip(format!(
            "unsupported sample layout: {:?} with {} bits",
            format, bits
        ))),
    }
}

/// Serializes `clip` as a canonical WAV file held in memory.
pub fn encode_clip(clip: &AudioClip) -> Result<Vec<u8>, AppError> {
    let spec = WavSpec {
        channels: clip.channels,
        sample_rate: clip.frame_rate,
        bits_per_sample: clip.sample_width_bytes * 8,
        sample_format: clip.sample_format,
    };
    sample_width(&spec)?;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        let width = clip.sample_width_bytes as usize;
        for chunk in clip.frame_data.chunks_exact(width) {
            match (clip.sample_format, width) {
                (SampleFormat::Int, 1) => writer.write_sample((chunk[0] as i16 - 128) as i8)?,
                (SampleFormat::Int, 2) => {
                    writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?
                }
                (SampleFormat::Int, 3) => {
                    let raw = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], 0]);
                    writer.write_sample((raw << 8) >> 8)?
                }
                (SampleFormat::Int, _) => {
                    writer.write_sample(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))?
                }
                (SampleFormat::Float, _) => {
                    writer.write_sample(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))?
                }
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Encodes `clip` and atomically replaces whatever is at `path`.
pub fn write_clip(path: &Path, clip: &AudioClip) -> Result<(), AppError> {
    let bytes = encode_clip(clip)?;
    write_atomic(path, &bytes)
}
