//! Audio handling with ffmpeg and ffprobe.

use super::AudioExtractor;
use crate::error::{LectioError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Extracts the audio track of a video as mono PCM WAV.
#[derive(Debug, Default, Clone)]
pub struct FfmpegAudioExtractor;

impl FfmpegAudioExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    #[instrument(skip_all, fields(source = %source.display(), sample_rate = sample_rate))]
    async fn extract_audio(&self, source: &Path, dest: &Path, sample_rate: u32) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Extracting audio to {:?}", dest);

        let result = Command::new("ffmpeg")
            .arg("-i").arg(source)
            .arg("-vn")
            .arg("-acodec").arg("pcm_s16le")
            .arg("-ar").arg(sample_rate.to_string())
            .arg("-ac").arg("1")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(LectioError::AudioExtraction(format!("ffmpeg failed: {}", err.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LectioError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(LectioError::AudioExtraction(format!("ffmpeg error: {e}"))),
        }
    }
}

/// Splits a long audio file into pieces of about `chunk_seconds` each.
///
/// Returns the piece paths in playback order. Audio no longer than one piece
/// is returned unchanged.
#[instrument(skip_all)]
pub async fn split_audio(source: &Path, output_dir: &Path, chunk_seconds: u32) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = f64::from(chunk_seconds.max(1));
    if total_duration <= chunk_len {
        return Ok(vec![source.to_path_buf()]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("wav");

    let mut pieces = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let piece_path = output_dir.join(format!("{}_{:04}.{}", base_name, idx, ext));
        let piece_len = chunk_len.min(total_duration - offset);

        extract_piece(source, &piece_path, offset, piece_len).await?;
        debug!("Created piece {} at offset {:.1}s", idx, offset);
        pieces.push(piece_path);

        offset += chunk_len;
        idx += 1;
    }

    info!("Split audio into {} pieces", pieces.len());
    Ok(pieces)
}

async fn extract_piece(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // Stream copy first; it is lossless and fast
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding piece");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-vn")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(LectioError::AudioExtraction(format!("Piece extraction failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LectioError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(LectioError::AudioExtraction(format!("ffmpeg error: {e}"))),
    }
}

/// Duration of a media file in seconds, from ffprobe's JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LectioError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => return Err(LectioError::AudioExtraction(format!("ffprobe failed: {e}"))),
    };

    if !output.status.success() {
        return Err(LectioError::AudioExtraction("ffprobe returned error".into()));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_duration(probe_json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(probe_json)
        .map_err(|_| LectioError::AudioExtraction("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| LectioError::AudioExtraction("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = r#"{"format": {"filename": "a.wav", "duration": "754.320000"}}"#;
        assert!((parse_duration(json).unwrap() - 754.32).abs() < 1e-6);
    }

    #[test]
    fn test_parse_duration_missing() {
        assert!(parse_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_duration("not json").is_err());
    }

    #[tokio::test]
    async fn test_extract_audio_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = FfmpegAudioExtractor::new()
            .extract_audio(&dir.path().join("missing.mp4"), &dir.path().join("out.wav"), 16000)
            .await;
        // Fails whether or not ffmpeg is installed
        assert!(matches!(
            result,
            Err(LectioError::AudioExtraction(_)) | Err(LectioError::ToolNotFound(_))
        ));
    }
}
