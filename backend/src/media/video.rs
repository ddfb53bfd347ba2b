use image::DynamicImage;
use std::path::Path;
use std::process::{Command, Output};

use crate::config::VideoConfig;
use crate::error::MediaError;

/// Frame-accurate access to a video container.
pub trait VideoDecoder: Send + Sync {
    /// Number of decodable frames. An unopenable container is an error.
    fn frame_count(&self, path: &Path) -> Result<u64, MediaError>;

    /// Decodes exactly the frame at `index` (zero-based).
    fn decode_frame(&self, path: &Path, index: u64) -> Result<DynamicImage, MediaError>;
}

/// Middle frame, rounding down. `None` for an empty video.
pub fn middle_frame_index(total_frames: u64) -> Option<u64> {
    if total_frames == 0 {
        None
    } else {
        Some(total_frames / 2)
    }
}

/// Decoder backed by the system `ffprobe`/`ffmpeg` binaries.
pub struct FfmpegDecoder {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegDecoder {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &VideoConfig) -> Self {
        Self::new(config.ffmpeg.clone(), config.ffprobe.clone())
    }

    fn probe(&self, path: &Path, entry: &str, count_frames: bool) -> Result<Option<u64>, MediaError> {
        let show_entries = format!("stream={}", entry);
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-select_streams", "v:0"]);
        if count_frames {
            cmd.arg("-count_frames");
        }
        cmd.args([
            "-show_entries",
            show_entries.as_str(),
            "-of",
            "default=nokey=1:noprint_wrappers=1",
        ])
        .arg(path);

        let output = run(cmd, &self.ffprobe)?;
        Ok(parse_frame_count(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn frame_count(&self, path: &Path) -> Result<u64, MediaError> {
        // Container metadata first; some formats (avi, fragmented mp4) leave it
        // empty and need a full decode pass.
        if let Some(count) = self.probe(path, "nb_frames", false)? {
            return Ok(count);
        }
        log::debug!("No nb_frames for {}, counting frames", path.display());
        Ok(self.probe(path, "nb_read_frames", true)?.unwrap_or(0))
    }

    fn decode_frame(&self, path: &Path, index: u64) -> Result<DynamicImage, MediaError> {
        let select = format!("select=eq(n\\,{})", index);
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-vf",
                select.as_str(),
                "-vframes",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "png",
                "-",
            ]);

        let output = run(cmd, &self.ffmpeg)?;
        if output.stdout.is_empty() {
            return Err(MediaError::Decode(format!(
                "{} produced no frame at index {}",
                path.display(),
                index
            )));
        }
        image::load_from_memory(&output.stdout)
            .map_err(|e| MediaError::Decode(format!("frame {} of {}: {}", index, path.display(), e)))
    }
}

fn run(mut cmd: Command, program: &str) -> Result<Output, MediaError> {
    let output = cmd
        .output()
        .map_err(|e| MediaError::Ffmpeg(format!("{} not available: {}", program, e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::Ffmpeg(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

/// Parses ffprobe's single-value output. `N/A` and blanks mean "unknown".
fn parse_frame_count(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse().ok())
}
