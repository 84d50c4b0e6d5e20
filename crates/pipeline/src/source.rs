//! Video frame sources.
//!
//! A [`FrameSource`] produces one finite, ordered, non-restartable pass of
//! decoded frames plus the container metadata the result record needs.
//! The shipped implementation probes the file with `ffprobe` and streams
//! raw RGB24 frames from an `ffmpeg` child process; it runs inside the
//! job's blocking task, so all I/O here is synchronous.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A decoded video frame.
pub type Frame = image::RgbImage;

/// Container metadata established when a source is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_seconds: f64,
}

/// Descriptive stats carried on a completed analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub fps: f64,
    pub frames_total: u64,
    pub frames_with_pose: u64,
}

/// One-pass supplier of decoded frames.
///
/// `open` begins the pass and must be called exactly once, before the
/// first `next_frame`. Frames come back in playback order; `Ok(None)`
/// ends the stream for good.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<VideoMeta, AnalysisError>;
    fn next_frame(&mut self) -> Result<Option<Frame>, AnalysisError>;
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    /// e.g. "30/1" or "30000/1001"
    r_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse an ffprobe frame-rate fraction ("30000/1001", "30/1") into Hz.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = match raw.split_once('/') {
        Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
        None => (raw.parse::<f64>().ok()?, 1.0),
    };
    (den.abs() > f64::EPSILON && num > 0.0).then(|| num / den)
}

/// Extract [`VideoMeta`] from parsed ffprobe output.
///
/// Duration preference: video-stream duration, then container duration,
/// then `nb_frames / fps`.
fn meta_from_probe(probe: &FfprobeOutput) -> Result<VideoMeta, AnalysisError> {
    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AnalysisError::Acquisition("no video stream in container".into()))?;

    let width = stream
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| AnalysisError::Acquisition("video stream has no width".into()))?;
    let height = stream
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| AnalysisError::Acquisition("video stream has no height".into()))?;

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(0.0);

    let parse_secs = |s: &Option<String>| s.as_deref().and_then(|v| v.parse::<f64>().ok());
    let duration_seconds = parse_secs(&stream.duration)
        .or_else(|| probe.format.as_ref().and_then(|f| parse_secs(&f.duration)))
        .or_else(|| {
            let frames = stream.nb_frames.as_deref()?.parse::<f64>().ok()?;
            (fps > 0.0).then(|| frames / fps)
        })
        .unwrap_or(0.0);

    Ok(VideoMeta {
        width,
        height,
        fps,
        duration_seconds,
    })
}

// ---------------------------------------------------------------------------
// FfmpegFrameSource
// ---------------------------------------------------------------------------

/// Streams decoded frames from a video file via an `ffmpeg` subprocess.
pub struct FfmpegFrameSource {
    path: PathBuf,
    meta: Option<VideoMeta>,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl FfmpegFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            meta: None,
            child: None,
            stdout: None,
        }
    }

    fn probe(path: &Path) -> Result<VideoMeta, AnalysisError> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AnalysisError::Acquisition(format!("ffprobe not available: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::Acquisition(format!(
                "ffprobe failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalysisError::Acquisition(format!("unparseable ffprobe output: {e}")))?;
        meta_from_probe(&probe)
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&mut self) -> Result<VideoMeta, AnalysisError> {
        if !self.path.exists() {
            return Err(AnalysisError::Acquisition(format!(
                "video file not found: {}",
                self.path.display()
            )));
        }

        let meta = Self::probe(&self.path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&self.path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AnalysisError::Acquisition(format!("ffmpeg not available: {e}")))?;

        self.stdout = child.stdout.take();
        self.child = Some(child);
        self.meta = Some(meta);

        tracing::debug!(
            path = %self.path.display(),
            width = meta.width,
            height = meta.height,
            fps = meta.fps,
            "Opened ffmpeg frame stream",
        );
        Ok(meta)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, AnalysisError> {
        let meta = self
            .meta
            .ok_or_else(|| AnalysisError::Acquisition("frame source was never opened".into()))?;
        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| AnalysisError::Acquisition("frame stream already closed".into()))?;

        let frame_len = meta.width as usize * meta.height as usize * 3;
        let mut buf = vec![0u8; frame_len];
        let mut filled = 0;
        while filled < frame_len {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(AnalysisError::Acquisition(format!(
                        "failed reading decoded frames: {e}"
                    )))
                }
            }
        }

        if filled == 0 {
            // Clean end of stream: reap the child and close.
            self.stdout = None;
            if let Some(mut child) = self.child.take() {
                let _ = child.wait();
            }
            return Ok(None);
        }
        if filled < frame_len {
            return Err(AnalysisError::Acquisition(
                "video stream ended mid-frame".into(),
            ));
        }

        Frame::from_raw(meta.width, meta.height, buf)
            .map(Some)
            .ok_or_else(|| AnalysisError::Acquisition("frame buffer size mismatch".into()))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
