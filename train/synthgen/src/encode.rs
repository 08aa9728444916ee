use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{Context as _, bail, ensure};
use tracing::{debug, warn};

use crate::frames::FrameSequence;

/// Turns an ordered frame sequence into a video file. Returns the written path,
/// or `None` when encoding failed.
pub trait VideoEncoder {
    fn encode(&self, frames: &FrameSequence, out_path: &Path) -> Option<PathBuf>;
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Streams raw rgb24 frames into the system `ffmpeg` binary and writes an
/// H.264 mp4.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    pub fps: u32,
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// `None` when ffmpeg is not installed.
    pub fn detect(fps: u32) -> Option<Self> {
        is_ffmpeg_on_path().then(|| Self::new(fps))
    }

    fn validate(&self, width: u32, height: u32) -> anyhow::Result<()> {
        ensure!(width > 0 && height > 0, "encode width/height must be non-zero");
        ensure!(self.fps > 0, "encode fps must be non-zero");
        ensure!(
            width % 2 == 0 && height % 2 == 0,
            "encode width/height must be even (required for yuv420p mp4 output)"
        );
        Ok(())
    }

    fn try_encode(&self, frames: &FrameSequence, out_path: &Path) -> anyhow::Result<()> {
        let Some((width, height)) = frames.dimensions() else {
            bail!("no frames to encode");
        };
        self.validate(width, height)?;
        if let Some(run) = frames
            .runs()
            .iter()
            .find(|r| r.frame.dimensions() != (width, height))
        {
            bail!(
                "frame size mismatch: got {:?}, expected {width}x{height}",
                run.frame.dimensions()
            );
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &self.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(out_path)
            .spawn()
            .context("failed to spawn ffmpeg (is it installed and on PATH?)")?;

        // stdin drops at the end of the closure so ffmpeg sees EOF before the wait
        let written = child
            .stdin
            .take()
            .context("failed to open ffmpeg stdin")
            .and_then(|mut stdin| {
                for frame in frames.frames() {
                    stdin
                        .write_all(frame.as_raw())
                        .context("failed to write frame to ffmpeg stdin")?;
                }
                Ok(())
            });

        let output = child
            .wait_with_output()
            .context("failed to wait for ffmpeg to finish")?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() {
            bail!("ffmpeg exited with status {}: {stderr}", output.status);
        }
        written.with_context(|| format!("ffmpeg stderr: {stderr}"))?;
        Ok(())
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&self, frames: &FrameSequence, out_path: &Path) -> Option<PathBuf> {
        match self.try_encode(frames, out_path) {
            Ok(()) => {
                debug!(path = %out_path.display(), frames = frames.len(), "video written");
                Some(out_path.to_path_buf())
            }
            Err(err) => {
                warn!(path = %out_path.display(), "video encoding failed: {err:#}");
                None
            }
        }
    }
}
