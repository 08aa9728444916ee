use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::{
    geom::object_boxes,
    record::{JsonRecord, TaskPair},
};

pub const FIRST_FRAME: &str = "first_frame.png";
pub const FINAL_FRAME: &str = "final_frame.png";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const GOAL_FILE: &str = "goal.txt";
pub const VIDEO_FILE: &str = "ground_truth.mp4";
pub const LABELS_FILE: &str = "labels.jsonl";

/// Writes tasks under `<root>/<domain>_task/<task_id>/` and appends one labels
/// line per task.
pub struct OutputWriter {
    task_root: PathBuf,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl OutputWriter {
    pub fn create(root: &Path, domain: &str) -> anyhow::Result<Self> {
        let task_root = root.join(format!("{domain}_task"));
        std::fs::create_dir_all(&task_root)
            .with_context(|| format!("failed to create '{}'", task_root.display()))?;
        let labels = task_root.join(LABELS_FILE);
        let file = File::create(&labels)
            .with_context(|| format!("failed to create '{}'", labels.display()))?;
        Ok(Self {
            task_root,
            writer: Some(BufWriter::with_capacity(1 << 20, file)),
            written: 0,
        })
    }

    pub fn task_root(&self) -> &Path {
        &self.task_root
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_task(&mut self, task: &TaskPair) -> anyhow::Result<()> {
        let dir = self.task_root.join(&task.task_id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create '{}'", dir.display()))?;

        let rel = |name: &str| format!("{}/{name}", task.task_id);

        task.first_image
            .save(dir.join(FIRST_FRAME))
            .with_context(|| format!("failed to save {} for '{}'", FIRST_FRAME, task.task_id))?;
        std::fs::write(dir.join(PROMPT_FILE), &task.prompt)
            .with_context(|| format!("failed to write {} for '{}'", PROMPT_FILE, task.task_id))?;

        let final_image = match &task.final_image {
            Some(img) => {
                img.save(dir.join(FINAL_FRAME)).with_context(|| {
                    format!("failed to save {} for '{}'", FINAL_FRAME, task.task_id)
                })?;
                Some(rel(FINAL_FRAME))
            }
            None => None,
        };
        if let Some(goal) = &task.goal_text {
            std::fs::write(dir.join(GOAL_FILE), goal).with_context(|| {
                format!("failed to write {} for '{}'", GOAL_FILE, task.task_id)
            })?;
        }

        let video = match &task.ground_truth_video {
            Some(src) => match move_file(src, &dir.join(VIDEO_FILE)) {
                Ok(()) => Some(rel(VIDEO_FILE)),
                Err(err) => {
                    warn!(task_id = %task.task_id, "dropping video: {err:#}");
                    None
                }
            },
            None => None,
        };

        let (w, h) = task.first_image.dimensions();
        let rec = JsonRecord {
            schema: "v1",
            task_id: &task.task_id,
            domain: &task.domain,
            category: task.category,
            count: task.object_count(),
            shapes: task.scene.shapes(),
            boxes: object_boxes(&task.scene, (w, h)),
            seed: task.seed,
            signature: task.signature.to_string(),
            first_image: rel(FIRST_FRAME),
            final_image,
            goal: task.goal_text.as_deref(),
            video,
        };
        let json = serde_json::to_string(&rec)?;

        if let Some(ref mut writer) = self.writer {
            writeln!(writer, "{}", json)?;
        }
        self.written += 1;
        debug!(task_id = %task.task_id, "written");
        Ok(())
    }

    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .into_inner()
                .map_err(|e| e.into_error())?
                .sync_all()?;
        }
        Ok(())
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.finalize();
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(src: &Path, dst: &Path) -> anyhow::Result<()> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    std::fs::copy(src, dst)
        .with_context(|| format!("failed to copy '{}' to '{}'", src.display(), dst.display()))?;
    let _ = std::fs::remove_file(src);
    Ok(())
}
