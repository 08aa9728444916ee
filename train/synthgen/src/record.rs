use std::path::PathBuf;

use image::RgbImage;
use scene::{CategoryLabel, SceneDescription, ShapeKind, Signature};
use serde::Serialize;

use crate::geom::ObjectBox;

/// One finished task, ready for the dataset writer.
pub struct TaskPair {
    pub task_id: String,
    pub domain: String,
    pub category: CategoryLabel,
    pub prompt: String,
    pub first_image: RgbImage,
    /// Set when the final-image answer format is enabled.
    pub final_image: Option<RgbImage>,
    /// Set when the text answer format is enabled.
    pub goal_text: Option<String>,
    pub ground_truth_video: Option<PathBuf>,
    pub scene: SceneDescription,
    pub seed: u64,
    pub signature: Signature,
}

impl TaskPair {
    pub fn object_count(&self) -> usize {
        self.scene.object_count()
    }
}

#[derive(Serialize, Debug)]
pub struct JsonRecord<'a> {
    pub schema: &'static str,
    pub task_id: &'a str,
    pub domain: &'a str,
    pub category: CategoryLabel,
    pub count: usize,
    pub shapes: &'a [ShapeKind],
    pub boxes: Vec<ObjectBox>,
    pub seed: u64,
    pub signature: String,
    pub first_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}
