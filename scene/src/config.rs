use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    shape::{Rgb, ShapeKind},
};

/// Every recognized generation option. Loaded from JSON with per-field
/// defaults; call [`GenerationConfig::validate`] before use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub num_samples: usize,
    pub domain: String,
    pub random_seed: Option<u64>,
    pub output_dir: PathBuf,
    /// (width, height)
    pub image_size: (u32, u32),

    pub generate_videos: bool,
    pub video_fps: u32,
    pub hold_frames: usize,
    pub highlight_frames: usize,

    pub min_objects: usize,
    pub max_objects: usize,
    pub object_types: Vec<ShapeKind>,
    /// Inclusive (min, max) pixel diameter.
    pub object_size_range: (u32, u32),
    pub use_same_shape: bool,
    pub background_color: Rgb,
    pub object_colors: Vec<Rgb>,
    pub allow_overlap: bool,
    pub min_distance: u32,
    /// Emit a revealed-answer image instead of goal text.
    pub use_final_image: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_samples: 0,
            domain: "counting_objects".to_string(),
            random_seed: None,
            output_dir: PathBuf::from("data/questions"),
            image_size: (512, 512),
            generate_videos: true,
            video_fps: 10,
            hold_frames: 10,
            highlight_frames: 5,
            min_objects: 1,
            max_objects: 20,
            object_types: ShapeKind::ALL.to_vec(),
            object_size_range: (30, 60),
            use_same_shape: true,
            background_color: [240, 240, 240],
            object_colors: vec![
                [255, 100, 100],
                [100, 150, 255],
                [100, 255, 100],
                [255, 200, 100],
                [200, 100, 255],
            ],
            allow_overlap: false,
            min_distance: 10,
            use_final_image: true,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.is_empty() {
            return Err(ConfigError::invalid("domain must not be empty"));
        }
        if self.min_objects == 0 {
            return Err(ConfigError::invalid("min_objects must be at least 1"));
        }
        if self.min_objects > self.max_objects {
            return Err(ConfigError::invalid(format!(
                "min_objects ({}) exceeds max_objects ({})",
                self.min_objects, self.max_objects
            )));
        }
        if self.object_types.is_empty() {
            return Err(ConfigError::invalid("object_types must not be empty"));
        }
        if self.object_colors.is_empty() {
            return Err(ConfigError::invalid("object_colors must not be empty"));
        }
        let (size_min, size_max) = self.object_size_range;
        if size_min == 0 || size_min > size_max {
            return Err(ConfigError::invalid(format!(
                "object_size_range ({size_min}, {size_max}) must be non-zero and ordered"
            )));
        }
        let (width, height) = self.image_size;
        if width < size_max || height < size_max {
            return Err(ConfigError::invalid(format!(
                "image_size {width}x{height} cannot hold objects of size {size_max}"
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(ConfigError::invalid(format!(
                "image_size {width}x{height} exceeds the drawable range"
            )));
        }
        if self.min_distance.checked_add(size_max).is_none() {
            return Err(ConfigError::invalid(format!(
                "min_distance {} plus object size {size_max} overflows",
                self.min_distance
            )));
        }
        if self.generate_videos {
            if self.video_fps == 0 {
                return Err(ConfigError::invalid("video_fps must be non-zero"));
            }
            // yuv420p needs even dimensions
            if width % 2 != 0 || height % 2 != 0 {
                return Err(ConfigError::invalid(format!(
                    "image_size {width}x{height} must be even when videos are enabled"
                )));
            }
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.image_size.0
    }

    pub fn height(&self) -> u32 {
        self.image_size.1
    }

    pub fn size_max(&self) -> u32 {
        self.object_size_range.1
    }
}
