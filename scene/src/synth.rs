use std::{fmt, str::FromStr};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Serialize, Serializer};

use crate::{
    config::GenerationConfig,
    error::ConfigError,
    placement::{self, PlacementRules},
    shape::{Position, Rgb, ShapeKind},
};

/// What kind of scene a caller asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Defer to the config's `use_same_shape` policy.
    Any,
    Shape(ShapeKind),
    Mixed,
}

impl TaskType {
    /// Every configured shape followed by `Mixed`.
    pub fn all_for(cfg: &GenerationConfig) -> Vec<TaskType> {
        cfg.object_types
            .iter()
            .copied()
            .map(TaskType::Shape)
            .chain([TaskType::Mixed])
            .collect()
    }

    /// Parses `s`, rejecting shapes outside the configured vocabulary.
    pub fn parse_for(s: &str, cfg: &GenerationConfig) -> Result<TaskType, ConfigError> {
        match s.parse()? {
            TaskType::Shape(kind) if !cfg.object_types.contains(&kind) => {
                Err(ConfigError::UnknownTaskType(s.to_string()))
            }
            task_type => Ok(task_type),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Any => f.write_str("default"),
            TaskType::Shape(kind) => kind.fmt(f),
            TaskType::Mixed => f.write_str("mixed"),
        }
    }
}

impl FromStr for TaskType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mixed" => Ok(TaskType::Mixed),
            "default" => Ok(TaskType::Any),
            other => other.parse().map(TaskType::Shape),
        }
    }
}

/// Category recorded on a finished scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    Shape(ShapeKind),
    Mixed,
}

impl CategoryLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryLabel::Shape(kind) => kind.tag(),
            CategoryLabel::Mixed => "mixed",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategoryLabel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// One object's complete attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneObject {
    pub shape: ShapeKind,
    pub color: Rgb,
    pub size: u32,
    pub position: Position,
}

/// Immutable description of one scene. The per-object sequences are always
/// index-aligned and of length `object_count()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneDescription {
    shapes: Vec<ShapeKind>,
    colors: Vec<Rgb>,
    sizes: Vec<u32>,
    positions: Vec<Position>,
    category: CategoryLabel,
}

impl SceneDescription {
    pub fn from_objects(objects: &[SceneObject], category: CategoryLabel) -> Self {
        Self {
            shapes: objects.iter().map(|o| o.shape).collect(),
            colors: objects.iter().map(|o| o.color).collect(),
            sizes: objects.iter().map(|o| o.size).collect(),
            positions: objects.iter().map(|o| o.position).collect(),
            category,
        }
    }

    pub fn object_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> &[ShapeKind] {
        &self.shapes
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn category(&self) -> CategoryLabel {
        self.category
    }

    pub fn object(&self, i: usize) -> SceneObject {
        SceneObject {
            shape: self.shapes[i],
            color: self.colors[i],
            size: self.sizes[i],
            position: self.positions[i],
        }
    }

    /// Objects in generation order.
    pub fn objects(&self) -> impl ExactSizeIterator<Item = SceneObject> + '_ {
        (0..self.object_count()).map(|i| self.object(i))
    }
}

pub struct SceneSynthesizer {
    min_objects: usize,
    max_objects: usize,
    shapes: Vec<ShapeKind>,
    palette: Vec<Rgb>,
    size_range: (u32, u32),
    use_same_shape: bool,
    rules: PlacementRules,
}

impl SceneSynthesizer {
    pub fn new(cfg: &GenerationConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            min_objects: cfg.min_objects,
            max_objects: cfg.max_objects,
            shapes: cfg.object_types.clone(),
            palette: cfg.object_colors.clone(),
            size_range: cfg.object_size_range,
            use_same_shape: cfg.use_same_shape,
            rules: PlacementRules::from_config(cfg),
        })
    }

    pub fn rules(&self) -> &PlacementRules {
        &self.rules
    }

    pub fn synthesize_seeded(&self, seed: u64, task_type: TaskType) -> SceneDescription {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.synthesize(&mut rng, task_type)
    }

    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R, task_type: TaskType) -> SceneDescription {
        let count = rng.random_range(self.min_objects..=self.max_objects);

        let (shapes, category) = match task_type {
            TaskType::Shape(kind) => (vec![kind; count], CategoryLabel::Shape(kind)),
            TaskType::Mixed => (self.random_shapes(rng, count), CategoryLabel::Mixed),
            TaskType::Any if self.use_same_shape => {
                let kind = self.random_shape(rng);
                (vec![kind; count], CategoryLabel::Shape(kind))
            }
            TaskType::Any => (self.random_shapes(rng, count), CategoryLabel::Mixed),
        };

        let colors = (0..count)
            .map(|_| self.palette[rng.random_range(0..self.palette.len())])
            .collect();

        let positions = placement::place(rng, count, &self.rules).positions;

        let (lo, hi) = self.size_range;
        let sizes = (0..count).map(|_| rng.random_range(lo..=hi)).collect();

        SceneDescription {
            shapes,
            colors,
            sizes,
            positions,
            category,
        }
    }

    fn random_shape<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        self.shapes[rng.random_range(0..self.shapes.len())]
    }

    fn random_shapes<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<ShapeKind> {
        (0..count).map(|_| self.random_shape(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(mutate: impl FnOnce(&mut GenerationConfig)) -> SceneSynthesizer {
        let mut cfg = GenerationConfig::default();
        mutate(&mut cfg);
        SceneSynthesizer::new(&cfg).unwrap()
    }

    #[test]
    fn sequences_are_index_aligned() {
        let s = synth(|_| {});
        let cfg = GenerationConfig::default();
        for seed in 0..200 {
            let scene = s.synthesize_seeded(seed, TaskType::Mixed);
            let n = scene.object_count();
            assert!((cfg.min_objects..=cfg.max_objects).contains(&n));
            assert_eq!(scene.shapes().len(), n);
            assert_eq!(scene.colors().len(), n);
            assert_eq!(scene.sizes().len(), n);
            assert_eq!(scene.positions().len(), n);
            assert!(scene.sizes().iter().all(|s| (30..=60).contains(s)));
            assert!(scene.colors().iter().all(|c| cfg.object_colors.contains(c)));
            assert!(scene.positions().iter().all(|p| s.rules().contains(*p)));
        }
    }

    #[test]
    fn fixed_circle_scenario() {
        let s = synth(|c| {
            c.object_types = vec![ShapeKind::Circle];
            c.min_objects = 3;
            c.max_objects = 3;
            c.allow_overlap = false;
        });
        let gap = i64::from(s.rules().spacing());
        for seed in 0..100 {
            let scene = s.synthesize_seeded(seed, TaskType::Any);
            assert_eq!(scene.object_count(), 3);
            assert!(scene.shapes().iter().all(|k| *k == ShapeKind::Circle));
            assert_eq!(scene.category(), CategoryLabel::Shape(ShapeKind::Circle));
            let p = scene.positions();
            for i in 0..3 {
                for j in i + 1..3 {
                    assert!(p[i].distance_sq(p[j]) >= gap * gap);
                }
            }
        }
    }

    #[test]
    fn concrete_shape_overrides_policy() {
        let s = synth(|c| c.use_same_shape = false);
        let scene = s.synthesize_seeded(5, TaskType::Shape(ShapeKind::Star));
        assert!(scene.shapes().iter().all(|k| *k == ShapeKind::Star));
        assert_eq!(scene.category(), CategoryLabel::Shape(ShapeKind::Star));
    }

    #[test]
    fn default_policy_follows_same_shape_toggle() {
        let same = synth(|c| c.use_same_shape = true);
        for seed in 0..50 {
            let scene = same.synthesize_seeded(seed, TaskType::Any);
            let first = scene.shapes()[0];
            assert!(scene.shapes().iter().all(|k| *k == first));
        }

        let mixed = synth(|c| c.use_same_shape = false);
        let scene = mixed.synthesize_seeded(1, TaskType::Any);
        assert_eq!(scene.category(), CategoryLabel::Mixed);
    }

    #[test]
    fn mixed_scenes_draw_from_vocabulary() {
        let s = synth(|c| {
            c.object_types = vec![ShapeKind::Square, ShapeKind::Triangle];
            c.min_objects = 20;
        });
        let scene = s.synthesize_seeded(8, TaskType::Mixed);
        assert!(
            scene
                .shapes()
                .iter()
                .all(|k| matches!(k, ShapeKind::Square | ShapeKind::Triangle))
        );
        assert_eq!(scene.category(), CategoryLabel::Mixed);
    }

    #[test]
    fn seeded_synthesis_is_deterministic() {
        let s = synth(|_| {});
        assert_eq!(
            s.synthesize_seeded(1234, TaskType::Mixed),
            s.synthesize_seeded(1234, TaskType::Mixed)
        );
    }

    #[test]
    fn parse_for_respects_vocabulary() {
        let cfg = GenerationConfig {
            object_types: vec![ShapeKind::Circle, ShapeKind::Square],
            ..GenerationConfig::default()
        };
        assert_eq!(
            TaskType::parse_for("square", &cfg).unwrap(),
            TaskType::Shape(ShapeKind::Square)
        );
        assert_eq!(TaskType::parse_for("mixed", &cfg).unwrap(), TaskType::Mixed);
        assert_eq!(
            TaskType::parse_for("star", &cfg).unwrap_err(),
            ConfigError::UnknownTaskType("star".into())
        );
        assert!(TaskType::parse_for("hexagon", &cfg).is_err());
    }

    #[test]
    fn task_type_parses_and_displays() {
        assert_eq!("mixed".parse::<TaskType>().unwrap(), TaskType::Mixed);
        assert_eq!(
            "circle".parse::<TaskType>().unwrap(),
            TaskType::Shape(ShapeKind::Circle)
        );
        assert!("blob".parse::<TaskType>().is_err());
        assert_eq!(TaskType::Shape(ShapeKind::Star).to_string(), "star");
    }

    #[test]
    fn default_task_types_end_with_mixed() {
        let cfg = GenerationConfig::default();
        let all = TaskType::all_for(&cfg);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0], TaskType::Shape(ShapeKind::Circle));
        assert_eq!(all[4], TaskType::Mixed);
    }
}
