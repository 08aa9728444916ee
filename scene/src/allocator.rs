use rand::RngCore;
use tracing::debug;

use crate::{
    error::{SceneError, SceneResult},
    signature::{self, Signature, SignatureSet},
    synth::{SceneDescription, SceneSynthesizer, TaskType},
};

pub const MAX_UNIQUE_ATTEMPTS: u32 = 1000;

/// How many tasks each category receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub per_type: Vec<(TaskType, usize)>,
}

impl Allocation {
    /// `total / n` each; the first `total % n` categories get one more.
    pub fn even(total: usize, types: &[TaskType]) -> Self {
        Self {
            per_type: types
                .iter()
                .copied()
                .zip(even_split(total, types.len()))
                .collect(),
        }
    }

    pub fn fixed(per_type: usize, types: &[TaskType]) -> Self {
        Self {
            per_type: types.iter().map(|t| (*t, per_type)).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.per_type.iter().map(|(_, n)| n).sum()
    }
}

pub fn even_split(total: usize, n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let extra = total % n;
    (0..n).map(|i| base + usize::from(i < extra)).collect()
}

/// A scene that passed the uniqueness check, with the seed that reproduces it.
#[derive(Clone, Debug)]
pub struct AcceptedScene {
    pub seed: u64,
    pub scene: SceneDescription,
    pub signature: Signature,
    pub attempts: u32,
}

/// Draws per-attempt seeds from `seeds` until the synthesizer yields a scene whose
/// signature is new to `seen`, up to [`MAX_UNIQUE_ATTEMPTS`].
pub fn find_unique<S: RngCore + ?Sized>(
    synth: &SceneSynthesizer,
    seen: &mut SignatureSet,
    seeds: &mut S,
    task_type: TaskType,
) -> SceneResult<AcceptedScene> {
    for attempt in 1..=MAX_UNIQUE_ATTEMPTS {
        let seed = seeds.next_u64();
        let scene = synth.synthesize_seeded(seed, task_type);
        let signature = signature::sign(&scene);
        if seen.insert_if_absent(signature) {
            debug!(%task_type, attempt, %signature, "accepted scene");
            return Ok(AcceptedScene {
                seed,
                scene,
                signature,
                attempts: attempt,
            });
        }
    }

    Err(SceneError::UniquenessExhausted {
        task_type,
        attempts: MAX_UNIQUE_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GenerationConfig, shape::ShapeKind};
    use rand::SeedableRng;
    use rand_xoshiro::SplitMix64;

    fn five_types() -> Vec<TaskType> {
        TaskType::all_for(&GenerationConfig::default())
    }

    #[test]
    fn twenty_over_five_is_flat() {
        let alloc = Allocation::even(20, &five_types());
        let counts: Vec<usize> = alloc.per_type.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn remainder_goes_to_first_categories() {
        let alloc = Allocation::even(22, &five_types());
        let counts: Vec<usize> = alloc.per_type.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![5, 5, 4, 4, 4]);
        assert_eq!(alloc.per_type[0].0, TaskType::Shape(ShapeKind::Circle));
        assert_eq!(alloc.total(), 22);
    }

    #[test]
    fn remainder_law_holds() {
        for n in 1..9 {
            for total in 0..60 {
                let split = even_split(total, n);
                assert_eq!(split.len(), n);
                assert_eq!(split.iter().sum::<usize>(), total);
                let max = split.iter().max().unwrap();
                let min = split.iter().min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn fewer_tasks_than_types_leaves_zeros() {
        assert_eq!(even_split(2, 5), vec![1, 1, 0, 0, 0]);
        assert!(even_split(3, 0).is_empty());
    }

    #[test]
    fn fixed_gives_every_type_the_same_count() {
        let alloc = Allocation::fixed(7, &five_types());
        assert!(alloc.per_type.iter().all(|(_, n)| *n == 7));
        assert_eq!(alloc.total(), 35);
    }

    #[test]
    fn unique_scenes_never_repeat() {
        let synth = SceneSynthesizer::new(&GenerationConfig::default()).unwrap();
        let mut seen = SignatureSet::new();
        let mut seeds = SplitMix64::seed_from_u64(42);
        for _ in 0..50 {
            find_unique(&synth, &mut seen, &mut seeds, TaskType::Mixed).unwrap();
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn tiny_space_exhausts() {
        let cfg = GenerationConfig {
            image_size: (2, 2),
            min_objects: 1,
            max_objects: 1,
            object_types: vec![ShapeKind::Circle],
            object_size_range: (2, 2),
            object_colors: vec![[255, 0, 0]],
            ..GenerationConfig::default()
        };
        let synth = SceneSynthesizer::new(&cfg).unwrap();
        let mut seen = SignatureSet::new();
        let mut seeds = SplitMix64::seed_from_u64(0);
        let task = TaskType::Shape(ShapeKind::Circle);

        let first = find_unique(&synth, &mut seen, &mut seeds, task).unwrap();
        assert_eq!(first.attempts, 1);

        let err = find_unique(&synth, &mut seen, &mut seeds, task).unwrap_err();
        assert_eq!(
            err,
            SceneError::UniquenessExhausted {
                task_type: task,
                attempts: MAX_UNIQUE_ATTEMPTS
            }
        );
    }
}
