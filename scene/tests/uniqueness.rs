use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use rand_xoshiro::SplitMix64;
use scene::{
    Allocation, GenerationConfig, SceneDescription, SceneError, SceneObject, SceneSynthesizer,
    ShapeKind, SignatureSet, TaskType, find_unique, sign,
};

#[test]
fn shuffled_scenes_keep_their_signature() {
    let synth = SceneSynthesizer::new(&GenerationConfig::default()).unwrap();
    let mut rng = SmallRng::seed_from_u64(2024);

    for seed in 0..100 {
        let scene = synth.synthesize_seeded(seed, TaskType::Mixed);
        let mut objects: Vec<SceneObject> = scene.objects().collect();
        objects.shuffle(&mut rng);
        let shuffled = SceneDescription::from_objects(&objects, scene.category());
        assert_eq!(sign(&scene), sign(&shuffled), "seed {seed}");
    }
}

#[test]
fn generated_positions_respect_margins() {
    let cfg = GenerationConfig {
        image_size: (320, 200),
        allow_overlap: true,
        ..GenerationConfig::default()
    };
    let synth = SceneSynthesizer::new(&cfg).unwrap();
    let margin = (cfg.size_max() / 2) as i32;

    for seed in 0..200 {
        let scene = synth.synthesize_seeded(seed, TaskType::Any);
        for p in scene.positions() {
            assert!(p.x >= margin && p.x <= 320 - margin);
            assert!(p.y >= margin && p.y <= 200 - margin);
        }
    }
}

#[test]
fn allocation_drives_unique_generation_per_category() {
    let cfg = GenerationConfig {
        random_seed: Some(9),
        ..GenerationConfig::default()
    };
    let synth = SceneSynthesizer::new(&cfg).unwrap();
    let alloc = Allocation::even(22, &TaskType::all_for(&cfg));
    let mut seen = SignatureSet::new();
    let mut seeds = SplitMix64::seed_from_u64(9);

    let mut produced = 0;
    for (task_type, n) in &alloc.per_type {
        for _ in 0..*n {
            let accepted = find_unique(&synth, &mut seen, &mut seeds, *task_type).unwrap();
            if let TaskType::Shape(kind) = task_type {
                assert!(accepted.scene.shapes().iter().all(|k| k == kind));
            }
            produced += 1;
        }
    }
    assert_eq!(produced, 22);
    assert_eq!(seen.len(), 22);
}

#[test]
fn accepted_seed_reproduces_scene() {
    let synth = SceneSynthesizer::new(&GenerationConfig::default()).unwrap();
    let mut seen = SignatureSet::new();
    let mut seeds = SplitMix64::seed_from_u64(5);
    let accepted = find_unique(&synth, &mut seen, &mut seeds, TaskType::Mixed).unwrap();
    assert_eq!(
        synth.synthesize_seeded(accepted.seed, TaskType::Mixed),
        accepted.scene
    );
}

#[test]
fn exhausted_space_reports_category() {
    let cfg = GenerationConfig {
        image_size: (2, 2),
        min_objects: 1,
        max_objects: 1,
        object_types: vec![ShapeKind::Square],
        object_size_range: (2, 2),
        object_colors: vec![[0, 0, 0]],
        ..GenerationConfig::default()
    };
    let synth = SceneSynthesizer::new(&cfg).unwrap();
    let mut seen = SignatureSet::new();
    let mut seeds = SplitMix64::seed_from_u64(1);

    let mut result = Ok(());
    for _ in 0..3 {
        result = find_unique(&synth, &mut seen, &mut seeds, TaskType::Mixed).map(|_| ());
        if result.is_err() {
            break;
        }
    }
    match result {
        Err(SceneError::UniquenessExhausted { task_type, attempts }) => {
            assert_eq!(task_type, TaskType::Mixed);
            assert_eq!(attempts, 1000);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[test]
fn malformed_config_fails_at_construction() {
    let cfg = GenerationConfig {
        min_objects: 9,
        max_objects: 3,
        ..GenerationConfig::default()
    };
    assert!(SceneSynthesizer::new(&cfg).is_err());
}
