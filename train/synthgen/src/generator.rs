use std::path::PathBuf;

use anyhow::Context as _;
use rand::SeedableRng;
use rand_xoshiro::SplitMix64;
use scene::{
    AcceptedScene, Allocation, GenerationConfig, SceneError, SceneSynthesizer, SignatureSet,
    TaskType, find_unique,
};
use tracing::{debug, info, warn};

use crate::{
    encode::{FfmpegEncoder, VideoEncoder},
    frames::{self, FrameTiming, RevealMode},
    prompt,
    record::TaskPair,
    render::SceneRenderer,
};

/// Produces unique counting tasks. Owns the dedup set for its lifetime.
pub struct TaskGenerator<E: VideoEncoder = FfmpegEncoder> {
    config: GenerationConfig,
    synth: SceneSynthesizer,
    renderer: SceneRenderer,
    seen: SignatureSet,
    seeds: SplitMix64,
    encoder: Option<E>,
    video_dir: PathBuf,
}

impl TaskGenerator<FfmpegEncoder> {
    pub fn new(config: GenerationConfig) -> anyhow::Result<Self> {
        let encoder = if config.generate_videos {
            let found = FfmpegEncoder::detect(config.video_fps);
            if found.is_none() {
                warn!("ffmpeg not found on PATH, continuing without video generation");
            }
            found
        } else {
            None
        };
        let renderer = SceneRenderer::new(&config);
        Self::with_parts(config, renderer, encoder)
    }
}

impl<E: VideoEncoder> TaskGenerator<E> {
    pub fn with_parts(
        config: GenerationConfig,
        renderer: SceneRenderer,
        encoder: Option<E>,
    ) -> anyhow::Result<Self> {
        let synth = SceneSynthesizer::new(&config).context("invalid generation config")?;
        let seed = config.random_seed.unwrap_or_else(rand::random);
        info!(seed, domain = %config.domain, "task generator ready");

        let encoder = encoder.filter(|_| config.generate_videos);
        let video_dir = std::env::temp_dir().join(format!("{}_videos", config.domain));
        Ok(Self {
            synth,
            renderer,
            seen: SignatureSet::new(),
            seeds: SplitMix64::seed_from_u64(seed),
            encoder,
            video_dir,
            config,
        })
    }

    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }

    /// One task whose scene has not been produced by this generator before.
    pub fn generate_unique_task(
        &mut self,
        task_id: &str,
        task_type: TaskType,
    ) -> Result<TaskPair, SceneError> {
        let accepted = find_unique(&self.synth, &mut self.seen, &mut self.seeds, task_type)?;
        Ok(self.assemble(task_id, accepted))
    }

    fn assemble(&self, task_id: &str, accepted: AcceptedScene) -> TaskPair {
        let AcceptedScene {
            seed,
            scene,
            signature,
            ..
        } = accepted;

        let first_image = self.renderer.render_base(&scene);
        let (final_image, goal_text) = if self.config.use_final_image {
            (Some(self.renderer.render_answer(&scene)), None)
        } else {
            (None, Some(scene.object_count().to_string()))
        };

        let ground_truth_video = self.encoder.as_ref().and_then(|enc| {
            let timing = FrameTiming {
                hold: self.config.hold_frames,
                highlight: self.config.highlight_frames,
            };
            let reveal = if self.config.use_final_image {
                RevealMode::CountOverlay
            } else {
                RevealMode::Plain
            };
            let seq = frames::compose_counting(&self.renderer, &scene, timing, reveal);
            enc.encode(&seq, &self.video_dir.join(format!("{task_id}_ground_truth.mp4")))
        });

        TaskPair {
            task_id: task_id.to_string(),
            domain: self.config.domain.clone(),
            category: scene.category(),
            prompt: prompt::prompt_for(&scene),
            first_image,
            final_image,
            goal_text,
            ground_truth_video,
            scene,
            seed,
            signature,
        }
    }

    /// `n` unique tasks of one type, ids `{prefix}_{type}_{i:04}`.
    pub fn generate_tasks_for_type<F>(
        &mut self,
        task_type: TaskType,
        n: usize,
        prefix: &str,
        sink: &mut F,
    ) -> anyhow::Result<usize>
    where
        F: FnMut(TaskPair) -> anyhow::Result<()>,
    {
        for i in 0..n {
            let task_id = format!("{prefix}_{task_type}_{i:04}");
            let task = self
                .generate_unique_task(&task_id, task_type)
                .with_context(|| format!("while generating task '{task_id}'"))?;
            debug!(%task_id, count = task.object_count(), "generated");
            sink(task)?;
        }
        Ok(n)
    }

    pub fn generate_allocation<F>(
        &mut self,
        alloc: &Allocation,
        prefix: &str,
        mut sink: F,
    ) -> anyhow::Result<usize>
    where
        F: FnMut(TaskPair) -> anyhow::Result<()>,
    {
        let mut total = 0;
        for &(task_type, n) in &alloc.per_type {
            if n == 0 {
                continue;
            }
            info!(%task_type, n, "generating tasks");
            total += self.generate_tasks_for_type(task_type, n, prefix, &mut sink)?;
        }
        Ok(total)
    }

    /// `n` unique tasks under the default shape policy, ids `{domain}_{i:04}`.
    pub fn generate_samples<F>(&mut self, n: usize, mut sink: F) -> anyhow::Result<usize>
    where
        F: FnMut(TaskPair) -> anyhow::Result<()>,
    {
        for i in 0..n {
            let task_id = format!("{}_{i:04}", self.config.domain);
            let task = self
                .generate_unique_task(&task_id, TaskType::Any)
                .with_context(|| format!("while generating task '{task_id}'"))?;
            debug!(%task_id, category = %task.category, "generated");
            sink(task)?;
        }
        Ok(n)
    }
}
