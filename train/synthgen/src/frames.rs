use image::RgbImage;
use scene::SceneDescription;

use crate::render::SceneRenderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    pub hold: usize,
    pub highlight: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            hold: 10,
            highlight: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealMode {
    CountOverlay,
    Plain,
}

/// One distinct frame shown for `repeat` consecutive video frames.
pub struct FrameRun {
    pub frame: RgbImage,
    pub repeat: usize,
}

/// Ordered animation stored as runs of identical frames.
#[derive(Default)]
pub struct FrameSequence {
    runs: Vec<FrameRun>,
}

impl FrameSequence {
    pub fn push(&mut self, frame: RgbImage, repeat: usize) {
        if repeat > 0 {
            self.runs.push(FrameRun { frame, repeat });
        }
    }

    pub fn runs(&self) -> &[FrameRun] {
        &self.runs
    }

    /// Total frame count with repeats expanded.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.repeat).sum()
    }

    pub fn frames(&self) -> impl Iterator<Item = &RgbImage> {
        self.runs
            .iter()
            .flat_map(|r| std::iter::repeat_n(&r.frame, r.repeat))
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.runs.first().map(|r| r.frame.dimensions())
    }
}

/// Counting animation: hold on the scene, highlight each object in generation
/// order, then hold on the reveal frame. Always `2 * hold + n * highlight` frames.
pub fn compose_counting(
    renderer: &SceneRenderer,
    scene: &SceneDescription,
    timing: FrameTiming,
    reveal: RevealMode,
) -> FrameSequence {
    let mut seq = FrameSequence::default();
    let base = renderer.render_base(scene);

    let last = match reveal {
        RevealMode::CountOverlay => renderer.render_answer(scene),
        RevealMode::Plain => base.clone(),
    };

    seq.push(base, timing.hold);
    for i in 0..scene.object_count() {
        seq.push(renderer.render_highlight(scene, i), timing.highlight);
    }
    seq.push(last, timing.hold);
    seq
}
