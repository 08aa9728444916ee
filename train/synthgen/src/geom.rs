use scene::{Position, SceneDescription};
use serde::Serialize;

/// Axis-aligned pixel box of one object, clipped to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl ObjectBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn around(center: Position, size: u32, canvas: (u32, u32)) -> Self {
        let half = (size / 2) as i32;
        let clamp = |v: i32, hi: u32| v.clamp(0, hi as i32) as u32;
        let x0 = clamp(center.x - half, canvas.0);
        let y0 = clamp(center.y - half, canvas.1);
        let x1 = clamp(center.x + half, canvas.0);
        let y1 = clamp(center.y + half, canvas.1);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

pub fn object_boxes(scene: &SceneDescription, canvas: (u32, u32)) -> Vec<ObjectBox> {
    scene
        .objects()
        .map(|o| ObjectBox::around(o.position, o.size, canvas))
        .collect()
}
