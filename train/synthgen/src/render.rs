use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut},
    point::Point,
    rect::Rect,
};
use scene::{GenerationConfig, Outline, Position, SceneDescription, ShapeKind};

use crate::fonts::{FontCache, OverlayFont};

const OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const OUTLINE_WIDTH: i32 = 2;
const HIGHLIGHT_RING: Rgb<u8> = Rgb([255, 255, 0]);
const RING_MARGIN: u32 = 20;
const RING_WIDTH: i32 = 4;
const HIGHLIGHT_SHIFT: u8 = 50;
const LABEL_PADDING: i32 = 10;
const LABEL_BG: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_FG: Rgb<u8> = Rgb([0, 0, 0]);

/// Rasterizes scene descriptions onto fixed-size RGB canvases.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    background: Rgb<u8>,
    font: OverlayFont<'static>,
}

impl SceneRenderer {
    pub fn new(cfg: &GenerationConfig) -> Self {
        Self::with_font(cfg, OverlayFont::from_cache(FontCache::global()))
    }

    pub fn with_font(cfg: &GenerationConfig, font: OverlayFont<'static>) -> Self {
        Self {
            width: cfg.width(),
            height: cfg.height(),
            background: Rgb(cfg.background_color),
            font,
        }
    }

    fn blank(&self) -> RgbImage {
        RgbImage::from_pixel(self.width, self.height, self.background)
    }

    /// All objects in generation order, no highlight.
    pub fn render_base(&self, scene: &SceneDescription) -> RgbImage {
        let mut img = self.blank();
        for o in scene.objects() {
            draw_shape(&mut img, o.shape, o.position, o.size, Rgb(o.color));
        }
        img
    }

    /// Object `index` brightened and ringed, every other object dimmed.
    pub fn render_highlight(&self, scene: &SceneDescription, index: usize) -> RgbImage {
        let mut img = self.blank();
        for (i, o) in scene.objects().enumerate() {
            if i == index {
                let radius = ((o.size + RING_MARGIN) / 2) as i32;
                draw_ring(&mut img, o.position, radius, RING_WIDTH, HIGHLIGHT_RING);
                let bright = o.color.map(|c| c.saturating_add(HIGHLIGHT_SHIFT));
                draw_shape(&mut img, o.shape, o.position, o.size, Rgb(bright));
            } else {
                let dim = o.color.map(|c| c.saturating_sub(HIGHLIGHT_SHIFT));
                draw_shape(&mut img, o.shape, o.position, o.size, Rgb(dim));
            }
        }
        img
    }

    /// Base scene with a centered `Count: N` label.
    pub fn render_answer(&self, scene: &SceneDescription) -> RgbImage {
        let mut img = self.render_base(scene);
        self.draw_count_label(&mut img, scene.object_count());
        img
    }

    fn draw_count_label(&self, img: &mut RgbImage, count: usize) {
        let text = format!("Count: {count}");
        let px = (self.width.min(self.height) / 10).max(1);
        let (tw, th) = self.font.measure(&text, px);
        let x = (self.width as i32 - tw as i32) / 2;
        let y = (self.height as i32 - th as i32) / 2;

        let bg = Rect::at(x - LABEL_PADDING, y - LABEL_PADDING).of_size(
            tw + 2 * LABEL_PADDING as u32 + 1,
            th + 2 * LABEL_PADDING as u32 + 1,
        );
        draw_filled_rect_mut(img, bg, LABEL_BG);
        self.font.draw(img, &text, x, y, px, LABEL_FG);
    }
}

/// Draws one filled shape with a black outline.
pub fn draw_shape(img: &mut RgbImage, kind: ShapeKind, center: Position, size: u32, color: Rgb<u8>) {
    match kind.outline(center, size) {
        Outline::Disc { center, radius } => {
            let c = (center.x, center.y);
            draw_filled_circle_mut(img, c, radius, OUTLINE);
            if radius > OUTLINE_WIDTH {
                draw_filled_circle_mut(img, c, radius - OUTLINE_WIDTH, color);
            }
        }
        Outline::Rect {
            left,
            top,
            right,
            bottom,
        } => {
            let (w, h) = ((right - left + 1) as u32, (bottom - top + 1) as u32);
            draw_filled_rect_mut(img, Rect::at(left, top).of_size(w, h), OUTLINE);
            let inset = 2 * OUTLINE_WIDTH as u32;
            if w > inset && h > inset {
                let inner = Rect::at(left + OUTLINE_WIDTH, top + OUTLINE_WIDTH)
                    .of_size(w - inset, h - inset);
                draw_filled_rect_mut(img, inner, color);
            }
        }
        Outline::Polygon(points) => {
            fill_polygon(img, &points, color);
            stroke_polygon(img, &points, center);
        }
    }
}

fn fill_polygon(img: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(img, &poly, color);
    } else if let Some(p) = poly.first() {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < img.width() && (p.y as u32) < img.height() {
            img.put_pixel(p.x as u32, p.y as u32, color);
        }
    }
}

/// Closed outline, thickened by a second pass shrunk one pixel toward the center.
fn stroke_polygon(img: &mut RgbImage, points: &[(f32, f32)], center: Position) {
    let (cx, cy) = (center.x as f32, center.y as f32);
    for inset in 0..OUTLINE_WIDTH {
        let ring: Vec<(f32, f32)> = points
            .iter()
            .map(|&(x, y)| {
                let (dx, dy) = (x - cx, y - cy);
                let len = (dx * dx + dy * dy).sqrt();
                if len <= inset as f32 {
                    (cx, cy)
                } else {
                    let k = (len - inset as f32) / len;
                    (cx + dx * k, cy + dy * k)
                }
            })
            .collect();
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            draw_line_segment_mut(img, a, b, OUTLINE);
        }
    }
}

/// Annulus of the given outer radius and width, clipped to the image.
fn draw_ring(img: &mut RgbImage, center: Position, radius: i32, width: i32, color: Rgb<u8>) {
    let outer = i64::from(radius) * i64::from(radius);
    let inner_r = i64::from((radius - width).max(0));
    let inner = inner_r * inner_r;
    let (w, h) = (img.width() as i32, img.height() as i32);
    for y in (center.y - radius).max(0)..=(center.y + radius).min(h - 1) {
        for x in (center.x - radius).max(0)..=(center.x + radius).min(w - 1) {
            let d = Position::new(x, y).distance_sq(center);
            if d <= outer && d > inner {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
