use std::{
    fs::read_dir,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use ab_glyph::{Font, FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{info, warn};

static FONT_CACHE: OnceLock<FontCache> = OnceLock::new();

/// Glyphs an overlay font must cover.
pub const OVERLAY_CHARS: &str = "Count:0123456789";

const FONT_DIRS: [&str; 5] = [
    "assets/fonts",
    "/usr/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];
const MAX_SCAN_DEPTH: usize = 4;

struct LoadedFont {
    family: String,
    font: FontArc,
}

pub struct FontCache {
    fonts: Vec<LoadedFont>,
}

impl FontCache {
    fn new() -> Self {
        let mut files = Vec::new();
        for dir in FONT_DIRS {
            collect_font_files(Path::new(dir), MAX_SCAN_DEPTH, &mut files);
        }
        let cache = Self::from_files(&files);
        match cache.fonts.first() {
            Some(f) => info!(family = %f.family, candidates = cache.fonts.len(), "overlay font"),
            None => warn!("no usable fonts found, overlays use the built-in bitmap glyphs"),
        }
        cache
    }

    pub fn from_files(paths: &[PathBuf]) -> Self {
        let mut fonts: Vec<LoadedFont> = paths.iter().filter_map(|p| load_font(p)).collect();
        // deterministic order, Arial first when present
        fonts.sort_by(|a, b| {
            let key = |f: &LoadedFont| (!f.family.starts_with("Arial"), f.family.clone());
            key(a).cmp(&key(b))
        });
        FontCache { fonts }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        FontCache { fonts: Vec::new() }
    }

    pub fn primary(&self) -> Option<&FontArc> {
        self.fonts.first().map(|f| &f.font)
    }

    pub fn global() -> &'static FontCache {
        FONT_CACHE.get_or_init(FontCache::new)
    }
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = read_dir(dir) else {
        return;
    };
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if path.is_dir() {
            if depth > 0 {
                collect_font_files(&path, depth - 1, out);
            }
        } else if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("ttf") | Some("otf") | Some("TTF")
        ) {
            out.push(path);
        }
    }
}

fn load_font(path: &Path) -> Option<LoadedFont> {
    let bytes = std::fs::read(path).ok()?;
    let family = family_name(&bytes).unwrap_or_else(|| path.display().to_string());
    let font = FontArc::try_from_vec(bytes).ok()?;
    OVERLAY_CHARS
        .chars()
        .all(|ch| font.glyph_id(ch).0 != 0)
        .then_some(LoadedFont { family, font })
}

fn family_name(bytes: &[u8]) -> Option<String> {
    let face = ttf_parser::Face::parse(bytes, 0).ok()?;
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::FULL_NAME && n.is_unicode())
        .find_map(|n| n.to_string())
}

/// Text renderer for answer overlays: an outline font when one is available,
/// otherwise a 5x7 bitmap face.
#[derive(Clone, Copy)]
pub enum OverlayFont<'a> {
    Outline(&'a FontArc),
    Bitmap,
}

impl<'a> OverlayFont<'a> {
    pub fn from_cache(cache: &'a FontCache) -> Self {
        cache.primary().map_or(OverlayFont::Bitmap, OverlayFont::Outline)
    }

    /// Width and height of `text` at a nominal pixel size.
    pub fn measure(&self, text: &str, px: u32) -> (u32, u32) {
        match self {
            OverlayFont::Outline(font) => text_size(PxScale::from(px as f32), *font, text),
            OverlayFont::Bitmap => {
                let s = bitmap_scale(px);
                let n = text.chars().count() as u32;
                if n == 0 {
                    return (0, 0);
                }
                (n * (GLYPH_W + 1) * s - s, GLYPH_H * s)
            }
        }
    }

    pub fn draw(&self, img: &mut RgbImage, text: &str, x: i32, y: i32, px: u32, color: Rgb<u8>) {
        match self {
            OverlayFont::Outline(font) => {
                draw_text_mut(img, color, x, y, PxScale::from(px as f32), *font, text)
            }
            OverlayFont::Bitmap => draw_bitmap_text(img, text, x, y, bitmap_scale(px), color),
        }
    }
}

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

fn bitmap_scale(px: u32) -> u32 {
    (px / GLYPH_H).max(1)
}

fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _ => [0; 7],
    }
}

fn draw_bitmap_text(img: &mut RgbImage, text: &str, x: i32, y: i32, scale: u32, color: Rgb<u8>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let s = scale as i32;
    for (i, ch) in text.chars().enumerate() {
        let gx = x + i as i32 * (GLYPH_W as i32 + 1) * s;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_W as i32 {
                if bits & (1 << (GLYPH_W as i32 - 1 - col)) == 0 {
                    continue;
                }
                let px0 = gx + col * s;
                let py0 = y + row as i32 * s;
                for py in py0.max(0)..(py0 + s).min(h) {
                    for px in px0.max(0)..(px0 + s).min(w) {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}
