use std::{f32::consts::PI, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Closed set of drawable object shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Star,
}

const STAR_POINTS: usize = 5;
const STAR_INNER_RATIO: f32 = 0.4;

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Star,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Star => "star",
        }
    }

    /// Geometry of one object of this kind centred at `center` with the given
    /// pixel diameter.
    pub fn outline(self, center: Position, size: u32) -> Outline {
        let half = (size / 2) as i32;
        let Position { x, y } = center;
        match self {
            ShapeKind::Circle => Outline::Disc {
                center,
                radius: half,
            },
            ShapeKind::Square => Outline::Rect {
                left: x - half,
                top: y - half,
                right: x + half,
                bottom: y + half,
            },
            ShapeKind::Triangle => {
                let height = (size as f32 * 3f32.sqrt() / 2.0) as i32;
                let dy = (height / 2) as f32;
                let (x, y, half) = (x as f32, y as f32, half as f32);
                Outline::Polygon(vec![(x, y - dy), (x - half, y + dy), (x + half, y + dy)])
            }
            ShapeKind::Star => {
                let outer = half as f32;
                let inner = outer * STAR_INNER_RATIO;
                let points = (0..STAR_POINTS * 2)
                    .map(|i| {
                        let angle = i as f32 * PI / STAR_POINTS as f32 - PI / 2.0;
                        let r = if i % 2 == 0 { outer } else { inner };
                        (x as f32 + r * angle.cos(), y as f32 + r * angle.sin())
                    })
                    .collect();
                Outline::Polygon(points)
            }
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ShapeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| ConfigError::UnknownTaskType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

/// Drawing commands for one object, independent of any raster backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    Disc {
        center: Position,
        radius: i32,
    },
    /// Inclusive pixel bounds.
    Rect {
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
    },
    Polygon(Vec<(f32, f32)>),
}

pub type Rgb = [u8; 3];

pub fn channel_sum(c: Rgb) -> u32 {
    c.iter().map(|&v| u32::from(v)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.tag().parse::<ShapeKind>().unwrap(), kind);
        }
        assert!("hexagon".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&ShapeKind::Triangle).unwrap();
        assert_eq!(json, "\"triangle\"");
    }

    #[test]
    fn square_outline_spans_size() {
        let o = ShapeKind::Square.outline(Position::new(100, 50), 40);
        assert_eq!(
            o,
            Outline::Rect {
                left: 80,
                top: 30,
                right: 120,
                bottom: 70
            }
        );
    }

    #[test]
    fn triangle_is_equilateral_ish() {
        let Outline::Polygon(pts) = ShapeKind::Triangle.outline(Position::new(0, 0), 40) else {
            panic!("triangle must be a polygon");
        };
        assert_eq!(pts.len(), 3);
        // height = floor(40 * sqrt(3) / 2) = 34, apex at -17
        assert_eq!(pts[0], (0.0, -17.0));
        assert_eq!(pts[1], (-20.0, 17.0));
        assert_eq!(pts[2], (20.0, 17.0));
    }

    #[test]
    fn star_alternates_outer_and_inner_radius() {
        let Outline::Polygon(pts) = ShapeKind::Star.outline(Position::new(0, 0), 50) else {
            panic!("star must be a polygon");
        };
        assert_eq!(pts.len(), 10);
        let r = |p: (f32, f32)| (p.0 * p.0 + p.1 * p.1).sqrt();
        assert!((r(pts[0]) - 25.0).abs() < 1e-3);
        assert!((r(pts[1]) - 10.0).abs() < 1e-3);
        // first point straight up
        assert!(pts[0].0.abs() < 1e-3 && pts[0].1 < 0.0);
    }

    #[test]
    fn distance_is_squared_euclidean() {
        assert_eq!(Position::new(0, 0).distance_sq(Position::new(3, 4)), 25);
    }
}
