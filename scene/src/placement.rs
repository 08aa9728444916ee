use rand::Rng;
use tracing::debug;

use crate::{config::GenerationConfig, shape::Position};

pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Bounds and spacing rules for scattering objects on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementRules {
    pub width: u32,
    pub height: u32,
    pub size_max: u32,
    pub allow_overlap: bool,
    pub min_distance: u32,
}

impl PlacementRules {
    pub fn from_config(cfg: &GenerationConfig) -> Self {
        Self {
            width: cfg.width(),
            height: cfg.height(),
            size_max: cfg.size_max(),
            allow_overlap: cfg.allow_overlap,
            min_distance: cfg.min_distance,
        }
    }

    /// Inclusive `(lo, hi)` range for x.
    pub fn x_range(&self) -> (i32, i32) {
        let m = (self.size_max / 2) as i32;
        (m, self.width as i32 - m)
    }

    /// Inclusive `(lo, hi)` range for y.
    pub fn y_range(&self) -> (i32, i32) {
        let m = (self.size_max / 2) as i32;
        (m, self.height as i32 - m)
    }

    pub fn contains(&self, p: Position) -> bool {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)
    }

    /// Required center-to-center gap. Uses the global `size_max` rather than the
    /// two objects' own radii, so spacing is stricter than needed for mixed sizes.
    pub fn spacing(&self) -> u32 {
        self.min_distance.saturating_add(self.size_max)
    }

    fn is_clear(&self, candidate: Position, placed: &[Position]) -> bool {
        if self.allow_overlap {
            return true;
        }
        let gap = i64::from(self.spacing());
        let min_sq = gap.saturating_mul(gap);
        placed
            .iter()
            .all(|p| candidate.distance_sq(*p) >= min_sq)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        Position::new(rng.random_range(x0..=x1), rng.random_range(y0..=y1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub positions: Vec<Position>,
    /// Objects that exhausted their attempts and got an unconstrained position.
    pub fallbacks: usize,
}

/// Greedy sequential placement, no backtracking.
pub fn place<R: Rng + ?Sized>(rng: &mut R, count: usize, rules: &PlacementRules) -> Placement {
    let mut positions = Vec::with_capacity(count);
    let mut fallbacks = 0;

    for _ in 0..count {
        let p = match try_place(rng, rules, &positions) {
            Some(p) => p,
            None => {
                fallbacks += 1;
                rules.sample(rng)
            }
        };
        positions.push(p);
    }

    if fallbacks > 0 {
        debug!(count, fallbacks, "placement fell back to unconstrained positions");
    }

    Placement {
        positions,
        fallbacks,
    }
}

fn try_place<R: Rng + ?Sized>(
    rng: &mut R,
    rules: &PlacementRules,
    placed: &[Position],
) -> Option<Position> {
    (0..MAX_PLACEMENT_ATTEMPTS)
        .map(|_| rules.sample(rng))
        .find(|candidate| rules.is_clear(*candidate, placed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn rules(width: u32, height: u32, allow_overlap: bool) -> PlacementRules {
        PlacementRules {
            width,
            height,
            size_max: 60,
            allow_overlap,
            min_distance: 10,
        }
    }

    #[test]
    fn positions_stay_inside_margins() {
        let r = rules(512, 300, true);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let placement = place(&mut rng, 20, &r);
            assert_eq!(placement.positions.len(), 20);
            for p in &placement.positions {
                assert!((30..=482).contains(&p.x), "{p:?}");
                assert!((30..=270).contains(&p.y), "{p:?}");
            }
        }
    }

    #[test]
    fn spacing_holds_when_space_allows() {
        let r = rules(512, 512, false);
        let mut rng = SmallRng::seed_from_u64(11);
        let placement = place(&mut rng, 6, &r);
        assert_eq!(placement.fallbacks, 0);
        let gap = i64::from(r.spacing());
        for (i, a) in placement.positions.iter().enumerate() {
            for b in &placement.positions[i + 1..] {
                assert!(a.distance_sq(*b) >= gap * gap);
            }
        }
    }

    #[test]
    fn crowded_canvas_falls_back_instead_of_failing() {
        let r = rules(60, 60, false);
        let mut rng = SmallRng::seed_from_u64(3);
        let placement = place(&mut rng, 4, &r);
        assert_eq!(placement.positions.len(), 4);
        // only one spot exists, every later object must fall back
        assert_eq!(placement.fallbacks, 3);
        assert!(placement.positions.iter().all(|p| *p == Position::new(30, 30)));
    }

    #[test]
    fn huge_min_distance_saturates() {
        let r = PlacementRules {
            min_distance: u32::MAX - 10,
            ..rules(512, 512, false)
        };
        assert_eq!(r.spacing(), u32::MAX);
        let placement = place(&mut SmallRng::seed_from_u64(5), 3, &r);
        assert_eq!(placement.positions.len(), 3);
        assert_eq!(placement.fallbacks, 2);
    }

    #[test]
    fn same_seed_same_layout() {
        let r = rules(512, 512, false);
        let a = place(&mut SmallRng::seed_from_u64(99), 10, &r);
        let b = place(&mut SmallRng::seed_from_u64(99), 10, &r);
        assert_eq!(a, b);
    }
}
