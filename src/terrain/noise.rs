//! Classic 2D gradient noise over a fixed random gradient lattice

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Quintic smoothstep `t³(t(6t − 15) + 10)`
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// One noise layer: a `frequency × frequency` lattice of unit gradients.
///
/// The lattice is drawn once at construction and never changes, so
/// `evaluate` is a pure function of its coordinates.
#[derive(Debug, Clone)]
pub struct NoiseField {
    frequency: u32,
    /// Row-major, indexed `[y * frequency + x]`
    grid: Vec<Vec2>,
}

impl NoiseField {
    pub fn new<R: Rng>(frequency: u32, rng: &mut R) -> Self {
        let cells = (frequency as usize) * (frequency as usize);
        let grid = (0..cells)
            .map(|_| {
                let angle: f32 = rng.random_range(0.0..TAU);
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { frequency, grid }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Gradient at lattice point (ix, iy).
    ///
    /// # Panics
    /// If the point lies outside the lattice. No wrapping is done, so callers
    /// must keep `evaluate` coordinates within `[0, frequency - 1)`.
    #[inline]
    pub fn gradient(&self, ix: usize, iy: usize) -> Vec2 {
        let f = self.frequency as usize;
        assert!(ix < f && iy < f, "lattice point ({ix}, {iy}) outside {f}x{f} grid");
        self.grid[iy * f + ix]
    }

    fn dot_grid_gradient(&self, ix: usize, iy: usize, x: f32, y: f32) -> f32 {
        let offset = Vec2::new(x - ix as f32, y - iy as f32);
        offset.dot(self.gradient(ix, iy))
    }

    /// Smoothed noise at (x, y); zero at every lattice point
    pub fn evaluate(&self, x: f32, y: f32) -> f32 {
        let x0f = x.floor();
        let y0f = y.floor();
        assert!(
            x0f >= 0.0 && y0f >= 0.0,
            "noise sampled at negative coordinate ({x}, {y})"
        );
        let (x0, y0) = (x0f as usize, y0f as usize);
        let (x1, y1) = (x0 + 1, y0 + 1);

        let u = fade(x - x0f);
        let v = fade(y - y0f);

        let top = crate::lerp(
            self.dot_grid_gradient(x0, y0, x, y),
            self.dot_grid_gradient(x1, y0, x, y),
            u,
        );
        let bottom = crate::lerp(
            self.dot_grid_gradient(x0, y1, x, y),
            self.dot_grid_gradient(x1, y1, x, y),
            u,
        );
        crate::lerp(top, bottom, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field(seed: u64, frequency: u32) -> NoiseField {
        NoiseField::new(frequency, &mut Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_gradients_are_unit_length() {
        let f = field(7, 8);
        for iy in 0..8 {
            for ix in 0..8 {
                assert!((f.gradient(ix, iy).length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let f = field(11, 8);
        for i in 0..6 {
            assert!(f.evaluate(i as f32, (5 - i) as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = field(1234, 16);
        let b = field(1234, 16);
        for k in 0..50 {
            let x = k as f32 * 0.27;
            let y = k as f32 * 0.13;
            assert_eq!(a.evaluate(x, y), b.evaluate(x, y));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = field(1, 8);
        let b = field(2, 8);
        let differs = (0..20).any(|k| {
            let p = 0.5 + k as f32 * 0.3;
            a.evaluate(p, p * 0.7) != b.evaluate(p, p * 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_bounded_output() {
        let f = field(99, 8);
        for j in 0..60 {
            for i in 0..60 {
                let n = f.evaluate(i as f32 * 0.1, j as f32 * 0.1);
                assert!(n.abs() <= 1.0, "noise {n} out of range");
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_out_of_lattice_panics() {
        let f = field(3, 4);
        f.evaluate(3.5, 0.5);
    }
}
