//! Procedural terrain
//!
//! Several gradient-noise octaves are summed into a height function over the
//! unit square. The same function drives both the render mesh and the
//! gameplay height queries, so the two always agree.

pub mod mesh;
pub mod noise;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mesh::{TerrainMesh, TerrainVertex};
pub use noise::{NoiseField, fade};

/// Smallest lattice that can be sampled over `[0, 1]` (`evaluate` runs at `u·(F−2)`)
pub const MIN_OCTAVE_FREQUENCY: u32 = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("octave frequency {frequency} is below the minimum of 2")]
    FrequencyTooLow { frequency: u32 },
    #[error("terrain needs at least one division per axis")]
    ZeroResolution,
}

/// One noise layer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// Gradient lattice size per axis
    pub frequency: u32,
    /// Height contribution scale
    pub amplitude: f32,
}

impl Octave {
    pub const fn new(frequency: u32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Sum of noise octaves over normalized coordinates
#[derive(Debug, Clone)]
pub struct HeightField {
    layers: Vec<(NoiseField, f32)>,
}

impl HeightField {
    /// Draw one gradient lattice per octave from `rng`, in octave order
    pub fn new<R: Rng>(octaves: &[Octave], rng: &mut R) -> Result<Self, TerrainError> {
        let mut layers = Vec::with_capacity(octaves.len());
        for octave in octaves {
            if octave.frequency < MIN_OCTAVE_FREQUENCY {
                return Err(TerrainError::FrequencyTooLow {
                    frequency: octave.frequency,
                });
            }
            layers.push((NoiseField::new(octave.frequency, rng), octave.amplitude));
        }
        Ok(Self { layers })
    }

    /// Unscaled height at (u, v) in `[0, 1]²`.
    ///
    /// Callers outside the unit square must not call this; see
    /// [`crate::sim::World::height_at_coordinates`] for the checked query.
    pub fn height_at(&self, u: f32, v: f32) -> f32 {
        self.layers
            .iter()
            .map(|(field, amplitude)| {
                let extent = (field.frequency() - 2) as f32;
                field.evaluate(u * extent, v * extent) * amplitude
            })
            .sum()
    }

    /// Upper bound on |height| (each octave contributes at most its amplitude)
    pub fn amplitude_bound(&self) -> f32 {
        self.layers.iter().map(|(_, a)| a.abs()).sum()
    }

    pub fn octave_count(&self) -> usize {
        self.layers.len()
    }
}
