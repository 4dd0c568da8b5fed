//! Error types for registry construction and process invocation
//!
//! The per-level numerics never fail; every edge case there is resolved by
//! the adjustment policy. Errors only arise when a registry is assembled
//! from bad parameters or when a step is requested with containers that do
//! not describe the same column.

use thiserror::Error;

use crate::core_types::{AeroId, ModeIndex};

/// Invalid mode/species configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("species {species:?} density must be finite and positive, got {density}")]
    NonPositiveDensity { species: AeroId, density: f64 },

    #[error(
        "mode {mode:?} diameters must satisfy 0 < min <= nominal <= max, got min={min:e} nominal={nominal:e} max={max:e}"
    )]
    DegenerateDiameterRange {
        mode: ModeIndex,
        min: f64,
        nominal: f64,
        max: f64,
    },

    #[error("mode {mode:?} geometric standard deviation must be finite and >= 1, got {sigma}")]
    InvalidStdDev { mode: ModeIndex, sigma: f64 },

    #[error("mode {mode:?} lists {count} species, at most {limit} are supported")]
    TooManySpecies {
        mode: ModeIndex,
        count: usize,
        limit: usize,
    },

    #[error("mode {mode:?} lists species {species:?} more than once")]
    DuplicateSpecies { mode: ModeIndex, species: AeroId },

    #[error("mode {mode:?} has no member species")]
    EmptyMode { mode: ModeIndex },

    #[error("Aitken species {species:?} has no Accumulation slot to grow into")]
    UnpairedAitkenSpecies { species: AeroId },
}

/// Invalid arguments to a size calculation step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcSizeError {
    #[error("time step must be finite and positive, got {dt}")]
    InvalidTimeStep { dt: f64 },

    #[error("{container} has {actual} levels, prognostics have {expected}")]
    LevelCountMismatch {
        container: &'static str,
        expected: usize,
        actual: usize,
    },
}
