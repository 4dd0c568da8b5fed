//! Column containers for aerosol state
//!
//! State is stored level by level so that each vertical level is a disjoint
//! record that can be handed to a separate worker:
//!
//! - [`Prognostics`]: number and mass mixing ratios per mode and phase
//! - [`Tendencies`]: same shape as prognostics, holding rates of change
//! - [`Diagnostics`]: current diameter and volume-to-number ratio per mode and phase
//!
//! Mass slots follow the registry's member order for each mode; slots past a
//! mode's species count are unused and stay zero.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core_types::{ModeIndex, MAX_SPECIES_PER_MODE};

/// Aerosol phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Suspended directly in air
    Interstitial,
    /// Resident inside cloud droplets
    CloudBorne,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Interstitial, Phase::CloudBorne];
}

/// A value carried separately for the interstitial and cloud-borne phases
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Phases<T> {
    pub interstitial: T,
    pub cloud_borne: T,
}

impl<T> Phases<T> {
    pub const fn new(interstitial: T, cloud_borne: T) -> Self {
        Self {
            interstitial,
            cloud_borne,
        }
    }

    #[inline]
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Interstitial => &self.interstitial,
            Phase::CloudBorne => &self.cloud_borne,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, phase: Phase) -> &mut T {
        match phase {
            Phase::Interstitial => &mut self.interstitial,
            Phase::CloudBorne => &mut self.cloud_borne,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Phases<U> {
        Phases {
            interstitial: f(self.interstitial),
            cloud_borne: f(self.cloud_borne),
        }
    }
}

impl<T: Copy> Phases<T> {
    /// Same value for both phases
    pub const fn splat(value: T) -> Self {
        Self {
            interstitial: value,
            cloud_borne: value,
        }
    }
}

impl Phases<f64> {
    /// Interstitial plus cloud-borne
    #[inline]
    pub fn total(&self) -> f64 {
        self.interstitial + self.cloud_borne
    }
}

/// Mass mixing ratio per species slot
pub type SpeciesMass = [f64; MAX_SPECIES_PER_MODE];

/// Number and mass of one mode at one level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModeAerosol {
    pub number: Phases<f64>,
    pub mass: Phases<SpeciesMass>,
}

impl ModeAerosol {
    fn is_nonnegative(&self) -> bool {
        Phase::ALL.iter().all(|&phase| {
            *self.number.get(phase) >= 0.0 && self.mass.get(phase).iter().all(|&q| q >= 0.0)
        })
    }
}

/// All modes at one level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelAerosol {
    pub modes: [ModeAerosol; ModeIndex::COUNT],
}

impl LevelAerosol {
    #[inline]
    pub fn mode(&self, mode: ModeIndex) -> &ModeAerosol {
        &self.modes[mode.index()]
    }

    #[inline]
    pub fn mode_mut(&mut self, mode: ModeIndex) -> &mut ModeAerosol {
        &mut self.modes[mode.index()]
    }
}

/// Column of aerosol number and mass mixing ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prognostics {
    levels: Vec<LevelAerosol>,
}

/// Tendencies share the prognostic layout.
pub type Tendencies = Prognostics;

impl Prognostics {
    /// Create a zero-initialized column with `num_levels` levels
    #[must_use]
    pub fn new(num_levels: usize) -> Self {
        Self {
            levels: vec![LevelAerosol::default(); num_levels],
        }
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn levels(&self) -> &[LevelAerosol] {
        &self.levels
    }

    #[inline]
    pub fn levels_mut(&mut self) -> &mut [LevelAerosol] {
        &mut self.levels
    }

    /// # Panics
    ///
    /// Panics if `k` is out of range.
    #[inline]
    pub fn level(&self, k: usize) -> &LevelAerosol {
        &self.levels[k]
    }

    #[inline]
    pub fn level_mut(&mut self, k: usize) -> &mut LevelAerosol {
        &mut self.levels[k]
    }

    pub fn number(&self, k: usize, mode: ModeIndex, phase: Phase) -> f64 {
        *self.levels[k].mode(mode).number.get(phase)
    }

    pub fn set_number(&mut self, k: usize, mode: ModeIndex, phase: Phase, value: f64) {
        *self.levels[k].mode_mut(mode).number.get_mut(phase) = value;
    }

    pub fn mass(&self, k: usize, mode: ModeIndex, phase: Phase, slot: usize) -> f64 {
        self.levels[k].mode(mode).mass.get(phase)[slot]
    }

    pub fn set_mass(&mut self, k: usize, mode: ModeIndex, phase: Phase, slot: usize, value: f64) {
        self.levels[k].mode_mut(mode).mass.get_mut(phase)[slot] = value;
    }

    /// Reset every value to zero
    pub fn clear(&mut self) {
        self.levels.fill(LevelAerosol::default());
    }

    /// True iff every number and mass mixing ratio in the column is
    /// non-negative. Levels are checked in parallel.
    pub fn quantities_nonnegative(&self) -> bool {
        self.levels
            .par_iter()
            .all(|level| level.modes.iter().all(ModeAerosol::is_nonnegative))
    }
}

/// Current size of one mode at one level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModeSize {
    /// Geometric mean dry diameter (m)
    pub diameter: Phases<f64>,
    /// Volume-to-number ratio (1/m³)
    pub vol_to_num: Phases<f64>,
}

/// All mode sizes at one level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSize {
    pub modes: [ModeSize; ModeIndex::COUNT],
}

impl LevelSize {
    #[inline]
    pub fn mode(&self, mode: ModeIndex) -> &ModeSize {
        &self.modes[mode.index()]
    }

    #[inline]
    pub fn mode_mut(&mut self, mode: ModeIndex) -> &mut ModeSize {
        &mut self.modes[mode.index()]
    }
}

/// Column of diagnosed mode sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    levels: Vec<LevelSize>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(num_levels: usize) -> Self {
        Self {
            levels: vec![LevelSize::default(); num_levels],
        }
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn levels(&self) -> &[LevelSize] {
        &self.levels
    }

    #[inline]
    pub fn levels_mut(&mut self) -> &mut [LevelSize] {
        &mut self.levels
    }

    #[inline]
    pub fn level(&self, k: usize) -> &LevelSize {
        &self.levels[k]
    }

    pub fn diameter(&self, k: usize, mode: ModeIndex, phase: Phase) -> f64 {
        *self.levels[k].mode(mode).diameter.get(phase)
    }

    pub fn vol_to_num(&self, k: usize, mode: ModeIndex, phase: Phase) -> f64 {
        *self.levels[k].mode(mode).vol_to_num.get(phase)
    }
}
