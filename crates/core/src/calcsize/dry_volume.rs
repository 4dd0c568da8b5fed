//! Dry volume of a mode from species mass
//!
//! Dry volume per unit mass of air is the sum over member species of
//! `max(q, 0) / ρ`. Negative mass (numerical noise from upstream transport)
//! contributes nothing.

use crate::column::{ModeAerosol, Phases, SpeciesMass};

/// Clipped specific volume sum for one phase
#[inline]
fn phase_volume(inv_density: &[f64], mass: &SpeciesMass) -> f64 {
    inv_density
        .iter()
        .zip(mass)
        .map(|(inv, &q)| q.max(0.0) * inv)
        .sum()
}

/// Dry volume of each phase of a mode.
///
/// # Arguments
/// * `inv_density` - Specific volume (1/ρ) per species slot, zero past the mode's species count
/// * `aerosol` - Number and mass of the mode at one level
///
/// # Returns
/// Interstitial and cloud-borne dry volume, both non-negative
pub fn dry_volume(inv_density: &[f64], aerosol: &ModeAerosol) -> Phases<f64> {
    Phases::new(
        phase_volume(inv_density, &aerosol.mass.interstitial),
        phase_volume(inv_density, &aerosol.mass.cloud_borne),
    )
}

/// Dry volume restricted to the slots selected by `mask`.
pub fn dry_volume_of(inv_density: &[f64], mask: &[bool], aerosol: &ModeAerosol) -> Phases<f64> {
    aerosol.mass.map(|mass| {
        inv_density
            .iter()
            .zip(mask)
            .zip(mass)
            .map(|((inv, selected), q)| if *selected { q.max(0.0) * inv } else { 0.0 })
            .sum()
    })
}
