//! Shared helpers for integration tests
#![allow(dead_code)]

use modal_aero_core::core_types::ModeConstants;
use modal_aero_core::{AeroRegistry, ModeIndex, Phase, Prognostics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Log-uniform sample in `[lo, hi)`
pub fn log_uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    rng.random_range(lo.ln()..hi.ln()).exp()
}

pub fn mode_constants(registry: &AeroRegistry, mode: ModeIndex) -> ModeConstants {
    ModeConstants::derive(mode, registry.mode(mode))
}

/// Column with random mass in every member slot and numbers scattered far
/// on both sides of each mode's valid range. A few values are negative.
pub fn random_column(registry: &AeroRegistry, num_levels: usize, seed: u64) -> Prognostics {
    let mut rng = rng(seed);
    let mut column = Prognostics::new(num_levels);
    for k in 0..num_levels {
        for mode in ModeIndex::ALL {
            let c = mode_constants(registry, mode);
            let inv = registry.inverse_densities(mode);
            for phase in Phase::ALL {
                // leave some phases empty
                if rng.random_bool(0.15) {
                    continue;
                }
                let mut volume = 0.0;
                for slot in 0..registry.members(mode).len() {
                    let q = log_uniform(&mut rng, 1e-14, 1e-8);
                    volume += q * inv[slot];
                    column.set_mass(k, mode, phase, slot, q);
                }
                let ratio = log_uniform(&mut rng, c.v2n_min * 1e-3, c.v2n_max * 1e3);
                let sign = if rng.random_bool(0.05) { -1.0 } else { 1.0 };
                column.set_number(k, mode, phase, sign * ratio * volume);
            }
        }
    }
    column
}
