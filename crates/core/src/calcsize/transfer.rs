//! Aitken/Accumulation mode transfer
//!
//! Particles that grow past the boundary between the Aitken and Accumulation
//! modes are relabelled into the Accumulation mode, and Accumulation particles
//! that shrink below it are relabelled into the Aitken mode. The boundary is
//! the geometric mean of the two modes' nominal volume-to-number ratios.
//!
//! # Physics
//!
//! With combined (interstitial + cloud-borne) volume `V` and number `N` of the
//! source mode, the ratio `N/V` is compared against the boundary `r_geo`:
//!
//! - Aitken → Accumulation when `N/V < r_geo` (mean size too large)
//! - Accumulation → Aitken when `N/V > r_geo` (mean size too small)
//!
//! Past the destination's nominal ratio everything moves. Between the two
//! ratios the volume fraction is linear in `N/V` and the number fraction
//! follows from it:
//!
//! ```text
//! f_vol = (N/V - r_geo) / (r_dest - r_geo)
//! f_num = f_vol × (V/N) × r_dest
//! ```
//!
//! Moved quantities are relaxed over the same time scale as the number
//! adjustment, so the rate coefficient is `f × adj_tscale_inv`.
//!
//! Accumulation species with no Aitken counterpart never move. Their volume
//! (and the number it carries at the Accumulation nominal ratio) is taken out
//! of the Accumulation totals before the comparison.

use serde::{Deserialize, Serialize};

use super::diameter::{update_diameter_and_vol2num, SizeBounds};
use super::dry_volume::dry_volume_of;
use crate::column::{LevelAerosol, LevelSize, Phase, Phases};
use crate::core_types::{AeroRegistry, ModeConstants, ModeIndex, MAX_SPECIES_PER_MODE};

/// Dry volume and number of one mode captured after number adjustment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeSnapshot {
    pub dry_volume: Phases<f64>,
    pub number: Phases<f64>,
    /// Dry volume of species that may not leave the mode
    pub fixed_volume: Phases<f64>,
}

/// Nominal ratios that define the transfer boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferThresholds {
    /// Aitken nominal volume-to-number ratio
    pub aitken_nominal: f64,
    /// Accumulation nominal volume-to-number ratio
    pub accumulation_nominal: f64,
    /// Geometric mean of the two nominal ratios
    pub geomean: f64,
}

impl TransferThresholds {
    pub fn new(v2n_nom_ait: f64, v2n_nom_acc: f64) -> Self {
        Self {
            aitken_nominal: v2n_nom_ait,
            accumulation_nominal: v2n_nom_acc,
            geomean: (v2n_nom_ait * v2n_nom_acc).sqrt(),
        }
    }
}

/// Fractions of the source mode's number and volume to move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferFractions {
    pub number: f64,
    pub volume: f64,
}

impl TransferFractions {
    const ALL: Self = Self {
        number: 1.0,
        volume: 1.0,
    };

    /// A non-positive fraction means nothing moves; a fraction of one or
    /// more moves everything.
    fn bounded(number: f64, volume: f64) -> Option<Self> {
        if number <= 0.0 || volume <= 0.0 {
            None
        } else if number >= 1.0 || volume >= 1.0 {
            Some(Self::ALL)
        } else {
            Some(Self { number, volume })
        }
    }
}

/// Fractions for Aitken → Accumulation given the Aitken totals.
pub fn ait_to_acc_fractions(
    drv_total: f64,
    num_total: f64,
    thresholds: &TransferThresholds,
) -> Option<TransferFractions> {
    let geo = thresholds.geomean;
    let dest = thresholds.accumulation_nominal;
    if drv_total <= 0.0 || num_total >= drv_total * geo {
        return None;
    }
    if num_total < drv_total * dest {
        return Some(TransferFractions::ALL);
    }
    let volume = (num_total / drv_total - geo) / (dest - geo);
    let number = volume * (drv_total / num_total) * dest;
    TransferFractions::bounded(number, volume)
}

/// Fractions for Accumulation → Aitken given the Accumulation totals and
/// the part of the volume that cannot move.
///
/// The number fraction is rescaled so that it applies to the whole
/// Accumulation number, including particles carrying fixed species.
pub fn acc_to_ait_fractions(
    drv_total: f64,
    num_total: f64,
    drv_fixed: f64,
    thresholds: &TransferThresholds,
) -> Option<TransferFractions> {
    let geo = thresholds.geomean;
    let dest = thresholds.aitken_nominal;

    let num_all = num_total;
    let drv = (drv_total - drv_fixed).max(0.0);
    let num = (num_total - drv_fixed * thresholds.accumulation_nominal).max(0.0);

    if drv <= 0.0 || num <= drv * geo {
        return None;
    }
    let fractions = if num > drv * dest {
        TransferFractions::ALL
    } else {
        let volume = (num / drv - geo) / (dest - geo);
        let number = volume * (drv / num) * dest;
        TransferFractions::bounded(number, volume)?
    };
    Some(TransferFractions {
        number: fractions.number * (num / num_all),
        volume: fractions.volume,
    })
}

/// Species slot in the source mode paired with its slot in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPair {
    pub from: usize,
    pub to: usize,
}

/// Which directions moved material at one level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferOutcome {
    pub ait_to_acc: Option<TransferFractions>,
    pub acc_to_ait: Option<TransferFractions>,
}

impl TransferOutcome {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ait_to_acc.is_some() || self.acc_to_ait.is_some()
    }
}

/// Per-level inputs to [`ModeTransferEngine::exchange`]
#[derive(Debug, Clone, Copy)]
pub struct ExchangeInputs {
    pub aitken: ModeSnapshot,
    pub accumulation: ModeSnapshot,
    pub adj_tscale_inv: f64,
    pub dt: f64,
}

/// Change in number and dry volume of one mode caused by the transfer
#[derive(Debug, Clone, Copy, Default)]
struct ModeDelta {
    number: Phases<f64>,
    volume: Phases<f64>,
}

/// Moves number and mass between the Aitken and Accumulation modes.
///
/// Built once from the registry; holds the species pairing between the two
/// modes and the unmodified size bounds used to re-diagnose both modes after
/// a transfer.
#[derive(Debug, Clone)]
pub struct ModeTransferEngine {
    thresholds: TransferThresholds,
    aitken_bounds: SizeBounds,
    accumulation_bounds: SizeBounds,
    ait_to_acc_pairs: Vec<SlotPair>,
    acc_to_ait_pairs: Vec<SlotPair>,
    aitken_inv_density: [f64; MAX_SPECIES_PER_MODE],
    accumulation_inv_density: [f64; MAX_SPECIES_PER_MODE],
    fixed_mask: [bool; MAX_SPECIES_PER_MODE],
}

impl ModeTransferEngine {
    pub fn new(registry: &AeroRegistry, constants: &[ModeConstants; ModeIndex::COUNT]) -> Self {
        let ait = ModeIndex::Aitken;
        let acc = ModeIndex::Accumulation;
        let no_transfer = registry.no_transfer_acc2ait();

        let ait_to_acc_pairs = registry
            .members(ait)
            .iter()
            .enumerate()
            .filter_map(|(from, &id)| registry.species_slot(acc, id).map(|to| SlotPair { from, to }))
            .collect();

        // species with no Aitken slot are fixed regardless of the configured set
        let mut fixed_mask = [false; MAX_SPECIES_PER_MODE];
        for (slot, &id) in registry.members(acc).iter().enumerate() {
            fixed_mask[slot] = no_transfer.contains(&id) || registry.species_slot(ait, id).is_none();
        }

        let acc_to_ait_pairs = registry
            .members(acc)
            .iter()
            .enumerate()
            .filter(|&(from, _)| !fixed_mask[from])
            .filter_map(|(from, &id)| registry.species_slot(ait, id).map(|to| SlotPair { from, to }))
            .collect();

        Self {
            thresholds: TransferThresholds::new(
                constants[ait.index()].v2n_nom,
                constants[acc.index()].v2n_nom,
            ),
            aitken_bounds: SizeBounds::of(&constants[ait.index()]),
            accumulation_bounds: SizeBounds::of(&constants[acc.index()]),
            ait_to_acc_pairs,
            acc_to_ait_pairs,
            aitken_inv_density: registry.inverse_densities(ait),
            accumulation_inv_density: registry.inverse_densities(acc),
            fixed_mask,
        }
    }

    #[inline]
    pub fn thresholds(&self) -> &TransferThresholds {
        &self.thresholds
    }

    /// Dry volume of the Accumulation species that may not move to Aitken:
    /// the configured no-transfer set plus any species with no Aitken slot
    pub fn fixed_volume(&self, level: &LevelAerosol) -> Phases<f64> {
        dry_volume_of(
            &self.accumulation_inv_density,
            &self.fixed_mask,
            level.mode(ModeIndex::Accumulation),
        )
    }

    /// Transfer between the two modes at one level.
    ///
    /// Number and mass tendencies are added to `tendencies`; when anything
    /// moves, the diagnosed sizes of both modes are recomputed from the
    /// post-transfer number and volume.
    pub fn exchange(
        &self,
        inputs: &ExchangeInputs,
        prognostics: &LevelAerosol,
        tendencies: &mut LevelAerosol,
        sizes: &mut LevelSize,
    ) -> TransferOutcome {
        let ait = &inputs.aitken;
        let acc = &inputs.accumulation;

        let outcome = TransferOutcome {
            ait_to_acc: ait_to_acc_fractions(
                ait.dry_volume.total(),
                ait.number.total(),
                &self.thresholds,
            ),
            acc_to_ait: acc_to_ait_fractions(
                acc.dry_volume.total(),
                acc.number.total(),
                acc.fixed_volume.total(),
                &self.thresholds,
            ),
        };
        if !outcome.is_active() {
            return outcome;
        }

        let mut ait_delta = ModeDelta::default();
        let mut acc_delta = ModeDelta::default();

        if let Some(fractions) = outcome.ait_to_acc {
            Self::move_material(
                Route {
                    from: ModeIndex::Aitken,
                    to: ModeIndex::Accumulation,
                    source_number: ait.number,
                    pairs: &self.ait_to_acc_pairs,
                    inv_density: &self.aitken_inv_density,
                },
                fractions,
                inputs,
                prognostics,
                tendencies,
                (&mut ait_delta, &mut acc_delta),
            );
        }
        if let Some(fractions) = outcome.acc_to_ait {
            Self::move_material(
                Route {
                    from: ModeIndex::Accumulation,
                    to: ModeIndex::Aitken,
                    source_number: acc.number,
                    pairs: &self.acc_to_ait_pairs,
                    inv_density: &self.accumulation_inv_density,
                },
                fractions,
                inputs,
                prognostics,
                tendencies,
                (&mut acc_delta, &mut ait_delta),
            );
        }

        for (mode, snapshot, delta, bounds) in [
            (ModeIndex::Aitken, ait, &ait_delta, &self.aitken_bounds),
            (ModeIndex::Accumulation, acc, &acc_delta, &self.accumulation_bounds),
        ] {
            let size = sizes.mode_mut(mode);
            for phase in Phase::ALL {
                let num = (snapshot.number.get(phase) + inputs.dt * delta.number.get(phase)).max(0.0);
                let drv =
                    (snapshot.dry_volume.get(phase) + inputs.dt * delta.volume.get(phase)).max(0.0);
                update_diameter_and_vol2num(drv, num, bounds, size, phase);
            }
        }

        outcome
    }

    /// Apply one direction's number and mass tendencies and record the
    /// resulting rates of change of number and volume.
    fn move_material(
        route: Route<'_>,
        fractions: TransferFractions,
        inputs: &ExchangeInputs,
        prognostics: &LevelAerosol,
        tendencies: &mut LevelAerosol,
        (source_delta, dest_delta): (&mut ModeDelta, &mut ModeDelta),
    ) {
        let coef_num = fractions.number * inputs.adj_tscale_inv;
        let coef_vol = fractions.volume * inputs.adj_tscale_inv;
        for phase in Phase::ALL {
            let dn = route.source_number.get(phase) * coef_num;
            *tendencies.mode_mut(route.from).number.get_mut(phase) -= dn;
            *tendencies.mode_mut(route.to).number.get_mut(phase) += dn;
            *source_delta.number.get_mut(phase) -= dn;
            *dest_delta.number.get_mut(phase) += dn;

            let source_mass = prognostics.mode(route.from).mass.get(phase);
            let mut dv = 0.0;
            for pair in route.pairs {
                let dq = source_mass[pair.from].max(0.0) * coef_vol;
                tendencies.mode_mut(route.from).mass.get_mut(phase)[pair.from] -= dq;
                tendencies.mode_mut(route.to).mass.get_mut(phase)[pair.to] += dq;
                dv += dq * route.inv_density[pair.from];
            }
            *source_delta.volume.get_mut(phase) -= dv;
            *dest_delta.volume.get_mut(phase) += dv;
        }
    }
}

/// Source, destination and species pairing of one transfer direction
#[derive(Clone, Copy)]
struct Route<'a> {
    from: ModeIndex,
    to: ModeIndex,
    source_number: Phases<f64>,
    pairs: &'a [SlotPair],
    inv_density: &'a [f64; MAX_SPECIES_PER_MODE],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calcsize::dry_volume::dry_volume;
    use crate::column::ModeSize;
    use crate::core_types::AeroId;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn toy_thresholds() -> TransferThresholds {
        // geometric mean of 100 and 1 is 10
        TransferThresholds::new(100.0, 1.0)
    }

    #[test]
    fn geomean_threshold() {
        assert_relative_eq!(toy_thresholds().geomean, 10.0, max_relative = 1e-15);
    }

    #[test]
    fn aitken_growth_fractions() {
        let th = toy_thresholds();
        assert_eq!(ait_to_acc_fractions(1.0, 0.5, &th), Some(TransferFractions::ALL));
        assert_eq!(ait_to_acc_fractions(1.0, 20.0, &th), None);
        assert_eq!(ait_to_acc_fractions(0.0, 0.5, &th), None);

        let f = ait_to_acc_fractions(1.0, 5.0, &th).expect("partial transfer");
        assert_relative_eq!(f.volume, 5.0 / 9.0, max_relative = 1e-12);
        assert_relative_eq!(f.number, 1.0 / 9.0, max_relative = 1e-12);
    }

    #[test]
    fn accumulation_shrink_fractions() {
        let th = toy_thresholds();
        assert_eq!(acc_to_ait_fractions(1.0, 5.0, 0.0, &th), None);
        assert_eq!(acc_to_ait_fractions(1.0, 200.0, 0.0, &th), Some(TransferFractions::ALL));

        let f = acc_to_ait_fractions(1.0, 20.0, 0.0, &th).expect("partial transfer");
        assert_relative_eq!(f.volume, 1.0 / 9.0, max_relative = 1e-12);
        assert_relative_eq!(f.number, 5.0 / 9.0, max_relative = 1e-12);
    }

    #[test]
    fn fixed_species_are_removed_before_comparison() {
        let th = toy_thresholds();
        // 1 unit of fixed volume carries 1 unit of number at the Accumulation nominal ratio
        let f = acc_to_ait_fractions(2.0, 20.0, 1.0, &th).expect("partial transfer");
        assert_relative_eq!(f.volume, 0.1, max_relative = 1e-12);
        // 10/19 of the movable number, rescaled to the whole mode
        assert_relative_eq!(f.number, 0.5, max_relative = 1e-12);

        // everything fixed: nothing can move
        assert_eq!(acc_to_ait_fractions(2.0, 2000.0, 2.0, &th), None);
    }

    fn mam4_engine() -> (AeroRegistry, ModeTransferEngine) {
        let registry = AeroRegistry::mam4();
        let constants = ModeIndex::ALL.map(|m| ModeConstants::derive(m, registry.mode(m)));
        let engine = ModeTransferEngine::new(&registry, &constants);
        (registry, engine)
    }

    fn snapshot(
        registry: &AeroRegistry,
        engine: &ModeTransferEngine,
        level: &LevelAerosol,
        mode: ModeIndex,
    ) -> ModeSnapshot {
        let aerosol = level.mode(mode);
        ModeSnapshot {
            dry_volume: dry_volume(&registry.inverse_densities(mode), aerosol),
            number: aerosol.number,
            fixed_volume: if mode == ModeIndex::Accumulation {
                engine.fixed_volume(level)
            } else {
                Phases::default()
            },
        }
    }

    #[test]
    fn small_accumulation_particles_move_to_aitken() {
        let (registry, engine) = mam4_engine();
        let acc = ModeIndex::Accumulation;
        let so4 = registry.species_slot(acc, AeroId::So4).expect("member");
        let bc = registry.species_slot(acc, AeroId::Bc).expect("member");

        let mut level = LevelAerosol::default();
        level.mode_mut(acc).mass.interstitial[so4] = 1e-9;
        level.mode_mut(acc).mass.interstitial[bc] = 1e-11;
        level.mode_mut(acc).mass.cloud_borne[so4] = 5e-10;
        let drv = dry_volume(&registry.inverse_densities(acc), level.mode(acc));
        let ratio = 2.0 * engine.thresholds().aitken_nominal;
        level.mode_mut(acc).number = drv.map(|v| v * ratio);

        let inputs = ExchangeInputs {
            aitken: snapshot(&registry, &engine, &level, ModeIndex::Aitken),
            accumulation: snapshot(&registry, &engine, &level, acc),
            adj_tscale_inv: 1.0 / 86_400.0,
            dt: 3600.0,
        };
        let mut tendencies = LevelAerosol::default();
        let mut sizes = LevelSize::default();
        let outcome = engine.exchange(&inputs, &level, &mut tendencies, &mut sizes);

        assert!(outcome.acc_to_ait.is_some());
        assert!(outcome.ait_to_acc.is_none());

        for phase in Phase::ALL {
            let n_acc = *tendencies.mode(acc).number.get(phase);
            let n_ait = *tendencies.mode(ModeIndex::Aitken).number.get(phase);
            assert!(n_acc <= 0.0, "{phase:?}: {n_acc}");
            assert_abs_diff_eq!(n_acc + n_ait, 0.0, epsilon = 1e-12 * n_ait.abs().max(1.0));
        }

        let ait_so4 = registry
            .species_slot(ModeIndex::Aitken, AeroId::So4)
            .expect("member");
        let moved = tendencies.mode(acc).mass.interstitial[so4];
        assert!(moved < 0.0);
        assert_relative_eq!(
            tendencies.mode(ModeIndex::Aitken).mass.interstitial[ait_so4],
            -moved,
            max_relative = 1e-15
        );
        assert_eq!(tendencies.mode(acc).mass.interstitial[bc], 0.0);

        // both modes were re-diagnosed
        assert!(sizes.mode(ModeIndex::Aitken).diameter.interstitial > 0.0);
        assert!(sizes.mode(acc).diameter.interstitial > 0.0);
    }

    #[test]
    fn opposite_transfers_at_one_level_combine() {
        let (registry, engine) = mam4_engine();
        let (ait, acc) = (ModeIndex::Aitken, ModeIndex::Accumulation);
        let so4_ait = registry.species_slot(ait, AeroId::So4).expect("member");
        let so4_acc = registry.species_slot(acc, AeroId::So4).expect("member");
        let th = *engine.thresholds();

        // Aitken particles past the Accumulation nominal size, Accumulation
        // particles below the Aitken nominal size
        let mut level = LevelAerosol::default();
        level.mode_mut(ait).mass.interstitial[so4_ait] = 1e-9;
        level.mode_mut(acc).mass.interstitial[so4_acc] = 4e-10;
        let v_ait = dry_volume(&registry.inverse_densities(ait), level.mode(ait)).interstitial;
        let v_acc = dry_volume(&registry.inverse_densities(acc), level.mode(acc)).interstitial;
        let n_ait = 0.5 * th.accumulation_nominal * v_ait;
        let n_acc = 2.0 * th.aitken_nominal * v_acc;
        level.mode_mut(ait).number.interstitial = n_ait;
        level.mode_mut(acc).number.interstitial = n_acc;

        let rate = 1.0 / 86_400.0;
        let dt = 3600.0;
        let inputs = ExchangeInputs {
            aitken: snapshot(&registry, &engine, &level, ait),
            accumulation: snapshot(&registry, &engine, &level, acc),
            adj_tscale_inv: rate,
            dt,
        };
        let mut tendencies = LevelAerosol::default();
        let mut sizes = LevelSize::default();
        let outcome = engine.exchange(&inputs, &level, &mut tendencies, &mut sizes);

        assert_eq!(outcome.ait_to_acc, Some(TransferFractions::ALL));
        assert_eq!(outcome.acc_to_ait, Some(TransferFractions::ALL));

        let dn_ait = tendencies.mode(ait).number.interstitial;
        let dn_acc = tendencies.mode(acc).number.interstitial;
        assert_relative_eq!(dn_ait, (n_acc - n_ait) * rate, max_relative = 1e-12);
        assert_abs_diff_eq!(dn_ait + dn_acc, 0.0, epsilon = 1e-12 * dn_ait.abs());
        assert_relative_eq!(
            tendencies.mode(ait).mass.interstitial[so4_ait],
            (4e-10 - 1e-9) * rate,
            max_relative = 1e-12
        );

        // sizes are diagnosed from both contributions together
        for (mode, bounds, num, drv) in [
            (
                ait,
                &engine.aitken_bounds,
                n_ait + dt * rate * (n_acc - n_ait),
                v_ait + dt * rate * (v_acc - v_ait),
            ),
            (
                acc,
                &engine.accumulation_bounds,
                n_acc + dt * rate * (n_ait - n_acc),
                v_acc + dt * rate * (v_ait - v_acc),
            ),
        ] {
            let mut expected = ModeSize::default();
            update_diameter_and_vol2num(drv, num, bounds, &mut expected, Phase::Interstitial);
            assert_relative_eq!(
                sizes.mode(mode).vol_to_num.interstitial,
                expected.vol_to_num.interstitial,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                sizes.mode(mode).diameter.interstitial,
                expected.diameter.interstitial,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn in_range_modes_do_not_move() {
        let (registry, engine) = mam4_engine();
        let mut level = LevelAerosol::default();
        for mode in [ModeIndex::Aitken, ModeIndex::Accumulation] {
            level.mode_mut(mode).mass.interstitial[0] = 1e-10;
            let drv = dry_volume(&registry.inverse_densities(mode), level.mode(mode));
            let nominal = ModeConstants::derive(mode, registry.mode(mode)).v2n_nom;
            level.mode_mut(mode).number = drv.map(|v| v * nominal);
        }
        let inputs = ExchangeInputs {
            aitken: snapshot(&registry, &engine, &level, ModeIndex::Aitken),
            accumulation: snapshot(&registry, &engine, &level, ModeIndex::Accumulation),
            adj_tscale_inv: 1.0 / 86_400.0,
            dt: 1800.0,
        };
        let mut tendencies = LevelAerosol::default();
        let mut sizes = LevelSize::default();
        let outcome = engine.exchange(&inputs, &level, &mut tendencies, &mut sizes);
        assert!(!outcome.is_active());
        assert_eq!(tendencies, LevelAerosol::default());
        assert_eq!(sizes, LevelSize::default());
    }
}
