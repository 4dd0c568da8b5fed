//! Immutable mode/species registry
//!
//! The registry is built once per column at configuration time and then
//! shared read-only by every component (and every worker thread). It holds
//! the per-mode size parameters, per-species densities, the ordered species
//! membership of each mode, and the set of species that are never moved from
//! the accumulation mode into the Aitken mode.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::mode::{AeroMode, ModeIndex};
use super::species::{AeroId, AeroSpecies};
use crate::error::RegistryError;

/// Upper bound on member species per mode
pub const MAX_SPECIES_PER_MODE: usize = 7;

/// Mode and species configuration for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroRegistry {
    modes: [AeroMode; ModeIndex::COUNT],
    species: [AeroSpecies; AeroId::COUNT],
    members: [Vec<AeroId>; ModeIndex::COUNT],
    no_transfer_acc2ait: FxHashSet<AeroId>,
}

impl AeroRegistry {
    /// The MAM4 four-mode configuration.
    pub fn mam4() -> Self {
        let members = mam4_members();
        let no_transfer_acc2ait = default_no_transfer(&members);
        Self {
            modes: ModeIndex::ALL.map(AeroMode::mam4),
            species: AeroId::ALL.map(AeroSpecies::mam4),
            members,
            no_transfer_acc2ait,
        }
    }

    /// Start a registry from the MAM4 defaults and override pieces of it.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[inline]
    pub fn mode(&self, mode: ModeIndex) -> &AeroMode {
        &self.modes[mode.index()]
    }

    #[inline]
    pub fn species(&self, id: AeroId) -> &AeroSpecies {
        &self.species[id.index()]
    }

    /// Member species of `mode`, in slot order
    #[inline]
    pub fn members(&self, mode: ModeIndex) -> &[AeroId] {
        &self.members[mode.index()]
    }

    /// Slot of species `id` within `mode`, if it is a member
    pub fn species_slot(&self, mode: ModeIndex, id: AeroId) -> Option<usize> {
        self.members(mode).iter().position(|&member| member == id)
    }

    /// Species excluded from accumulation to Aitken transfer
    pub fn no_transfer_acc2ait(&self) -> &FxHashSet<AeroId> {
        &self.no_transfer_acc2ait
    }

    /// Specific volume (1/density) for each slot of `mode`; unused slots are zero.
    pub fn inverse_densities(&self, mode: ModeIndex) -> [f64; MAX_SPECIES_PER_MODE] {
        let mut inv = [0.0; MAX_SPECIES_PER_MODE];
        for (slot, &id) in self.members(mode).iter().enumerate() {
            inv[slot] = self.species(id).inverse_density();
        }
        inv
    }
}

impl Default for AeroRegistry {
    fn default() -> Self {
        Self::mam4()
    }
}

fn mam4_members() -> [Vec<AeroId>; ModeIndex::COUNT] {
    use AeroId::{Bc, Dst, Mom, NaCl, Pom, So4, Soa};
    [
        vec![So4, Pom, Soa, Bc, Dst, NaCl, Mom],
        vec![So4, Soa, NaCl, Mom],
        vec![Dst, NaCl, So4, Bc, Pom, Soa, Mom],
        vec![Pom, Bc, Mom],
    ]
}

/// Accumulation species with no Aitken counterpart cannot be moved there.
fn default_no_transfer(members: &[Vec<AeroId>; ModeIndex::COUNT]) -> FxHashSet<AeroId> {
    let aitken = &members[ModeIndex::Aitken.index()];
    members[ModeIndex::Accumulation.index()]
        .iter()
        .copied()
        .filter(|id| !aitken.contains(id))
        .collect()
}

/// Builder that validates a registry before handing it out.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    modes: [AeroMode; ModeIndex::COUNT],
    species: [AeroSpecies; AeroId::COUNT],
    members: [Vec<AeroId>; ModeIndex::COUNT],
    no_transfer_acc2ait: Option<FxHashSet<AeroId>>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            modes: ModeIndex::ALL.map(AeroMode::mam4),
            species: AeroId::ALL.map(AeroSpecies::mam4),
            members: mam4_members(),
            no_transfer_acc2ait: None,
        }
    }
}

impl RegistryBuilder {
    pub fn mode(mut self, mode: ModeIndex, params: AeroMode) -> Self {
        self.modes[mode.index()] = params;
        self
    }

    pub fn species(mut self, species: AeroSpecies) -> Self {
        self.species[species.id.index()] = species;
        self
    }

    pub fn members(mut self, mode: ModeIndex, members: Vec<AeroId>) -> Self {
        self.members[mode.index()] = members;
        self
    }

    /// Override the species excluded from accumulation to Aitken transfer.
    ///
    /// When never called, the set defaults to every accumulation species that
    /// is not a member of the Aitken mode. Species without an Aitken slot are
    /// held back by the transfer even when left out of an explicit set.
    pub fn no_transfer_acc2ait(mut self, species: impl IntoIterator<Item = AeroId>) -> Self {
        self.no_transfer_acc2ait = Some(species.into_iter().collect());
        self
    }

    /// Validate and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when a density is not positive, a mode's
    /// diameters are not ordered `0 < min <= nominal <= max`, a standard
    /// deviation is below one, a mode's member list is empty, too long,
    /// or repeats a species, or an Aitken species is missing from the
    /// Accumulation mode.
    pub fn build(self) -> Result<AeroRegistry, RegistryError> {
        for species in &self.species {
            let density = *species.density;
            if !density.is_finite() || density <= 0.0 {
                return Err(RegistryError::NonPositiveDensity {
                    species: species.id,
                    density,
                });
            }
        }

        for mode in ModeIndex::ALL {
            let params = &self.modes[mode.index()];
            let (min, nominal, max) = (
                *params.min_diameter,
                *params.nom_diameter,
                *params.max_diameter,
            );
            if min <= 0.0 || min > nominal || nominal > max {
                return Err(RegistryError::DegenerateDiameterRange {
                    mode,
                    min,
                    nominal,
                    max,
                });
            }
            let sigma = params.mean_std_dev;
            if !sigma.is_finite() || sigma < 1.0 {
                return Err(RegistryError::InvalidStdDev { mode, sigma });
            }

            let members = &self.members[mode.index()];
            if members.is_empty() {
                return Err(RegistryError::EmptyMode { mode });
            }
            if members.len() > MAX_SPECIES_PER_MODE {
                return Err(RegistryError::TooManySpecies {
                    mode,
                    count: members.len(),
                    limit: MAX_SPECIES_PER_MODE,
                });
            }
            let mut seen = FxHashSet::default();
            for &id in members {
                if !seen.insert(id) {
                    return Err(RegistryError::DuplicateSpecies { mode, species: id });
                }
            }
        }

        let accumulation = &self.members[ModeIndex::Accumulation.index()];
        if let Some(&species) = self.members[ModeIndex::Aitken.index()]
            .iter()
            .find(|id| !accumulation.contains(id))
        {
            return Err(RegistryError::UnpairedAitkenSpecies { species });
        }

        let no_transfer_acc2ait = self
            .no_transfer_acc2ait
            .unwrap_or_else(|| default_no_transfer(&self.members));

        Ok(AeroRegistry {
            modes: self.modes,
            species: self.species,
            members: self.members,
            no_transfer_acc2ait,
        })
    }
}
