//! Fluid composition over the fixed dry-gas component set.

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use ec_core::numeric::{Tolerances, nearly_equal};

/// Normalized mole-fraction composition over `spec.md` §3's closed component
/// set. Always sums to 1.0 and always contains methane.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Species and mole fractions, always normalized to sum to 1.
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-methane composition.
    pub fn pure_methane() -> Self {
        Self {
            items: vec![(Species::Methane, 1.0)],
        }
    }

    /// Create a composition from raw mole fractions.
    ///
    /// Validates that methane is present, all fractions are finite and
    /// non-negative, and the sum is positive, then normalizes to sum = 1.
    /// (`spec.md` §3 Composition; §4.A `CompositionInvalid`.)
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::CompositionInvalid {
                what: "empty composition",
            });
        }
        if !fractions.iter().any(|(s, _)| *s == Species::Methane) {
            return Err(FluidError::CompositionInvalid {
                what: "methane is required",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(FluidError::CompositionInvalid {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::CompositionInvalid {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 {
            return Err(FluidError::CompositionInvalid {
                what: "mole fractions sum to zero",
            });
        }

        // Merge duplicate species entries, then normalize.
        let mut merged: Vec<(Species, f64)> = Vec::with_capacity(fractions.len());
        for (species, frac) in fractions {
            if let Some(existing) = merged.iter_mut().find(|(s, _)| *s == species) {
                existing.1 += frac;
            } else {
                merged.push((species, frac));
            }
        }

        let normalized: Vec<(Species, f64)> = merged
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15)
            .collect();

        if !normalized.iter().any(|(s, _)| *s == Species::Methane) {
            return Err(FluidError::CompositionInvalid {
                what: "methane fraction negligible after normalization",
            });
        }

        Ok(Self { items: normalized })
    }

    /// Mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// `Some(species)` if exactly one species has fraction ≈ 1.0.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Mixture molar mass [kg/kmol]: `M_mix = Σ x_i * M_i`.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }

    /// Mole-weighted mixture of two compositions by relative molar rate,
    /// used to combine `n1` mol/s of `self` with `n2` mol/s of `other`.
    pub fn mole_average(&self, n1: f64, other: &Composition, n2: f64) -> FluidResult<Composition> {
        if n1 < 0.0 || n2 < 0.0 || n1 + n2 <= 0.0 {
            return Err(FluidError::InvalidArg {
                what: "mixing requires non-negative, non-zero total molar rate",
            });
        }
        let mut fractions: Vec<(Species, f64)> = Vec::new();
        for species in Species::ALL {
            let x = self.mole_fraction(species) * n1 + other.mole_fraction(species) * n2;
            if x > 0.0 {
                fractions.push((species, x));
            }
        }
        Composition::new_mole_fractions(fractions)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_sum_is_one(fracs in prop::collection::vec(0.0_f64..1.0_f64, 1..5)) {
            let species = [
                Species::Methane,
                Species::Ethane,
                Species::Propane,
                Species::Nitrogen,
                Species::CO2,
            ];
            let input: Vec<(Species, f64)> = fracs
                .iter()
                .enumerate()
                .map(|(i, &f)| (species[i % species.len()], f))
                .collect();

            if let Ok(comp) = Composition::new_mole_fractions(input) {
                let sum: f64 = comp.iter().map(|(_, f)| f).sum();
                let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
                prop_assert!(nearly_equal(sum, 1.0, tol));
            }
        }
    }
}
