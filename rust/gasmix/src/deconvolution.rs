//! Apportioning of shared-channel ion current among the substances of a
//! test mixture.
//!
//! Substances are visited in resolve order. The ion current at a substance's
//! unique AMU belongs to it entirely; its other channels are derived from
//! that value through the proportion profile recorded at calibration time.
//! Every attributed current is subtracted from a [`ResidualSignal`], so
//! substances resolved later only see what is left on shared channels. The
//! residual is clamped at zero after every subtraction.
//!
//! A resolve pass is sequential by construction: each substance depends on the
//! residual left by all previously resolved ones.

use crate::errors::{
    GasMixError,
    LookupError,
    Result,
    checked_div,
};
use crate::models::{
    Amu,
    MeasurementData,
    ProportionProfile,
    Proportions,
    ResolvedIonCurrent,
    Substance,
    UniqueAmuMolecule,
};
use crate::resolve_order::plan_order;
use crate::traits::SubstanceLike;
use nohash_hasher::IntMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{
    HashMap,
    HashSet,
};
use tracing::{
    debug,
    trace,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AmuIonCurrent {
    pub amu: Amu,
    pub ion_current: f64,
}

/// Measurement owned by a single resolve pass and depleted as substances
/// are resolved.
#[derive(Debug, Clone)]
pub struct ResidualSignal {
    data: MeasurementData,
    index: IntMap<Amu, usize>,
}

impl ResidualSignal {
    pub fn new(data: MeasurementData) -> Self {
        let index = data.channel_index();
        Self { data, index }
    }

    fn channel(&self, amu: Amu) -> std::result::Result<usize, LookupError> {
        self.index
            .get(&amu)
            .copied()
            .ok_or(LookupError::MissingAmu {
                amu,
                context: "test measurement",
            })
    }

    pub fn ion_current(&self, amu: Amu) -> std::result::Result<f64, LookupError> {
        let channel = self.channel(amu)?;
        self.data
            .ion_current_at(channel)
            .ok_or(LookupError::MissingAmu {
                amu,
                context: "test measurement",
            })
    }

    /// Subtracts `amount` from the channel at `amu`, never going below zero.
    pub fn deplete(&mut self, amu: Amu, amount: f64) -> std::result::Result<(), LookupError> {
        let channel = self.channel(amu)?;
        let value = self
            .data
            .ion_currents_mut()
            .get_mut(channel)
            .ok_or(LookupError::MissingAmu {
                amu,
                context: "test measurement",
            })?;
        *value = (*value - amount).max(0.0);
        Ok(())
    }

    pub fn as_measurement(&self) -> &MeasurementData {
        &self.data
    }

    pub fn into_inner(self) -> MeasurementData {
        self.data
    }
}

/// Current ion currents at the unique AMUs of `molecule`, in channel order.
pub fn ion_currents_per_unique_amu(
    measurement: &MeasurementData,
    molecule: &UniqueAmuMolecule,
) -> Vec<AmuIonCurrent> {
    measurement
        .amus()
        .iter()
        .zip(measurement.ion_currents().iter())
        .filter(|(amu, _)| molecule.uniq_amus.contains(amu))
        .map(|(&amu, &ion_current)| AmuIonCurrent { amu, ion_current })
        .collect()
}

/// Fails if a substance of the test mixture has no proportion profile with
/// the same AMU set.
pub fn check_proportions<S: SubstanceLike>(
    test_mixture: &[S],
    proportions: &Proportions,
) -> Result<()> {
    for sub in test_mixture {
        if proportions
            .matching(sub.symbol(), sub.atomic_masses())
            .is_none()
        {
            return Err(GasMixError::InsufficientCalibrationData {
                symbol: sub.symbol().to_string(),
                atomic_masses: sub.atomic_masses().to_vec(),
            });
        }
    }
    Ok(())
}

/// Resolves one substance and depletes its contribution from `residual`.
///
/// The ion currents are returned in the order of the profile's AMUs.
pub fn resolve_molecule(
    profile: &ProportionProfile,
    molecule: &UniqueAmuMolecule,
    residual: &mut ResidualSignal,
) -> Result<ResolvedIonCurrent> {
    let unique_currents = ion_currents_per_unique_amu(residual.as_measurement(), molecule);
    let unique_current = |amu: Amu| {
        unique_currents
            .iter()
            .find(|x| x.amu == amu)
            .map(|x| x.ion_current)
            .ok_or(LookupError::MissingAmu {
                amu,
                context: "test measurement",
            })
    };

    let anchor = *molecule
        .uniq_amus
        .first()
        .ok_or_else(|| LookupError::MissingSymbol {
            symbol: molecule.symbol.clone(),
            context: "unique AMUs of the resolve order",
        })?;
    let anchor_proportion =
        profile
            .proportion_of(anchor)
            .ok_or_else(|| LookupError::MissingSymbolAmu {
                symbol: profile.symbol.clone(),
                amu: anchor,
                context: "proportions",
            })?;
    let anchor_current = unique_current(anchor)?;

    let mut ion_currents = Vec::with_capacity(profile.amus.len());
    for (&amu, &proportion) in profile.amus.iter().zip(profile.proportions.iter()) {
        let ion_current = if molecule.uniq_amus.contains(&amu) {
            unique_current(amu)?
        } else {
            checked_div(
                anchor_current,
                anchor_proportion,
                "proportion at the unique AMU",
                format!("{} at AMU {}", profile.symbol, anchor),
            )? * proportion
        };
        residual.deplete(amu, ion_current)?;
        ion_currents.push(ion_current);
    }

    let total_ion_current = ion_currents.iter().sum();
    trace!(
        "Resolved {} via AMU {}: total ion current {}",
        profile.symbol,
        anchor,
        total_ion_current
    );

    Ok(ResolvedIonCurrent {
        symbol: profile.symbol.clone(),
        amus: profile.amus.clone(),
        ion_currents,
        total_ion_current,
    })
}

/// Same as [`resolve`] but also hands back what is left of the measurement.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn resolve_with_residual(
    proportions: &Proportions,
    measurement: MeasurementData,
    test_mixture: &[Substance],
    resolve_order: Option<&[UniqueAmuMolecule]>,
) -> Result<(Vec<ResolvedIonCurrent>, MeasurementData)> {
    check_proportions(test_mixture, proportions)?;

    let order: Cow<'_, [UniqueAmuMolecule]> = match resolve_order {
        Some(order) => Cow::Borrowed(order),
        None => Cow::Owned(plan_order(test_mixture)?),
    };

    let substances: HashMap<&str, &Substance> = test_mixture
        .iter()
        .map(|x| (x.symbol.as_str(), x))
        .collect();
    let mut seen = HashSet::with_capacity(order.len());
    for molecule in order.iter() {
        if !seen.insert(molecule.symbol.as_str()) {
            return Err(GasMixError::DuplicateInResolveOrder {
                symbol: molecule.symbol.clone(),
            });
        }
    }
    for sub in test_mixture {
        if !seen.contains(sub.symbol.as_str()) {
            return Err(LookupError::MissingSymbol {
                symbol: sub.symbol.clone(),
                context: "resolve order",
            }
            .into());
        }
    }

    let mut residual = ResidualSignal::new(measurement);
    let mut resolved = Vec::with_capacity(order.len());
    for molecule in order.iter() {
        let substance =
            substances
                .get(molecule.symbol.as_str())
                .ok_or_else(|| LookupError::MissingSymbol {
                    symbol: molecule.symbol.clone(),
                    context: "test mixture",
                })?;
        let profile = proportions
            .matching(&substance.symbol, &substance.atomic_masses)
            .ok_or_else(|| GasMixError::InsufficientCalibrationData {
                symbol: substance.symbol.clone(),
                atomic_masses: substance.atomic_masses.clone(),
            })?;
        resolved.push(resolve_molecule(profile, molecule, &mut residual)?);
    }

    debug!("Resolved {} substances", resolved.len());
    Ok((resolved, residual.into_inner()))
}

/// Deconvolves `measurement` into per-substance ion currents.
///
/// The measurement is consumed: it is depleted while substances are
/// resolved. When `resolve_order` is `None` it is planned from the test
/// mixture, which gives the same result as passing the planned order.
pub fn resolve(
    proportions: &Proportions,
    measurement: MeasurementData,
    test_mixture: &[Substance],
    resolve_order: Option<&[UniqueAmuMolecule]>,
) -> Result<Vec<ResolvedIonCurrent>> {
    resolve_with_residual(proportions, measurement, test_mixture, resolve_order)
        .map(|(resolved, _)| resolved)
}
