//! Conversion of resolved ion currents into fractional concentrations.

use crate::errors::{
    LookupError,
    Result,
    checked_div,
};
use crate::models::{
    Amu,
    CalibrationFactors,
    Concentration,
    ResolvedIonCurrent,
};
use crate::traits::SubstanceLike;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Resolved ion current divided by the calibration factor of its channel.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormIonCurrent {
    pub symbol: String,
    pub amu: Amu,
    pub norm_ion_current: f64,
}

pub fn calc_norm_ion_currents(
    resolved: &[ResolvedIonCurrent],
    calibration_factors: &CalibrationFactors,
) -> Result<Vec<NormIonCurrent>> {
    let mut out = Vec::with_capacity(resolved.iter().map(|x| x.amus.len()).sum());
    for sub in resolved {
        for (&amu, &ion_current) in sub.amus.iter().zip(sub.ion_currents.iter()) {
            let factor = calibration_factors.get(&sub.symbol, amu)?;
            out.push(NormIonCurrent {
                symbol: sub.symbol.clone(),
                amu,
                norm_ion_current: checked_div(
                    ion_current,
                    factor,
                    "calibration factor",
                    format!("{} at AMU {}", sub.symbol, amu),
                )?,
            });
        }
    }
    Ok(out)
}

/// Fractional concentrations of every substance of the test mixture.
///
/// All normalized ion currents share one normalization constant, so the
/// total concentrations sum to one. AMUs are listed in the order the test
/// mixture declares them.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn calc_concentrations<S: SubstanceLike>(
    test_mixture: &[S],
    calibration_factors: &CalibrationFactors,
    resolved: &[ResolvedIonCurrent],
) -> Result<Vec<Concentration>> {
    let norm_ion_currents = calc_norm_ion_currents(resolved, calibration_factors)?;
    let normalization: f64 = norm_ion_currents.iter().map(|x| x.norm_ion_current).sum();
    debug!("Concentration normalization constant: {}", normalization);

    let mut lookup: HashMap<(&str, Amu), f64> = HashMap::with_capacity(norm_ion_currents.len());
    for x in &norm_ion_currents {
        lookup
            .entry((x.symbol.as_str(), x.amu))
            .or_insert(x.norm_ion_current);
    }

    test_mixture
        .iter()
        .map(|sub| -> Result<Concentration> {
            let concentrations = sub
                .atomic_masses()
                .iter()
                .map(|&amu| -> Result<f64> {
                    let norm = lookup.get(&(sub.symbol(), amu)).ok_or_else(|| {
                        LookupError::MissingSymbolAmu {
                            symbol: sub.symbol().to_string(),
                            amu,
                            context: "resolved ion currents",
                        }
                    })?;
                    checked_div(
                        *norm,
                        normalization,
                        "sum of normalized ion currents",
                        sub.symbol(),
                    )
                })
                .collect::<Result<Vec<f64>>>()?;

            Ok(Concentration {
                symbol: sub.symbol().to_string(),
                amus: sub.atomic_masses().to_vec(),
                total_concentration: concentrations.iter().sum(),
                concentrations,
            })
        })
        .collect()
}
