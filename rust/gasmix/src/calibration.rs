//! Calibration of the instrument against a gas of known composition.
//!
//! The calibration scan yields, per substance and channel, the ion current
//! produced per unit of partial pressure (the sensitivity). Sensitivities are
//! normalized against the 100%-peak of a reference substance to give the
//! calibration factors used when converting resolved ion currents into
//! concentrations. The same scan also yields the proportion profiles used as
//! templates during deconvolution.

use crate::errors::{
    DataProcessingError,
    LookupError,
    Result,
    checked_div,
};
use crate::models::{
    CalibrationFactor,
    CalibrationFactors,
    CalibrationSubstance,
    MeasurementData,
    PartialPressure,
    PartialPressures,
    ProportionProfile,
    Proportions,
    RawCalibrationMeasurements,
    Sensitivities,
    Sensitivity,
};
use crate::traits::SubstanceLike;
use tracing::debug;

/// Total pressure of the calibration gas (first reading of the first scan).
pub fn calibration_total_pressure(raw: &RawCalibrationMeasurements) -> Result<f64> {
    raw.total_pressure().ok_or_else(|| {
        DataProcessingError::ExpectedNonEmptyData {
            context: Some("Calibration measurement has no total pressure reading".to_string()),
        }
        .into()
    })
}

pub fn calc_partial_pressures(
    mixture: &[CalibrationSubstance],
    total_pressure: f64,
) -> PartialPressures {
    PartialPressures::new(
        mixture
            .iter()
            .map(|sub| PartialPressure {
                symbol: sub.symbol().to_string(),
                partial_pressure: sub.concentration * total_pressure,
            })
            .collect(),
    )
}

/// Ion current per unit partial pressure for every (symbol, amu) of the mixture.
///
/// Ion currents are looked up by AMU value, not by channel position.
pub fn calc_sensitivities(
    mixture: &[CalibrationSubstance],
    partial_pressures: &PartialPressures,
    measurement: &MeasurementData,
) -> Result<Sensitivities> {
    let channel_index = measurement.channel_index();
    let mut out = Vec::with_capacity(mixture.iter().map(|x| x.atomic_masses().len()).sum());

    for sub in mixture {
        let partial_pressure = partial_pressures.get(sub.symbol())?;
        for &amu in sub.atomic_masses() {
            let ion_current = channel_index
                .get(&amu)
                .and_then(|&i| measurement.ion_current_at(i))
                .ok_or(LookupError::MissingAmu {
                    amu,
                    context: "calibration measurement",
                })?;
            let sensitivity = checked_div(
                ion_current,
                partial_pressure,
                "partial pressure",
                sub.symbol(),
            )?;
            out.push(Sensitivity {
                symbol: sub.symbol().to_string(),
                amu,
                sensitivity,
            });
        }
    }

    Ok(Sensitivities::new(out))
}

/// Sensitivity of the 100%-peak of the reference substance.
pub fn reference_peak_sensitivity(
    sensitivities: &Sensitivities,
    reference_symbol: &str,
) -> Result<f64> {
    Ok(sensitivities.peak_for_symbol(reference_symbol)?)
}

pub fn calc_calibration_factors(
    sensitivities: &Sensitivities,
    reference_symbol: &str,
) -> Result<CalibrationFactors> {
    let reference = reference_peak_sensitivity(sensitivities, reference_symbol)?;
    debug!(
        "Reference sensitivity of {:?}: {}",
        reference_symbol, reference
    );

    let factors = sensitivities
        .as_slice()
        .iter()
        .map(|x| -> Result<CalibrationFactor> {
            Ok(CalibrationFactor {
                symbol: x.symbol.clone(),
                amu: x.amu,
                sensitivity: x.sensitivity,
                calibration_factor: checked_div(
                    x.sensitivity,
                    reference,
                    "reference sensitivity",
                    reference_symbol,
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CalibrationFactors::new(factors))
}

/// Intensity of every channel of a substance relative to its own strongest channel.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn calc_proportions<S: SubstanceLike>(
    mixture: &[S],
    measurement: &MeasurementData,
) -> Result<Proportions> {
    let channel_index = measurement.channel_index();

    let profiles = mixture
        .iter()
        .map(|sub| -> Result<ProportionProfile> {
            let ion_currents = sub
                .atomic_masses()
                .iter()
                .map(|&amu| {
                    channel_index
                        .get(&amu)
                        .and_then(|&i| measurement.ion_current_at(i))
                        .ok_or(LookupError::MissingAmu {
                            amu,
                            context: "calibration measurement",
                        })
                })
                .collect::<std::result::Result<Vec<f64>, LookupError>>()?;

            let peak = ion_currents.iter().copied().fold(0.0, f64::max);
            let proportions = ion_currents
                .iter()
                .map(|x| checked_div(*x, peak, "100%-peak ion current", sub.symbol()))
                .collect::<Result<Vec<f64>>>()?;

            Ok(ProportionProfile {
                symbol: sub.symbol().to_string(),
                amus: sub.atomic_masses().to_vec(),
                proportions,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Proportions::new(profiles)?)
}
