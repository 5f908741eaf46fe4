use gasmix::concentrations::calc_concentrations;
use gasmix::deconvolution::resolve;
use gasmix::errors::GasMixError;
use gasmix::models::{
    ProportionProfile,
    RawCalibrationMeasurements,
};
use gasmix::resolve_order::plan_rounds;
use gasmix::{
    Amu,
    Calibration,
    CalibrationFactors,
    CalibrationSubstance,
    MeasurementData,
    Proportions,
    RawMeasurement,
    Recipe,
    ReductionConfig,
    Substance,
};
use rand::{
    Rng,
    SeedableRng,
};
use rand_chacha::ChaCha8Rng;

const RECIPE_JSON: &str = r#"{
    "name": "air",
    "dwell": 32,
    "mode": "MASSES",
    "rows": [
        {"type": "MASS", "special": "PRESSURE"},
        {"type": "MASS", "mass": 14, "dwell": 32, "leadIn": 1, "em": 0},
        {"type": "MASS", "mass": 16, "dwell": 32},
        {"type": "MASS", "mass": 20, "dwell": 32},
        {"type": "MASS", "mass": 28, "dwell": 32},
        {"type": "MASS", "mass": 32, "dwell": 32},
        {"type": "MASS", "mass": 40, "dwell": 32},
        {"type": "MASS", "mass": 44, "dwell": 32}
    ]
}"#;

const CALIBRATION_MIXTURE_JSON: &str = r#"[
    {"symbol": "N2", "atomic_masses": [28, 14], "concentration": 0.78},
    {"symbol": "O2", "atomic_masses": [32, 16], "concentration": 0.21},
    {"symbol": "Ar", "atomic_masses": [40, 20], "concentration": 0.009},
    {"symbol": "CO2", "atomic_masses": [44, 28, 16], "concentration": 0.001}
]"#;

fn calibration_scans() -> RawCalibrationMeasurements {
    let json = r#"{
        "name": "got",
        "origin": "/mmsp/measurement/scans",
        "data": [
            {"scannum": 0, "scansize": 8, "values": [1e-5, 7.2e-10, 2.1e-10, 1.1e-11, 7.8e-9, 2.1e-9, 9.0e-11, 1.0e-11]},
            {"scannum": 1, "scansize": 8, "values": [1e-5, 7.0e-10, 2.3e-10, 0.9e-11, 7.8e-9, 2.1e-9, 9.0e-11, -1.0e-11]},
            {"scannum": 2, "scansize": 4, "values": [1e-5, 7.0e-10, 2.3e-10, 0.9e-11]}
        ]
    }"#;
    serde_json::from_str(json).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    let tol = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() < tol,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn test_air_from_instrument_json() {
    let recipe: Recipe = serde_json::from_str(RECIPE_JSON).unwrap();
    let mixture: Vec<CalibrationSubstance> =
        serde_json::from_str(CALIBRATION_MIXTURE_JSON).unwrap();
    let calibration =
        Calibration::from_measurements(&recipe, &mixture, &calibration_scans(), "N2").unwrap();

    // Peak of N2 is at AMU 28
    assert_close(calibration.calibration_factors.get("N2", 28).unwrap(), 1.0);
    assert_close(calibration.proportions.get("N2").unwrap().proportions[1], 7.1e-10 / 7.8e-9);

    let test_mixture: Vec<Substance> = mixture.iter().cloned().map(Substance::from).collect();
    let order = calibration.validate(&test_mixture).unwrap();
    let symbols: Vec<&str> = order.iter().map(|x| x.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["N2", "O2", "Ar", "CO2"]);

    let raw: RawMeasurement = serde_json::from_str(
        r#"{"name": "got", "origin": "/mmsp/measurement/scans",
            "data": {"scannum": 12, "scansize": 8,
                     "values": [1e-5, 7.1e-10, 2.2e-10, 1.0e-11, 7.8e-9, 2.1e-9, 9.0e-11, 1.0e-11]}}"#,
    )
    .unwrap();
    let analysis = calibration
        .analyze(&recipe, &test_mixture, &raw, &ReductionConfig::default())
        .unwrap();

    let total: f64 = analysis
        .concentrations
        .iter()
        .map(|x| x.total_concentration)
        .sum();
    assert_close(total, 1.0);
    assert_eq!(analysis.concentrations[3].amus, vec![44, 28, 16]);
    assert!(analysis.residual.ion_currents().iter().all(|x| *x >= 0.0));

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["scannum"], 12);
    assert_eq!(json["concentrations"].as_array().unwrap().len(), 4);
}

#[test]
fn test_noise_floor_only_touches_test_scans() {
    let recipe: Recipe = serde_json::from_str(RECIPE_JSON).unwrap();
    let mixture: Vec<CalibrationSubstance> =
        serde_json::from_str(CALIBRATION_MIXTURE_JSON).unwrap();
    let calibration =
        Calibration::from_measurements(&recipe, &mixture, &calibration_scans(), "N2").unwrap();
    let test_mixture: Vec<Substance> = mixture.into_iter().map(Substance::from).collect();
    let raw: RawMeasurement = gasmix::RawScan::new(
        0,
        vec![1e-5, 7.1e-10, 2.2e-10, 1.0e-11, 7.8e-9, 2.1e-9, 9.0e-11, 1.0e-11],
    )
    .into();

    let plain = calibration
        .analyze(&recipe, &test_mixture, &raw, &ReductionConfig::default())
        .unwrap();
    let denoised = calibration
        .analyze(
            &recipe,
            &test_mixture,
            &raw,
            &ReductionConfig::with_amplifier_noise(),
        )
        .unwrap();
    assert_ne!(plain.concentrations, denoised.concentrations);
    let total: f64 = denoised
        .concentrations
        .iter()
        .map(|x| x.total_concentration)
        .sum();
    assert_close(total, 1.0);
}

#[test]
fn test_unsolvable_test_mixture() {
    let recipe = Recipe::from_masses(32.0, &[12, 16, 28]);
    let mixture = vec![
        CalibrationSubstance::new("CO", vec![28, 12, 16], 0.5),
        CalibrationSubstance::new("N2", vec![12, 28, 16], 0.5),
    ];
    let raw: RawCalibrationMeasurements =
        vec![gasmix::RawScan::new(0, vec![1e-5, 1.0, 2.0, 3.0])].into();
    let calibration = Calibration::from_measurements(&recipe, &mixture, &raw, "CO").unwrap();
    let test_mixture: Vec<Substance> = mixture.into_iter().map(Substance::from).collect();
    assert!(matches!(
        calibration.validate(&test_mixture),
        Err(GasMixError::UnsolvableOverlap { .. })
    ));
}

fn random_profile(rng: &mut ChaCha8Rng, symbol: &str, amus: Vec<Amu>) -> ProportionProfile {
    let mut proportions: Vec<f64> = amus.iter().map(|_| rng.gen_range(0.2..1.0)).collect();
    let peak = rng.gen_range(0..amus.len());
    proportions[peak] = 1.0;
    ProportionProfile {
        symbol: symbol.to_string(),
        amus,
        proportions,
    }
}

/// Measurement produced by the given amounts of every substance, summed
/// channel by channel.
fn forward_model(
    channels: &[Amu],
    profiles: &[ProportionProfile],
    amounts: &[f64],
) -> MeasurementData {
    let ion_currents = channels
        .iter()
        .map(|&amu| {
            profiles
                .iter()
                .zip(amounts)
                .map(|(p, x)| p.proportion_of(amu).unwrap_or(0.0) * x)
                .sum::<f64>()
        })
        .collect();
    MeasurementData::new(channels.to_vec(), ion_currents).unwrap()
}

fn check_recovery(mixture: &[Substance], channels: &[Amu], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let profiles: Vec<ProportionProfile> = mixture
        .iter()
        .map(|x| random_profile(&mut rng, &x.symbol, x.atomic_masses.clone()))
        .collect();
    let amounts: Vec<f64> = mixture.iter().map(|_| rng.gen_range(0.1..10.0)).collect();
    let measurement = forward_model(channels, &profiles, &amounts);

    let proportions = Proportions::new(profiles.clone()).unwrap();
    let resolved = resolve(&proportions, measurement, mixture, None).unwrap();
    for res in &resolved {
        let i = mixture.iter().position(|x| x.symbol == res.symbol).unwrap();
        for (&amu, &ion_current) in res.amus.iter().zip(res.ion_currents.iter()) {
            let expected = profiles[i].proportion_of(amu).unwrap() * amounts[i];
            assert_close(ion_current, expected);
        }
    }

    let factors = CalibrationFactors::uniform(
        mixture
            .iter()
            .flat_map(|x| x.atomic_masses.iter().map(|&amu| (x.symbol.as_str(), amu))),
    );
    let concentrations = calc_concentrations(mixture, &factors, &resolved).unwrap();
    let total: f64 = concentrations.iter().map(|x| x.total_concentration).sum();
    assert_close(total, 1.0);
    assert!(concentrations
        .iter()
        .flat_map(|x| x.concentrations.iter())
        .all(|x| *x >= 0.0));
}

#[test]
fn test_random_overlapping_mixtures_recover_amounts() {
    let mixture = vec![
        Substance::new("test0", vec![1, 2, 3]),
        Substance::new("test1", vec![1, 2, 3, 4]),
        Substance::new("test2", vec![1, 2, 3, 4, 5]),
        Substance::new("test3", vec![6, 1, 2, 3, 4]),
    ];
    for seed in 0..50 {
        check_recovery(&mixture, &[1, 2, 3, 4, 5, 6], seed);
    }
}

#[test]
fn test_random_chain_mixtures_recover_amounts() {
    // s_k uses AMUs k and k + 1, only the two ends start out separable
    for n in 2..8u16 {
        let mixture: Vec<Substance> = (1..=n)
            .map(|k| Substance::new(format!("s{}", k), vec![k, k + 1]))
            .collect();
        let channels: Vec<Amu> = (1..=n + 1).collect();
        let rounds = plan_rounds(&mixture).unwrap();
        assert_eq!(rounds.len(), (n as usize).div_ceil(2));
        for seed in 0..10 {
            check_recovery(&mixture, &channels, seed * 100 + n as u64);
        }
    }
}
