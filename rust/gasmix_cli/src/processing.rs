use super::config::{
    Config,
    OutputConfig,
};
use crate::errors::CliError;
use gasmix::inputs::{
    TestScans,
    read_json,
};
use gasmix::{
    Analysis,
    Calibration,
    CalibrationSubstance,
    RawCalibrationMeasurements,
    RawMeasurement,
    Recipe,
    Substance,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressStyle,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{
    debug,
    info,
    warn,
};

/// One entry of `analyses.json`. Failed scans keep their error message.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub scannum: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn write_json<T: Serialize>(data: &T, path: &Path) -> Result<(), CliError> {
    let file = std::fs::File::create(path).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    })?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), data).map_err(|e| {
        CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        }
    })
}

pub fn main_loop(
    calibration: &Calibration,
    recipe: &Recipe,
    test_mixture: &[Substance],
    scans: &[RawMeasurement],
    config: &Config,
) -> Result<Vec<ScanReport>, CliError> {
    let order = calibration.validate(test_mixture)?;
    info!(
        "Resolve order: {:?}",
        order.iter().map(|x| x.symbol.as_str()).collect::<Vec<_>>()
    );

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let start = Instant::now();
    let reports: Vec<ScanReport> = scans
        .par_iter()
        .progress_with_style(style)
        .map(|raw| {
            let res = calibration.analyze_with_order(
                recipe,
                test_mixture,
                &order,
                raw,
                &config.analysis.reduction,
            );
            match res {
                Ok(analysis) => ScanReport {
                    scannum: raw.data.scannum,
                    analysis: Some(analysis),
                    error: None,
                },
                Err(e) => {
                    warn!("Scan {} failed: {}", raw.data.scannum, e);
                    ScanReport {
                        scannum: raw.data.scannum,
                        analysis: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    let nfailed = reports.iter().filter(|x| x.error.is_some()).count();
    info!(
        "Analyzed {} scans ({} failed) in {:?}",
        reports.len(),
        nfailed,
        start.elapsed()
    );
    Ok(reports)
}

fn log_summary(reports: &[ScanReport]) {
    let analyses: Vec<&Analysis> = reports.iter().filter_map(|x| x.analysis.as_ref()).collect();
    let Some(first) = analyses.first() else {
        warn!("No scan could be analyzed");
        return;
    };
    for (i, conc) in first.concentrations.iter().enumerate() {
        let mean = analyses
            .iter()
            .map(|x| x.concentrations[i].total_concentration)
            .sum::<f64>()
            / analyses.len() as f64;
        info!("{:>8}: {:.6}", conc.symbol, mean);
    }
}

pub fn process_config(config: &Config) -> Result<(), CliError> {
    let output: &OutputConfig = config.output()?;

    let recipe: Recipe = read_json(&config.recipe)?;
    let calibration_mixture: Vec<CalibrationSubstance> = read_json(&config.calibration.mixture)?;
    let raw_calibration: RawCalibrationMeasurements = read_json(&config.calibration.scans)?;
    let test_mixture: Vec<Substance> = read_json(&config.analysis.test_mixture)?;
    let scans = read_json::<TestScans>(config.test_scans()?)?.into_vec();
    debug!(
        "Loaded recipe with {} channels, {} calibration scans, {} test scans",
        recipe.num_channels(),
        raw_calibration.data.len(),
        scans.len()
    );

    let calibration = Calibration::from_measurements(
        &recipe,
        &calibration_mixture,
        &raw_calibration,
        &config.calibration.reference_symbol,
    )?;
    write_json(&calibration, &output.directory.join("calibration.json"))?;

    let reports = main_loop(&calibration, &recipe, &test_mixture, &scans, config)?;
    write_json(&reports, &output.directory.join("analyses.json"))?;
    info!("Mean concentrations over analyzed scans:");
    log_summary(&reports);
    Ok(())
}
