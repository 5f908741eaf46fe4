use gasmix::ReductionConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Scan recipe shared by the calibration and the test scans.
    pub recipe: PathBuf,
    pub calibration: CalibrationConfig,
    pub analysis: AnalysisConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CalibrationConfig {
    pub mixture: PathBuf,
    pub scans: PathBuf,
    pub reference_symbol: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub test_mixture: PathBuf,
    pub test_scans: Option<PathBuf>,
    #[serde(default)]
    pub reduction: ReductionConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Config {
    /// Command line flags take precedence over the file.
    pub fn apply_cli_args(&mut self, args: &Cli) {
        if let Some(test_scans) = &args.test_scans {
            self.analysis.test_scans = Some(test_scans.clone());
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }
    }

    pub fn test_scans(&self) -> Result<&PathBuf, CliError> {
        self.analysis.test_scans.as_ref().ok_or_else(|| CliError::Config {
            source: "No test scans provided, please provide them in either the config file or with the --test-scans flag".to_string(),
        })
    }

    pub fn output(&self) -> Result<&OutputConfig, CliError> {
        self.output.as_ref().ok_or_else(|| CliError::Config {
            source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const CONFIG: &str = r#"{
        "recipe": "recipe.json",
        "calibration": {
            "mixture": "calibration_mixture.json",
            "scans": "calibration_scans.json",
            "reference_symbol": "N2"
        },
        "analysis": {
            "test_mixture": "test_mixture.json",
            "reduction": {"noise_floor": 2e-14}
        }
    }"#;

    #[test]
    fn test_cli_overrides_config() {
        let mut config: Config = serde_json::from_str(CONFIG).unwrap();
        assert!(config.test_scans().is_err());
        assert!(config.output().is_err());
        assert_eq!(config.analysis.reduction.noise_floor, Some(2e-14));

        let args = Cli::parse_from([
            "gasmix",
            "--config",
            "config.json",
            "--test-scans",
            "scans.json",
            "--output-dir",
            "out",
        ]);
        config.apply_cli_args(&args);
        assert_eq!(config.test_scans().unwrap(), &PathBuf::from("scans.json"));
        assert_eq!(config.output().unwrap().directory, PathBuf::from("out"));
    }

    #[test]
    fn test_reduction_defaults_to_no_noise_floor() {
        let config: Config = serde_json::from_str(
            r#"{"recipe": "r.json",
                "calibration": {"mixture": "m.json", "scans": "s.json", "reference_symbol": "Ar"},
                "analysis": {"test_mixture": "t.json", "test_scans": "ts.json"}}"#,
        )
        .unwrap();
        assert_eq!(config.analysis.reduction, ReductionConfig::default());
    }
}
