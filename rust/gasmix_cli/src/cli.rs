use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the test scans file (will over-write the config file)
    #[arg(short, long)]
    pub test_scans: Option<PathBuf>,

    /// Path to the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}
