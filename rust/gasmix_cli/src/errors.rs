#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    DataReading {
        source: String,
    },
    Processing {
        source: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing config: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::DataReading { source } => write!(f, "Error reading data: {}", source),
            CliError::Processing { source } => write!(f, "Error processing data: {}", source),
        }
    }
}

impl From<gasmix::InputReadingError> for CliError {
    fn from(e: gasmix::InputReadingError) -> Self {
        CliError::DataReading {
            source: e.to_string(),
        }
    }
}

impl From<gasmix::GasMixError> for CliError {
    fn from(e: gasmix::GasMixError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}
