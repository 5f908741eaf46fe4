use crate::models::Amu;
use std::fmt::Display;
use std::path::PathBuf;

/// Problems with the shape of the data handed to the core
/// (recipes, raw scans, parallel arrays).
#[derive(Debug, Clone, PartialEq)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    /// No calibration scan had the expected number of channels.
    NoCompleteScans {
        expected_channels: usize,
        num_scans: usize,
    },
    MissingRecipeMass {
        row: usize,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedSlicesSameLength {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::ExpectedNonEmptyData {
                context: owned_context,
            } => match owned_context {
                Some(x) => x.push_str(context),
                None => *owned_context = Some(context.to_string()),
            },
            DataProcessingError::NoCompleteScans { .. }
            | DataProcessingError::MissingRecipeMass { .. } => {}
        }
        self
    }
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedSlicesSameLength {
                expected,
                other,
                context,
            } => write!(
                f,
                "Expected slices of the same length ({} vs {}): {}",
                expected, other, context
            ),
            Self::ExpectedNonEmptyData { context } => match context {
                Some(ctx) => write!(f, "Expected non-empty data: {}", ctx),
                None => write!(f, "Expected non-empty data"),
            },
            Self::NoCompleteScans {
                expected_channels,
                num_scans,
            } => write!(
                f,
                "None of the {} calibration scans has the expected {} channels",
                num_scans, expected_channels
            ),
            Self::MissingRecipeMass { row } => {
                write!(f, "Recipe row {} does not declare a mass", row)
            }
        }
    }
}

/// A symbol or AMU expected in a companion structure is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    MissingAmu { amu: Amu, context: &'static str },
    MissingSymbol { symbol: String, context: &'static str },
    MissingSymbolAmu {
        symbol: String,
        amu: Amu,
        context: &'static str,
    },
}

impl Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAmu { amu, context } => {
                write!(f, "AMU {} not found in {}", amu, context)
            }
            Self::MissingSymbol { symbol, context } => {
                write!(f, "Symbol {:?} not found in {}", symbol, context)
            }
            Self::MissingSymbolAmu {
                symbol,
                amu,
                context,
            } => write!(
                f,
                "No entry for symbol {:?} at AMU {} in {}",
                symbol, amu, context
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GasMixError {
    /// A test-mixture substance has no proportion profile with the same AMU set.
    InsufficientCalibrationData {
        symbol: String,
        atomic_masses: Vec<Amu>,
    },
    /// A planner round found no substance with a unique AMU.
    UnsolvableOverlap {
        remaining: Vec<String>,
    },
    /// A caller supplied resolve order names a substance more than once.
    DuplicateInResolveOrder {
        symbol: String,
    },
    /// A denominator that must be non-zero was zero (or not finite).
    DivisionDegeneracy {
        quantity: &'static str,
        context: String,
    },
    Lookup(LookupError),
    DataProcessing(DataProcessingError),
}

impl Display for GasMixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientCalibrationData {
                symbol,
                atomic_masses,
            } => write!(
                f,
                "The calibration data is insufficient to resolve the test gas: \
                 no proportions for {:?} with atomic masses {:?}. \
                 Make sure every substance of the test mixture was part of the \
                 calibration measurement with the same atomic masses.",
                symbol, atomic_masses
            ),
            Self::UnsolvableOverlap { remaining } => write!(
                f,
                "The atomic masses of {:?} overlap too much, none of them has a unique \
                 atomic mass. The system cannot be solved; use a different test gas \
                 mixture or recipe.",
                remaining
            ),
            Self::DuplicateInResolveOrder { symbol } => write!(
                f,
                "The resolve order lists {:?} more than once, every substance must be resolved exactly once",
                symbol
            ),
            Self::DivisionDegeneracy { quantity, context } => {
                write!(f, "Division by zero {} ({})", quantity, context)
            }
            Self::Lookup(e) => write!(f, "{}", e),
            Self::DataProcessing(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GasMixError {}

impl GasMixError {
    pub(crate) fn degenerate(quantity: &'static str, context: impl Display) -> Self {
        Self::DivisionDegeneracy {
            quantity,
            context: context.to_string(),
        }
    }
}

impl From<LookupError> for GasMixError {
    fn from(x: LookupError) -> Self {
        Self::Lookup(x)
    }
}

impl From<DataProcessingError> for GasMixError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessing(x)
    }
}

pub type Result<T> = std::result::Result<T, GasMixError>;

/// Returns `numerator / denominator`, failing instead of producing
/// an infinite or NaN value.
pub(crate) fn checked_div(
    numerator: f64,
    denominator: f64,
    quantity: &'static str,
    context: impl Display,
) -> Result<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(GasMixError::degenerate(quantity, context));
    }
    Ok(numerator / denominator)
}

#[derive(Debug)]
pub enum InputReadingError {
    ParsingError {
        source: serde_json::Error,
        context: &'static str,
    },
    FileReadingError {
        source: std::io::Error,
        context: &'static str,
        path: PathBuf,
    },
}

impl Display for InputReadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParsingError { source, context } => write!(f, "{}: {}", context, source),
            Self::FileReadingError {
                source,
                context,
                path,
            } => write!(f, "{} {}: {}", context, path.display(), source),
        }
    }
}

impl std::error::Error for InputReadingError {}
