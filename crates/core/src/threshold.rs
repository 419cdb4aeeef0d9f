use strum_macros::{Display, EnumString};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ThresholdMode {
    #[strum(serialize = "correlation", serialize = "cc", to_string = "correlation")]
    Correlation,
    #[strum(
        serialize = "anti-correlation",
        serialize = "anticorrelation",
        serialize = "ac",
        to_string = "anti-correlation"
    )]
    AntiCorrelation,
}

impl ThresholdMode {
    /// Resolves the two mutually exclusive mode flags.
    pub fn from_flags(correlation: bool, anti_correlation: bool) -> Result<Self, ConfigError> {
        match (correlation, anti_correlation) {
            (true, true) => Err(ConfigError::ConflictingModes),
            (true, false) => Ok(ThresholdMode::Correlation),
            (false, true) => Ok(ThresholdMode::AntiCorrelation),
            (false, false) => Err(ConfigError::MissingMode),
        }
    }
}

/// Inclusive interval a coefficient must fall in to count as correlated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    mode: ThresholdMode,
    lower: f64,
    upper: f64,
}

impl Threshold {
    pub const CORRELATION_DEFAULT: (f64, f64) = (0.75, 1.0);
    pub const ANTI_CORRELATION_DEFAULT: (f64, f64) = (-1.0, -0.75);

    pub fn resolve(mode: ThresholdMode, range: Option<(f64, f64)>) -> Result<Self, ConfigError> {
        let Some((a, b)) = range else {
            let (lower, upper) = match mode {
                ThresholdMode::Correlation => Self::CORRELATION_DEFAULT,
                ThresholdMode::AntiCorrelation => Self::ANTI_CORRELATION_DEFAULT,
            };
            return Ok(Self { mode, lower, upper });
        };

        let invalid = |reason| ConfigError::InvalidRange {
            mode,
            lower: a,
            upper: b,
            reason,
        };
        if a.is_nan() || b.is_nan() {
            return Err(invalid("bounds must be numbers"));
        }
        match mode {
            ThresholdMode::Correlation if a < 0.0 || b < 0.0 => {
                return Err(invalid("bounds must not be negative"));
            }
            ThresholdMode::AntiCorrelation if a > 0.0 || b > 0.0 => {
                return Err(invalid("bounds must not be positive"));
            }
            _ => {}
        }

        Ok(Self {
            mode,
            lower: a.min(b),
            upper: a.max(b),
        })
    }

    pub fn mode(&self) -> ThresholdMode {
        self.mode
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// False for NaN and infinities, so degenerate variables never qualify.
    pub fn contains(&self, coefficient: f64) -> bool {
        coefficient.is_finite() && coefficient >= self.lower && coefficient <= self.upper
    }
}
