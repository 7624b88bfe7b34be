//! Error types for the simulation pipeline.

use std::fmt;
use std::path::PathBuf;

/// Error returned by simulation, fitting, and persistence code.
///
/// The taxonomy is deliberate: an invalid rate indicates an upstream logic
/// or configuration bug and fails the run immediately, while an exhausted
/// search or an under-filled fit is carried as an explicit "unavailable"
/// marker so a failed estimate can never masquerade as a valid near-zero
/// resolution in the persisted output.
#[derive(Debug)]
pub enum SimError {
    /// A Poisson rate, variance, or probability parameter was negative or
    /// non-finite. Not recoverable: the configuration or an intermediate
    /// computation is broken.
    InvalidRate {
        /// The offending rate value.
        lambda: f64,
        /// Where the rate was constructed (e.g. "fixed-point iteration").
        context: &'static str,
    },

    /// The bracket search hit its doubling cap or ceiling without reaching
    /// the distinguishability threshold. Raised by the strict single-point
    /// search; grid sweeps record the point as unavailable instead.
    SearchExhausted {
        /// Flux at which the search failed.
        phi: f64,
        /// Largest interrogation gap tried.
        dt_ceiling: f64,
        /// Mean LLR achieved at the ceiling.
        llr_at_ceiling: f64,
    },

    /// Too few valid points remain after filtering non-finite or
    /// non-positive values for a log-log fit or a bootstrap.
    InsufficientData {
        /// Minimum number of valid points required.
        needed: usize,
        /// Number of valid points available.
        got: usize,
        /// What was being computed.
        context: &'static str,
    },

    /// A persisted record does not match any supported schema shape.
    SchemaMismatch(String),

    /// Filesystem error while reading or writing a results file.
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    Json(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRate { lambda, context } => {
                write!(f, "invalid Poisson rate lambda={lambda} in {context}")
            }
            Self::SearchExhausted {
                phi,
                dt_ceiling,
                llr_at_ceiling,
            } => write!(
                f,
                "bracket search exhausted at phi={phi}: mean LLR {llr_at_ceiling} \
                 below threshold at dt ceiling {dt_ceiling}"
            ),
            Self::InsufficientData {
                needed,
                got,
                context,
            } => write!(
                f,
                "insufficient data for {context}: {got} valid points, need {needed}"
            ),
            Self::SchemaMismatch(detail) => {
                write!(f, "unrecognized record shape: {detail}")
            }
            Self::Io { path, source } => {
                write!(f, "i/o error on {}: {source}", path.display())
            }
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_rate() {
        let err = SimError::InvalidRate {
            lambda: f64::NAN,
            context: "test",
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid Poisson rate"), "got: {msg}");
    }

    #[test]
    fn display_insufficient_data() {
        let err = SimError::InsufficientData {
            needed: 5,
            got: 2,
            context: "log-log fit",
        };
        let msg = err.to_string();
        assert!(msg.contains("2 valid points, need 5"), "got: {msg}");
    }

    #[test]
    fn schema_mismatch_is_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(SimError::SchemaMismatch("top-level array".into()));
        assert!(err.to_string().contains("unrecognized record shape"));
    }
}
