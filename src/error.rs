use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while simulating, solving or writing reports.
///
/// An unreachable target distance is not an error; it is reported as
/// [`crate::AngleOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum SightError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("trajectory at {angle_deg:.6} deg still airborne after {steps} steps")]
    IntegrationExhausted { angle_deg: f64, steps: usize },

    #[error("trajectory at {angle_deg:.6} deg became non-finite after {steps} steps")]
    NonFinite { angle_deg: f64, steps: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed report line {line}: {content:?}")]
    ReportParse { line: usize, content: String },

    #[error("no sight angle available for {0} yards")]
    MissingDistance(u32),

    #[error("ranges {range_1} and {range_2} share the same sight angle, tape scale is undefined")]
    DegenerateTape { range_1: u32, range_2: u32 },

    #[error("failed to render sight tape: {0}")]
    Render(String),
}

impl SightError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SightError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SightError>;
