use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found:?}, expected {expected:?}")]
    UnsupportedVersion {
        found: String,
        expected: &'static str,
    },

    #[error("inconsistent snapshot {field}: {reason}")]
    Shape { field: &'static str, reason: String },

    #[error(transparent)]
    Engine(#[from] cca_sim_core::Error),
}

impl ReportError {
    pub(crate) fn shape(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Shape {
            field,
            reason: reason.into(),
        }
    }
}
