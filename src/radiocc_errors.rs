use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioccError {
    #[error("Geometry evaluation failed: {0}")]
    Geometry(String),

    #[error("Unable to load the ephemeris kernel set: {0}")]
    KernelLoad(String),

    #[error("Unable to build the scan worker pool: {0}")]
    WorkerPool(String),

    #[error("Invalid scan parameter: {0}")]
    InvalidScanParameter(String),

    #[error("Invalid coverage parameter: {0}")]
    InvalidCoverageParameter(String),

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Invalid pass record: {0}")]
    InvalidPassRecord(String),

    #[error("Invalid occultation window: {0}")]
    InvalidOccultationWindow(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON decoding error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RadioccError {
    /// `true` for failures that only invalidate a single sample of a scan.
    pub fn is_transient(&self) -> bool {
        matches!(self, RadioccError::Geometry(_))
    }
}

impl PartialEq for RadioccError {
    fn eq(&self, other: &Self) -> bool {
        use RadioccError::*;
        match (self, other) {
            (Geometry(a), Geometry(b)) => a == b,
            (KernelLoad(a), KernelLoad(b)) => a == b,
            (WorkerPool(a), WorkerPool(b)) => a == b,
            (InvalidScanParameter(a), InvalidScanParameter(b)) => a == b,
            (InvalidCoverageParameter(a), InvalidCoverageParameter(b)) => a == b,
            (InvalidTimeFormat(a), InvalidTimeFormat(b)) => a == b,
            (InvalidPassRecord(a), InvalidPassRecord(b)) => a == b,
            (InvalidOccultationWindow(a), InvalidOccultationWindow(b)) => a == b,
            (InvalidUrl(a), InvalidUrl(b)) => a == b,
            (ConfigError(a), ConfigError(b)) => a == b,

            // Wrapped foreign errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (ReqwestError(_), ReqwestError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (TomlError(_), TomlError(_)) => true,
            (JsonError(_), JsonError(_)) => true,

            _ => false,
        }
    }
}

#[cfg(test)]
mod radiocc_errors_test {
    use super::*;

    #[test]
    fn test_only_geometry_is_transient() {
        assert!(RadioccError::Geometry("no tangent point".into()).is_transient());
        assert!(!RadioccError::KernelLoad("em16_ops.tm".into()).is_transient());
        assert!(!RadioccError::InvalidTimeFormat("??".into()).is_transient());
    }
}
