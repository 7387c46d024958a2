use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("SQLite read failed: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Precondition failed: {message}")]
    PreconditionError { message: String },

    #[error("Residual {class} violations after cleaning: {count} remaining")]
    ResidualViolationError { class: String, count: usize },

    #[error("Empty report: {message}")]
    EmptyReportError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    DataQuality,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SqliteError(_)
            | EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Io,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::PreconditionError { .. }
            | EtlError::ResidualViolationError { .. }
            | EtlError::EmptyReportError { .. } => ErrorCategory::DataQuality,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::SqliteError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
            EtlError::CsvError(_) | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::PreconditionError { .. }
            | EtlError::ResidualViolationError { .. }
            | EtlError::EmptyReportError { .. }
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SqliteError(e) => format!("Could not read the student snapshot: {}", e),
            EtlError::CsvError(e) => format!("Could not parse the enrollment records: {}", e),
            EtlError::IoError(e) => format!("File operation failed: {}", e),
            EtlError::SerializationError(e) => {
                format!("Could not parse the department reference file: {}", e)
            }
            EtlError::ConfigError { message } => format!("Configuration problem: {}", message),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            EtlError::PreconditionError { message } => {
                format!("Input data cannot be processed: {}", message)
            }
            EtlError::ResidualViolationError { class, count } => format!(
                "Automatic cleaning left {} unresolved {} violations",
                count, class
            ),
            EtlError::EmptyReportError { message } => {
                format!("No report rows were produced: {}", message)
            }
            EtlError::ProcessingError { message } => format!("Processing failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Io => {
                "Check that the input files exist, are readable, and are in the expected format"
                    .to_string()
            }
            ErrorCategory::Configuration => {
                "Review the command-line flags or configuration file and correct the reported field"
                    .to_string()
            }
            ErrorCategory::DataQuality => {
                "Inspect the flagged source rows and fix them upstream; no output was written"
                    .to_string()
            }
            ErrorCategory::Processing => {
                "Re-run with --verbose to see which stage failed and inspect its input".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_quality_errors_are_fatal_before_export() {
        let err = EtlError::ResidualViolationError {
            class: "duplicate student".to_string(),
            count: 2,
        };
        assert_eq!(err.category(), ErrorCategory::DataQuality);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("duplicate student"));
    }

    #[test]
    fn test_config_errors_map_to_configuration_category() {
        let err = EtlError::InvalidConfigValueError {
            field: "output_path".to_string(),
            value: String::new(),
            reason: "Path cannot be empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("configuration"));
    }
}
