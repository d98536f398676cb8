use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input data error in {source_name}: {message}")]
    DataError { source_name: String, message: String },

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InputData,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AllocError {
    pub fn data(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AllocError::ConfigError { .. }
            | AllocError::ConfigValidationError { .. }
            | AllocError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AllocError::CsvError(_) | AllocError::DataError { .. } => ErrorCategory::InputData,
            AllocError::ZipError(_) | AllocError::SerializationError(_) => ErrorCategory::Output,
            AllocError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::InputData => ErrorSeverity::High,
            // 輸出目錄修正後可直接重跑
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AllocError::ConfigError { .. } | AllocError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and required sections"
            }
            AllocError::InvalidConfigValueError { .. } => {
                "Correct the reported configuration value and run again"
            }
            AllocError::CsvError(_) | AllocError::DataError { .. } => {
                "Verify the input CSV files have the expected header columns"
            }
            AllocError::ZipError(_) | AllocError::SerializationError(_) => {
                "Check that the output directory is writable"
            }
            AllocError::IoError(_) => "Check that input files exist and paths are accessible",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::InputData => format!("Could not read input data: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AllocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = AllocError::data("people.csv", "missing column 'Profile'");
        assert_eq!(err.category(), ErrorCategory::InputData);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("people.csv"));

        let io = AllocError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);

        let config = AllocError::InvalidConfigValueError {
            field: "formats".to_string(),
            value: "pdf".to_string(),
            reason: "unsupported".to_string(),
        };
        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert!(config
            .user_friendly_message()
            .starts_with("Configuration problem"));

        let zip = AllocError::from(zip::result::ZipError::FileNotFound);
        assert_eq!(zip.severity(), ErrorSeverity::Medium);
    }
}
