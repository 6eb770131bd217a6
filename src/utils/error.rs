use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuppingError {
    #[error("Invalid section '{name}'. Must be one of: {valid}")]
    InvalidSection { name: String, valid: String },

    #[error("Missing score for section '{section}'")]
    MissingSection { section: String },

    #[error("Section '{section}' was given more than once")]
    DuplicateSection { section: String },

    #[error("{field} out of range: {reason}, got {value}")]
    OutOfRange {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input for {field}: '{value}' ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input closed before {field} was entered")]
    InputClosed { field: String },

    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: Box<CuppingError>,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Io,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CuppingError {
    pub fn out_of_range(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn in_row(row: usize, source: CuppingError) -> Self {
        Self::InvalidRow {
            row,
            source: Box::new(source),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSection { .. }
            | Self::MissingSection { .. }
            | Self::DuplicateSection { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidInput { .. }
            | Self::InputClosed { .. }
            | Self::InvalidRow { .. } => ErrorCategory::Input,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => match self {
                Self::IoError(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::Critical,
            },
        }
    }

    /// Exit code a binary should use when this error ends the run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidSection { valid, .. } => {
                format!("Use one of the recognised section names: {}", valid)
            }
            Self::MissingSection { section } => {
                format!("Provide a 0-10 score for '{}'", section)
            }
            Self::DuplicateSection { section } => {
                format!("Keep a single entry for '{}' (names are case-insensitive)", section)
            }
            Self::OutOfRange { .. } => {
                "Section scores must lie in 0-10 and cup counts must be non-negative".to_string()
            }
            Self::InvalidInput { .. } => "Enter a plain number such as 8.25".to_string(),
            Self::InputClosed { .. } => "Run again and answer every prompt".to_string(),
            Self::InvalidRow { row, source } => {
                format!("Fix data row {}: {}", row, source.recovery_suggestion())
            }
            Self::CsvError(_) => {
                "Check that the file is valid CSV with a header row".to_string()
            }
            Self::IoError(_) => "Check that the path exists and is writable".to_string(),
            Self::SerializationError(_) => "Report data could not be encoded".to_string(),
            Self::ZipError(_) => "Disable archiving or check free disk space".to_string(),
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration file against the documented keys".to_string()
            }
            Self::ProcessingError { .. } => "Fix the offending row and run again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid cupping input: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
            ErrorCategory::Io => format!("File operation failed: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CuppingError>;
