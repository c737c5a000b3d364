use thiserror::Error;

#[derive(Error, Debug)]
pub enum PestError {
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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Dataset error: {message}")]
    DatasetError { message: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInputError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategoryError { column: String, value: String },

    #[error("Malformed form submission: {reason}")]
    MalformedFormError { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Model,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PestError::ConfigError { .. }
            | PestError::ConfigValidationError { .. }
            | PestError::InvalidConfigValueError { .. }
            | PestError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PestError::CsvError(_) | PestError::DatasetError { .. } => ErrorCategory::Data,
            PestError::TrainingError { .. } => ErrorCategory::Model,
            PestError::InvalidInputError { .. }
            | PestError::UnknownCategoryError { .. }
            | PestError::MalformedFormError { .. } => ErrorCategory::Input,
            PestError::IoError(_) | PestError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Model => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 使用者輸入錯誤 (表單欄位) 對應 HTTP 400，其餘為伺服器錯誤
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Input
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PestError::CsvError(_) => {
                "Check that the dataset is a valid CSV file with the expected header".to_string()
            }
            PestError::IoError(_) => "Check that the file exists and is readable".to_string(),
            PestError::SerializationError(_) => "Check the JSON payload format".to_string(),
            PestError::ConfigError { .. } | PestError::ConfigValidationError { .. } => {
                "Review the configuration file and command line arguments".to_string()
            }
            PestError::InvalidConfigValueError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            PestError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            PestError::DatasetError { .. } => {
                "Make sure the dataset has at least one row and binary pest_infestation labels"
                    .to_string()
            }
            PestError::TrainingError { .. } => {
                "Check the model parameters and the size of the training set".to_string()
            }
            PestError::InvalidInputError { field, .. } => {
                format!("Re-enter the '{}' field and submit again", field)
            }
            PestError::UnknownCategoryError { .. } => {
                "Choose one of the crop types listed on the form".to_string()
            }
            PestError::MalformedFormError { .. } => {
                "Submit the form from the predictor page, filling each field once".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PestError::InvalidInputError { field, value, reason } => {
                format!("The value '{}' for {} is not valid: {}", value, field, reason)
            }
            PestError::UnknownCategoryError { value, .. } => {
                format!("We have no data for crop type '{}'", value)
            }
            PestError::MalformedFormError { reason } => {
                format!("The form submission could not be read: {}", reason)
            }
            PestError::CsvError(_) | PestError::DatasetError { .. } => {
                format!("The training dataset could not be used: {}", self)
            }
            PestError::IoError(_) => format!("A file could not be accessed: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PestError>;
