use thiserror::Error;

#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("Carrier request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Carrier authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Carrier rejected the request: {message}")]
    CarrierError {
        message: String,
        payload: Option<serde_json::Value>,
    },

    #[error("Precondition not met: {message}")]
    PreconditionError { message: String },

    #[error("Not found: {message}")]
    NotFoundError { message: String },

    #[error("Invalid config value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl FulfillmentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn carrier(message: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self::CarrierError {
            message: message.into(),
            payload,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;
