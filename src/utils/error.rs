use thiserror::Error;

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing credential: {name} is not set")]
    MissingCredential { name: String },

    #[error("Vector index '{index_name}' does not exist. Create it first.")]
    IndexNotFound { index_name: String },

    #[error("{service} responded with status {status}: {body}")]
    RemoteStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    #[error("Unknown preference key: {key}")]
    UnknownPreferenceKey { key: String },

    #[error("Invalid value for preference '{key}': {reason}")]
    InvalidPreferenceValue { key: String, reason: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RemoteService,
    Conversation,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TravelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TravelError::MissingCredential { .. }
            | TravelError::ConfigValidationError { .. }
            | TravelError::InvalidConfigValueError { .. }
            | TravelError::IndexNotFound { .. } => ErrorCategory::Configuration,
            TravelError::ApiError(_) | TravelError::IoError(_) => ErrorCategory::Network,
            TravelError::RemoteStatus { .. } | TravelError::InvalidResponse { .. } => {
                ErrorCategory::RemoteService
            }
            TravelError::UnknownPreferenceKey { .. }
            | TravelError::InvalidPreferenceValue { .. }
            | TravelError::UnknownTool { .. }
            | TravelError::InvalidToolArguments { .. } => ErrorCategory::Conversation,
            TravelError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conversation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::RemoteService => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Message suitable for showing to the traveller instead of the raw error.
    pub fn user_friendly_message(&self) -> String {
        match self {
            TravelError::MissingCredential { name } => {
                format!("Please provide {} before starting the assistant.", name)
            }
            TravelError::IndexNotFound { index_name } => {
                format!("The travel knowledge base '{}' is not available.", index_name)
            }
            TravelError::ApiError(_) | TravelError::RemoteStatus { .. } => {
                "A remote service could not be reached.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TravelError::MissingCredential { .. } => {
                "Export OPENAI_API_KEY, PINECONE_API_KEY and OPENWEATHER_API_KEY"
            }
            TravelError::IndexNotFound { .. } => {
                "Create the Pinecone index or pass --index-name with an existing one"
            }
            TravelError::ConfigValidationError { .. }
            | TravelError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line flags"
            }
            TravelError::ApiError(_)
            | TravelError::RemoteStatus { .. }
            | TravelError::InvalidResponse { .. } => {
                "Check your network connection and API keys, then try again"
            }
            TravelError::UnknownPreferenceKey { .. } => {
                "Use one of: travel_dates, interests, locked_locations"
            }
            _ => "Try rephrasing the request",
        }
    }
}

pub type Result<T> = std::result::Result<T, TravelError>;
