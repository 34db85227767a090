use thiserror::Error;

#[derive(Debug, Error)]
pub enum FunnelError {
    #[error("not initialized: run 'funnel init'")]
    NotInitialized,

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("persona not found: {0}")]
    PersonaNotFound(String),

    #[error("content asset not found: {0}")]
    AssetNotFound(String),

    #[error("suggestion not found: {0}")]
    SuggestionNotFound(String),

    #[error("invalid stage '{0}': expected one of discover, resonate, envision, trust, authority")]
    InvalidStage(String),

    #[error("invalid step '{0}'")]
    InvalidStep(String),

    #[error("invalid tone '{0}': expected professional, friendly or bold")]
    InvalidTone(String),

    #[error(
        "storage quota exceeded writing '{key}' ({needed} bytes needed, {quota} allowed): clear saved data and try again"
    )]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FunnelError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        FunnelError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for failures of the durable write path rather than of the request.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            FunnelError::QuotaExceeded { .. } | FunnelError::Storage(_) | FunnelError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FunnelError>;
