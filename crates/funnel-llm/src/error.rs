use funnel_core::suggestion::GeneratorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("failed to parse model output: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for GeneratorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_timeout() || e.is_connect() => {
                GeneratorError::Unavailable(e.to_string())
            }
            LlmError::Http(e) => GeneratorError::Upstream(e.to_string()),
            LlmError::Upstream { status, body } => {
                GeneratorError::Upstream(format!("HTTP {status}: {body}"))
            }
            LlmError::Parse(msg) => GeneratorError::Malformed(msg),
            LlmError::Config(msg) => GeneratorError::Unavailable(msg),
        }
    }
}
