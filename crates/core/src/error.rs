use thiserror::Error;

pub type CreativeResult<T> = Result<T, CreativeError>;

#[derive(Error, Debug)]
pub enum CreativeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid audience persona: {0}")]
    InvalidPersona(String),

    #[error("Invalid product metadata: {0}")]
    InvalidProduct(String),

    #[error("Invalid brand guidelines: {0}")]
    InvalidGuidelines(String),

    #[error("Unknown {kind} tag: '{value}'")]
    UnknownTag { kind: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
