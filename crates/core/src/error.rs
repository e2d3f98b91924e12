use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag assignment failed for document {document_id}: {message}")]
    Assignment { document_id: uuid::Uuid, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TaggerError {
    fn from(e: serde_json::Error) -> Self {
        TaggerError::Serialize(e.to_string())
    }
}
