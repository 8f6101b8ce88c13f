use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Stale write: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl FolioError {
    pub fn missing_field(field: &str) -> Self {
        FolioError::Validation(format!("Missing {}", field))
    }

    /// HTTP-equivalent status code reported by the dispatch boundary.
    pub fn status(&self) -> u16 {
        match self {
            FolioError::Validation(_) => 400,
            FolioError::NotFound(_) => 404,
            FolioError::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Message safe to hand back to a client. Server-side failures collapse
    /// into a generic message; the cause only goes to the log.
    pub fn client_message(&self) -> String {
        match self {
            FolioError::Validation(_) | FolioError::NotFound(_) | FolioError::Conflict(_) => {
                self.to_string()
            }
            _ => "Server error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
