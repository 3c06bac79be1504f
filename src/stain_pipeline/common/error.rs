use thiserror::Error;

#[derive(Error, Debug)]
pub enum StainError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to access pixel data: {0}")]
    PixelAccess(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Failed to read input file: {0}")]
    InputRead(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StainError {
    pub fn no_image_loaded() -> Self {
        Self::InvalidInput("no image loaded".to_string())
    }

    pub fn non_positive_samples() -> Self {
        Self::InvalidInput("sample count must be positive".to_string())
    }
}

pub type Result<T> = std::result::Result<T, StainError>;
