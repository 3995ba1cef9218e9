use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Failed to encode output: {0}")]
    Encode(String),

    #[error("No input documents provided")]
    NoInput,
}
