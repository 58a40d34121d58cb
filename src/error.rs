use thiserror::Error;

/// Main error type for the Matroska decoder
#[derive(Error, Debug)]
pub enum MatroskaError {
    /// A fault reported by the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-length read ran out of input before it was satisfied
    #[error("Truncated input at offset {offset}: wanted {wanted} bytes, got {got}")]
    Truncated { offset: u64, wanted: u64, got: u64 },

    /// A fixed-width integer was declared wider than 64 bits
    #[error("Integer too wide: {0} bytes")]
    IntegerTooWide(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MatroskaError>;
