use thiserror::Error;

#[derive(Debug, Error)]
pub enum LumeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short write: {written} instead of {requested} bytes")]
    ShortWrite { requested: usize, written: usize },

    #[error("Short read: expected {requested} bytes, got {available}")]
    ShortRead { requested: usize, available: usize },

    #[error("Invalid file signature")]
    BadMagic,

    #[error("File variant is '{found}', expected '{expected}'")]
    BadVariant { found: String, expected: String },

    #[error("Unexpectedly long string ({length} bytes, limit {max})")]
    StringTooLong { length: u32, max: u32 },

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid {what} reference {index} (only {count} available)")]
    InvalidReference { what: &'static str, index: u64, count: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type LumeResult<T> = Result<T, LumeError>;
