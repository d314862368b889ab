/// Result type in bitbuf
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, Copy)]
pub enum Error {
    #[error("codec error {0}")]
    Codec(#[from] CodecError),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("bit buffer {name} overflowed, {total} bits available")]
    Overflow { name: &'static str, total: usize },
    #[error("string exceeds the maximum of {0} bytes")]
    StringTooLong(usize),
    #[error("invalid utf-8 string {0}")]
    InvalidString(#[from] std::str::Utf8Error),
    #[error("string field {0} does not fit in its buffer")]
    StringTruncated(&'static str),
}

/// Category reported to the debug error handler, see [`crate::Config::error_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tried to write a value with too few bits.
    ValueOutOfRange,
    /// Was about to overrun a buffer.
    BufferOverrun,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ValueOutOfRange => write!(f, "value out of range"),
            ErrorKind::BufferOverrun => write!(f, "buffer overrun"),
        }
    }
}
