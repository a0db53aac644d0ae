use thiserror::Error;

/// Raised when a stream cannot be read back into a value: the buffer ran
/// out, a string was not UTF-8, or an encoded tag was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed bit stream")]
pub struct SerdeErr;
