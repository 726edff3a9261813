/// Errors that can occur while decoding a flat transport.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An entry addresses a position whose existing container has the wrong
    /// shape (descending into a scalar, or a named key inside a list).
    #[error("key '{key}' conflicts with an existing value at segment '{segment}'")]
    ShapeConflict { key: String, segment: String },

    /// A `key=value` field specification could not be parsed.
    #[error("invalid field '{0}' (expected key=value)")]
    InvalidField(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
