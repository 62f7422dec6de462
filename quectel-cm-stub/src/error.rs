use std::io;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Stdout is gone, most likely because the reader closed its end of the pipe.
    #[error("failed to write status line: {0}")]
    Write(#[source] io::Error),
    #[error("tick interval must be non-zero")]
    InvalidInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseStatusError {
    #[error("line does not start with a bracketed timestamp")]
    MissingTimestamp,
    #[error("malformed timestamp `{0}`")]
    Timestamp(String),
    #[error("{field} out of range: `{value}`")]
    OutOfRange { field: &'static str, value: String },
    #[error("not a registration state line: `{0}`")]
    UnknownRequest(String),
    #[error("missing `{0}` field")]
    MissingField(&'static str),
    #[error("unexpected fields after DataCap")]
    TrailingFields,
}
