use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Model parameters have the wrong shape or hold invalid probabilities.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("sequence length mismatch: {observations} observations, {states} states")]
    LengthMismatch { observations: usize, states: usize },
    #[error("empty sequence")]
    EmptySequence,
    /// An observation or state index beyond the declared alphabet size.
    #[error("{kind} {value} out of range (size: {size})")]
    OutOfRange {
        kind: &'static str,
        value: usize,
        size: usize,
    },
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("invalid parameter: {name}={value}")]
    InvalidParameter { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
