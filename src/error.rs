//! Error types for arith-coder

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoderError {
    #[error("symbol {symbol} is not present in the model")]
    UnknownSymbol { symbol: String },

    #[error("value {value} is not inside any model interval")]
    ValueOutOfRange { value: String },

    #[error("no terminator after decoding {decoded} symbols")]
    MissingTerminator { decoded: usize },

    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    #[error("packed code of {len} bytes is not a whole number of 4-byte words")]
    TruncatedWord { len: usize },

    #[error("packed word {index} has its unused high bit set: {word}")]
    InvalidWord { index: usize, word: i32 },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
