//! Configuration for arith-coder

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoderError;

/// On-disk encoding used when persisting a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFormat {
    Bincode,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderConfig {
    pub terminator: char,
    pub word_payload_bits: u32,
    pub model_format: ModelFormat,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            terminator: '\0',
            word_payload_bits: 31,
            model_format: ModelFormat::Bincode,
        }
    }
}

impl CoderConfig {
    /// Read a configuration written as JSON. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoderError> {
        let raw = std::fs::read(path)?;
        serde_json::from_slice(&raw).map_err(|e| CoderError::SerializationError(e.to_string()))
    }
}
