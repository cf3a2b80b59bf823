//! Model persistence
//!
//! Models are written as bincode or JSON. Bounds are stored as numerator and
//! denominator pairs; deserializing reduces them and `from_bytes` validates the
//! result.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ModelFormat;
use crate::error::CoderError;
use crate::model::{Model, Symbol};

pub fn to_bytes<S>(model: &Model<S>, format: ModelFormat) -> Result<Vec<u8>, CoderError>
where
    S: Symbol + Serialize,
{
    match format {
        ModelFormat::Bincode => {
            bincode::serialize(model).map_err(|e| CoderError::SerializationError(e.to_string()))
        }
        ModelFormat::Json => serde_json::to_vec_pretty(model)
            .map_err(|e| CoderError::SerializationError(e.to_string())),
    }
}

pub fn from_bytes<S>(bytes: &[u8], format: ModelFormat) -> Result<Model<S>, CoderError>
where
    S: Symbol + DeserializeOwned,
{
    let model: Model<S> = match format {
        ModelFormat::Bincode => bincode::deserialize(bytes)
            .map_err(|e| CoderError::SerializationError(e.to_string()))?,
        ModelFormat::Json => serde_json::from_slice(bytes)
            .map_err(|e| CoderError::SerializationError(e.to_string()))?,
    };
    model.validate()?;
    Ok(model)
}

/// Write `model` to `path`, replacing any existing file.
pub fn save<S>(
    model: &Model<S>,
    path: impl AsRef<Path>,
    format: ModelFormat,
) -> Result<(), CoderError>
where
    S: Symbol + Serialize,
{
    let path = path.as_ref();
    let bytes = to_bytes(model, format)?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), ?format, bytes = bytes.len(), "saved model");
    Ok(())
}

pub fn load<S>(path: impl AsRef<Path>, format: ModelFormat) -> Result<Model<S>, CoderError>
where
    S: Symbol + DeserializeOwned,
{
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let model = from_bytes(&bytes, format)?;
    debug!(path = %path.display(), ?format, entries = model.len(), "loaded model");
    Ok(model)
}
