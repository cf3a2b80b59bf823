//! arith-coder: static arithmetic coding over exact rationals.
//!
//! - A [`Model`] is trained once from a text: each distinct symbol, plus a
//!   terminator, gets a slice of [0, 1) proportional to its frequency
//! - The [`encoder`] narrows a working interval symbol by symbol and emits
//!   bits as they become decided, deferring straddling (E3) bits
//! - The [`decoder`] replays the same narrowing against the code's value and
//!   stops at the terminator
//! - [`packing`] and [`persistence`] store codes and models on disk
//!
//! Model bounds are exact rationals. While coding, the working interval is
//! kept as big-integer numerators over a shared denominator, so the round
//! trip is exact for any input the model covers.

pub mod code;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod interval;
pub mod model;
pub mod packing;
pub mod persistence;

use std::path::Path;

use tracing::debug;

pub use crate::code::Code;
use crate::config::CoderConfig;
pub use crate::decoder::decode;
pub use crate::encoder::encode;
use crate::error::CoderError;
pub use crate::model::{FrequencyTable, Interval, Model, Symbol};
use crate::packing::{CodeFile, WordPacker};

/// Self-contained result of [`Coder::compress`]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressedOutput {
    pub model: Model<char>,
    pub original_size: usize,
    pub compressed_size: usize,
    pub code_bits: usize,
    pub data: Vec<u8>,
    pub ratio: f64,
    pub metadata: CompressionMetadata,
}

/// Metadata about the compression process
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressionMetadata {
    /// Shannon entropy of the text plus terminator, in bits per symbol
    pub entropy_bits: f64,
    pub alphabet_size: usize,
    pub symbol_count: usize,
}

/// Text coder: trains `char` models and encodes, decodes, and stores with them.
///
/// The coder holds only configuration. Models are plain values returned by
/// [`Coder::train`] and passed back in, so one model can be shared by any
/// number of concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct Coder {
    config: CoderConfig,
}

impl Coder {
    /// Create a coder with the given configuration.
    pub fn new(config: CoderConfig) -> Self {
        Self { config }
    }

    /// Train a model on `text` using the configured terminator.
    pub fn train(&self, text: &str) -> Model<char> {
        Model::train(text.chars(), self.config.terminator)
    }

    /// Encode `text` plus the terminator under `model`.
    pub fn encode(&self, text: &str, model: &Model<char>) -> Result<Code, CoderError> {
        encode(text.chars(), model)
    }

    /// Decode `code` back to text, stopping at the terminator.
    pub fn decode(&self, code: &Code, model: &Model<char>) -> Result<String, CoderError> {
        Ok(decode(code, model)?.into_iter().collect())
    }

    /// Train on `text` and encode that same text.
    pub fn train_encode(&self, text: &str) -> Result<(Model<char>, Code), CoderError> {
        let model = self.train(text);
        let code = self.encode(text, &model)?;
        Ok((model, code))
    }

    /// Save `model` to `path` in the configured format.
    pub fn save_model(
        &self,
        model: &Model<char>,
        path: impl AsRef<Path>,
    ) -> Result<(), CoderError> {
        persistence::save(model, path, self.config.model_format)
    }

    /// Load and validate a model saved with [`Coder::save_model`].
    pub fn load_model(&self, path: impl AsRef<Path>) -> Result<Model<char>, CoderError> {
        persistence::load(path, self.config.model_format)
    }

    /// Write `code` to `path` as packed words.
    pub fn write_code(&self, code: &Code, path: impl AsRef<Path>) -> Result<(), CoderError> {
        self.code_file(path)?.write(code)
    }

    /// Read a code file. The result includes the zero padding of the last word.
    pub fn read_code(&self, path: impl AsRef<Path>) -> Result<Code, CoderError> {
        self.code_file(path)?.read()
    }

    /// Train, encode, and bundle the model with the code packed into bytes.
    pub fn compress(&self, text: &str) -> Result<CompressedOutput, CoderError> {
        let (model, code) = self.train_encode(text)?;
        let data = code.to_bytes()?;

        let ratio = if text.is_empty() {
            1.0
        } else {
            data.len() as f64 / text.len() as f64
        };
        let metadata = CompressionMetadata {
            entropy_bits: self.compute_entropy(text),
            alphabet_size: model.len(),
            symbol_count: text.chars().count(),
        };
        debug!(
            original = text.len(),
            compressed = data.len(),
            bits = code.len(),
            "compressed"
        );

        Ok(CompressedOutput {
            model,
            original_size: text.len(),
            compressed_size: data.len(),
            code_bits: code.len(),
            data,
            ratio,
            metadata,
        })
    }

    /// Decode a [`CompressedOutput`] with the model it carries.
    pub fn decompress(&self, output: &CompressedOutput) -> Result<String, CoderError> {
        output.model.validate()?;
        let code = Code::from_bytes(&output.data)?;
        self.decode(&code, &output.model)
    }

    /// Shannon entropy of `text` with the terminator appended, in bits per symbol
    fn compute_entropy(&self, text: &str) -> f64 {
        let table = FrequencyTable::from_symbols(
            text.chars().chain(std::iter::once(self.config.terminator)),
        );
        let len = table.total() as f64;
        let mut entropy = 0.0;
        for (_, count) in table.iter() {
            let p = count as f64 / len;
            entropy -= p * p.log2();
        }
        entropy
    }

    fn code_file(&self, path: impl AsRef<Path>) -> Result<CodeFile, CoderError> {
        let packer = WordPacker::new(self.config.word_payload_bits)?;
        Ok(CodeFile::with_packer(path.as_ref(), packer))
    }
}
