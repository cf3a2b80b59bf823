//! Word packing for code files
//!
//! A code is cut into windows of `payload_bits` bits (31 by default), the last
//! window zero-padded, and each window stored as a signed 4-byte word in host
//! byte order. The high bit of every word is therefore always clear.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::code::Code;
use crate::error::CoderError;

const WORD_BYTES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPacker {
    payload_bits: u32,
}

impl Default for WordPacker {
    fn default() -> Self {
        Self { payload_bits: 31 }
    }
}

impl WordPacker {
    pub fn new(payload_bits: u32) -> Result<Self, CoderError> {
        if !(1..=31).contains(&payload_bits) {
            return Err(CoderError::InvalidConfig(format!(
                "word payload must be 1..=31 bits, got {payload_bits}"
            )));
        }
        Ok(Self { payload_bits })
    }

    pub fn payload_bits(&self) -> u32 {
        self.payload_bits
    }

    pub fn pack(&self, code: &Code) -> Vec<u8> {
        let width = self.payload_bits as usize;
        let mut bytes = Vec::with_capacity(code.len().div_ceil(width) * WORD_BYTES);
        for window in code.bits().chunks(width) {
            let mut word = window
                .iter()
                .fold(0i32, |acc, &bit| (acc << 1) | i32::from(bit));
            word <<= width - window.len();
            bytes.extend_from_slice(&word.to_ne_bytes());
        }
        bytes
    }

    /// Unpack every word in full, padding included.
    pub fn unpack(&self, bytes: &[u8]) -> Result<Code, CoderError> {
        if bytes.len() % WORD_BYTES != 0 {
            return Err(CoderError::TruncatedWord { len: bytes.len() });
        }

        let width = self.payload_bits as usize;
        let mut bits = Vec::with_capacity(bytes.len() / WORD_BYTES * width);
        for (index, chunk) in bytes.chunks_exact(WORD_BYTES).enumerate() {
            let word = i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if word < 0 || (word >> width) != 0 {
                return Err(CoderError::InvalidWord { index, word });
            }
            bits.extend((0..width).rev().map(|shift| (word >> shift) & 1 == 1));
        }
        Ok(Code::from_bits(bits))
    }
}

/// A code stored on disk as packed words
#[derive(Debug, Clone)]
pub struct CodeFile {
    path: PathBuf,
    packer: WordPacker,
}

impl CodeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_packer(path, WordPacker::default())
    }

    pub fn with_packer(path: impl Into<PathBuf>, packer: WordPacker) -> Self {
        Self {
            path: path.into(),
            packer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, code: &Code) -> Result<(), CoderError> {
        let bytes = self.packer.pack(code);
        std::fs::write(&self.path, &bytes)?;
        debug!(
            path = %self.path.display(),
            bits = code.len(),
            bytes = bytes.len(),
            payload_bits = self.packer.payload_bits(),
            "wrote code"
        );
        Ok(())
    }

    pub fn read(&self) -> Result<Code, CoderError> {
        let bytes = std::fs::read(&self.path)?;
        let code = self.packer.unpack(&bytes)?;
        debug!(path = %self.path.display(), bits = code.len(), "read code");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_pads_last_window() {
        let code: Code = "0101".parse().unwrap();
        let bytes = WordPacker::default().pack(&code);
        assert_eq!(bytes.len(), 4);
        let word = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(word, 0b0101 << 27);
    }

    #[test]
    fn test_unpack_returns_full_windows() {
        let code: Code = "0101".parse().unwrap();
        let packer = WordPacker::default();
        let unpacked = packer.unpack(&packer.pack(&code)).unwrap();
        assert_eq!(unpacked.len(), 31);
        assert_eq!(unpacked.to_string(), format!("0101{}", "0".repeat(27)));
    }

    #[test]
    fn test_multiple_words() {
        let text = "1".repeat(31) + "10";
        let code: Code = text.parse().unwrap();
        let packer = WordPacker::default();
        let bytes = packer.pack(&code);
        assert_eq!(bytes.len(), 8);
        let first = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(first, i32::MAX);

        let unpacked = packer.unpack(&bytes).unwrap();
        assert_eq!(&unpacked.bits()[..33], code.bits());
        assert!(unpacked.bits()[33..].iter().all(|&bit| !bit));
    }

    #[test]
    fn test_empty_code_packs_to_nothing() {
        let packer = WordPacker::default();
        assert!(packer.pack(&Code::new()).is_empty());
        assert!(packer.unpack(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let result = WordPacker::default().unpack(&[0, 0, 0]);
        assert!(matches!(result, Err(CoderError::TruncatedWord { len: 3 })));
    }

    #[test]
    fn test_negative_word_rejected() {
        let bytes = (-1i32).to_ne_bytes();
        let result = WordPacker::default().unpack(&bytes);
        assert!(matches!(
            result,
            Err(CoderError::InvalidWord { index: 0, word: -1 })
        ));
    }

    #[test]
    fn test_narrow_payload() {
        let packer = WordPacker::new(8).unwrap();
        assert_eq!(packer.payload_bits(), 8);
        let code: Code = "110".parse().unwrap();
        let bytes = packer.pack(&code);
        let word = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(word, 0b1100_0000);
        assert_eq!(packer.unpack(&bytes).unwrap().to_string(), "11000000");

        let wide = 0x1FFi32.to_ne_bytes();
        assert!(matches!(
            packer.unpack(&wide),
            Err(CoderError::InvalidWord { .. })
        ));
    }

    #[test]
    fn test_payload_bounds() {
        assert!(WordPacker::new(0).is_err());
        assert!(WordPacker::new(32).is_err());
        assert_eq!(WordPacker::new(31).unwrap(), WordPacker::default());
    }

    #[test]
    fn test_code_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = CodeFile::new(dir.path().join("code.bin"));
        let code: Code = "0010110111".parse().unwrap();
        file.write(&code).unwrap();

        let read = file.read().unwrap();
        assert_eq!(&read.bits()[..code.len()], code.bits());
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 4);
    }

    #[test]
    fn test_missing_code_file() {
        let file = CodeFile::new("/nonexistent/arith-coder/code.bin");
        assert!(matches!(file.read(), Err(CoderError::IoError(_))));
    }
}
