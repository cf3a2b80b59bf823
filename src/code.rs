//! Arithmetic code: an ordered bit sequence with no length prefix
//!
//! The decoder stops at the terminator, so any zero bits appended after the
//! emitted ones (by byte or word padding) are harmless.

use std::fmt;
use std::io;
use std::str::FromStr;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use num::{BigInt, BigRational, One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::CoderError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn into_bits(self) -> Vec<bool> {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Append `bit` followed by `count` copies of its complement.
    pub fn push_with_followers(&mut self, bit: bool, count: usize) {
        self.bits.reserve(count + 1);
        self.bits.push(bit);
        self.bits.extend(std::iter::repeat(!bit).take(count));
    }

    /// The bits read as one unsigned integer, most significant first
    pub fn numerator(&self) -> BigInt {
        let mut numer = BigInt::zero();
        for &bit in &self.bits {
            numer <<= 1usize;
            if bit {
                numer += 1;
            }
        }
        numer
    }

    /// The bits read as a binary fraction `0.b0 b1 b2 ...`
    pub fn value(&self) -> BigRational {
        BigRational::new(self.numerator(), BigInt::one() << self.bits.len())
    }

    /// Pack MSB-first into bytes, zero-padding the last one.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoderError> {
        let capacity = self.bits.len().div_ceil(8);
        let mut writer = BitWriter::endian(Vec::with_capacity(capacity), BigEndian);
        for &bit in &self.bits {
            writer.write_bit(bit)?;
        }
        writer.byte_align()?;
        Ok(writer.into_writer())
    }

    /// Inverse of [`Code::to_bytes`]; padding bits come back as zeros.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoderError> {
        let mut reader = BitReader::endian(io::Cursor::new(bytes), BigEndian);
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for _ in 0..bytes.len() * 8 {
            bits.push(reader.read_bit()?);
        }
        Ok(Self { bits })
    }
}

impl From<Vec<bool>> for Code {
    fn from(bits: Vec<bool>) -> Self {
        Self::from_bits(bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = CoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(CoderError::InvalidBit { position, found }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_bits)
    }
}
