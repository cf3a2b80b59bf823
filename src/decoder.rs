//! Decoding half of the arithmetic coder
//!
//! The whole code is read up front as one exact binary fraction. The decoder
//! then replays the encoder's narrowing and rescaling, applying each rescale
//! to the value as well so it stays in the coordinates of the working interval.
//! The value shares the interval's denominator, starting at `2^(bits + 1)`.

use num::{BigInt, One, ToPrimitive};
use tracing::debug;

use crate::code::Code;
use crate::error::CoderError;
use crate::interval::WorkingInterval;
use crate::model::{Model, Symbol};

/// Decode `code` up to the model's terminator, which is not returned.
pub fn decode<S: Symbol>(code: &Code, model: &Model<S>) -> Result<Vec<S>, CoderError> {
    let mut decoder = Decoder::new(code, model);
    let mut symbols = Vec::new();
    while let Some(symbol) = decoder.next_symbol()? {
        symbols.push(symbol);
    }
    debug!(
        symbols = symbols.len(),
        bits = code.len(),
        "decoded"
    );
    Ok(symbols)
}

/// Upper bound on how many symbols, terminator included, a code of `bits`
/// bits can carry under `model`.
///
/// Every symbol costs at least `-log2(p_max)` bits of information and the
/// encoder emits more than the total information minus two bits. Decoding
/// past this bound means the terminator is never coming.
pub fn symbol_limit<S: Symbol>(model: &Model<S>, bits: usize) -> Option<usize> {
    let p_max = model.max_probability().to_f64()?;
    if p_max <= 0.0 {
        return None;
    }
    if p_max >= 1.0 {
        // a full-width entry is the only entry
        return Some(1);
    }
    let info = -p_max.log2();
    Some(((bits as f64 + 2.0) / info).floor() as usize + 2)
}

/// Incremental decoder over a complete code
#[derive(Debug)]
pub struct Decoder<'m, S> {
    model: &'m Model<S>,
    interval: WorkingInterval,
    value: BigInt,
    decoded: usize,
    limit: Option<usize>,
    finished: bool,
}

impl<'m, S: Symbol> Decoder<'m, S> {
    pub fn new(code: &Code, model: &'m Model<S>) -> Self {
        let denominator = BigInt::one() << (code.len() + 1);
        Self {
            model,
            interval: WorkingInterval::with_denominator(denominator),
            value: code.numerator() << 1usize,
            decoded: 0,
            limit: symbol_limit(model, code.len()),
            finished: false,
        }
    }

    /// Decode the next symbol, or `None` once the terminator has been read.
    pub fn next_symbol(&mut self) -> Result<Option<S>, CoderError> {
        if self.finished {
            return Ok(None);
        }
        if let Some(limit) = self.limit {
            if self.decoded >= limit {
                return Err(CoderError::MissingTerminator {
                    decoded: self.decoded,
                });
            }
        }

        let model = self.model;
        let offset = &self.value - self.interval.low_numer();
        let width = self.interval.width_numer();
        let index = model.index_containing(&offset, &width).ok_or_else(|| {
            CoderError::ValueOutOfRange {
                value: format!("{offset}/{width}"),
            }
        })?;
        let (symbol, _) = model.entry(index);
        self.decoded += 1;

        if symbol == model.terminator() {
            self.finished = true;
            return Ok(None);
        }

        let (start, end) = model.scaled_bounds(index);
        self.interval.narrow(start, end, model.scale());
        self.value *= model.scale();
        while let Some(step) = self.interval.rescale() {
            self.value = step.apply(&self.value, self.interval.denominator());
        }
        Ok(Some(symbol.clone()))
    }
}

impl<S: Symbol> Iterator for Decoder<'_, S> {
    type Item = Result<S, CoderError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_symbol() {
            Ok(symbol) => symbol.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
