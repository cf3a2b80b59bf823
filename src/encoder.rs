//! Encoding half of the arithmetic coder
//!
//! The interval is kept exact, so the only state beyond `[low, high)` is the
//! count of pending bits deferred by middle-half (E3) rescales.

use tracing::debug;

use crate::code::Code;
use crate::error::CoderError;
use crate::interval::{Rescale, WorkingInterval};
use crate::model::{Model, Symbol};

/// Encode `symbols` followed by the model's terminator.
pub fn encode<S: Symbol>(
    symbols: impl IntoIterator<Item = S>,
    model: &Model<S>,
) -> Result<Code, CoderError> {
    let mut encoder = Encoder::new(model);
    for symbol in symbols {
        encoder.encode(&symbol)?;
    }
    encoder.finish()
}

/// Incremental encoder borrowing a trained [`Model`]
#[derive(Debug)]
pub struct Encoder<'m, S> {
    model: &'m Model<S>,
    interval: WorkingInterval,
    pending: usize,
    code: Code,
    symbols: usize,
}

impl<'m, S: Symbol> Encoder<'m, S> {
    pub fn new(model: &'m Model<S>) -> Self {
        Self {
            model,
            interval: WorkingInterval::new(),
            pending: 0,
            code: Code::new(),
            symbols: 0,
        }
    }

    /// Narrow the interval to `symbol` and emit every bit that became decided.
    pub fn encode(&mut self, symbol: &S) -> Result<(), CoderError> {
        let index = self
            .model
            .index_of(symbol)
            .ok_or_else(|| CoderError::UnknownSymbol {
                symbol: format!("{symbol:?}"),
            })?;
        let (start, end) = self.model.scaled_bounds(index);
        self.interval.narrow(start, end, self.model.scale());
        self.symbols += 1;

        while let Some(step) = self.interval.rescale() {
            match step {
                Rescale::Lower => self.emit(false),
                Rescale::Upper => self.emit(true),
                Rescale::Middle => self.pending += 1,
            }
        }
        Ok(())
    }

    /// Bits emitted so far
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Encode the terminator and resolve the pending bits.
    pub fn finish(mut self) -> Result<Code, CoderError> {
        let terminator = self.model.terminator().clone();
        self.encode(&terminator)?;
        self.flush();

        debug!(
            symbols = self.symbols,
            bits = self.code.len(),
            "encoded"
        );
        Ok(self.code)
    }

    /// One more pending bit plus a decisive bit pick a point inside the final
    /// range whichever way the remaining bits are padded.
    fn flush(&mut self) {
        self.pending += 1;
        let bit = !self.interval.low_below_quarter();
        self.emit(bit);
    }

    fn emit(&mut self, bit: bool) {
        self.code.push_with_followers(bit, self.pending);
        self.pending = 0;
    }
}
