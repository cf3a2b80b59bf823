//! Static statistical model
//!
//! A model maps every symbol of a training sequence, plus a terminator, onto a
//! half-open interval of [0, 1). Widths are proportional to occurrence counts
//! and intervals are laid out in order of first appearance, so two trainings on
//! the same input always produce the same layout. All bounds are exact rationals.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use num::{BigInt, BigRational, Integer, One, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoderError;

/// Anything that can be counted and looked up in a [`Model`].
pub trait Symbol: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Symbol for T {}

/// Half-open interval `[start, end)` of probability mass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    start: BigRational,
    end: BigRational,
}

impl Interval {
    pub fn new(start: BigRational, end: BigRational) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> &BigRational {
        &self.start
    }

    pub fn end(&self) -> &BigRational {
        &self.end
    }

    pub fn width(&self) -> BigRational {
        &self.end - &self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Occurrence counts kept in order of first appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S> {
    counts: Vec<(S, u64)>,
    total: u64,
}

impl<S: Symbol> FrequencyTable<S> {
    /// Count every symbol in a single pass.
    pub fn from_symbols(symbols: impl IntoIterator<Item = S>) -> Self {
        let mut index: HashMap<S, usize> = HashMap::new();
        let mut counts: Vec<(S, u64)> = Vec::new();
        let mut total = 0u64;

        for symbol in symbols {
            total += 1;
            match index.get(&symbol) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(symbol.clone(), counts.len());
                    counts.push((symbol, 1));
                }
            }
        }

        Self { counts, total }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> + '_ {
        self.counts.iter().map(|(symbol, count)| (symbol, *count))
    }

    pub fn count(&self, symbol: &S) -> u64 {
        self.counts
            .iter()
            .find(|(s, _)| s == symbol)
            .map_or(0, |(_, count)| *count)
    }

    /// Number of symbols scanned, repeats included
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Trained symbol -> interval table. Immutable once built.
///
/// Besides the rational bounds, the model keeps every bound as an integer
/// numerator over one common denominator (`scale`), which is what the coder
/// narrows with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "ModelRecord<S>",
    into = "ModelRecord<S>",
    bound(
        serialize = "S: Symbol + Serialize",
        deserialize = "S: Symbol + Deserialize<'de>"
    )
)]
pub struct Model<S> {
    entries: Vec<(S, Interval)>,
    terminator: S,
    scaled: Vec<(BigInt, BigInt)>,
    scale: BigInt,
}

/// On-disk form of a [`Model`]: the rational table only
#[derive(Serialize, Deserialize)]
struct ModelRecord<S> {
    entries: Vec<(S, Interval)>,
    terminator: S,
}

impl<S: Symbol> From<ModelRecord<S>> for Model<S> {
    fn from(record: ModelRecord<S>) -> Self {
        let entries = record
            .entries
            .into_iter()
            .map(|(symbol, interval)| {
                let interval = Interval::new(interval.start.reduced(), interval.end.reduced());
                (symbol, interval)
            })
            .collect();
        Self::from_parts(entries, record.terminator)
    }
}

impl<S> From<Model<S>> for ModelRecord<S> {
    fn from(model: Model<S>) -> Self {
        Self {
            entries: model.entries,
            terminator: model.terminator,
        }
    }
}

impl<S: Symbol> Model<S> {
    /// Build a model from `symbols` with `terminator` appended once.
    ///
    /// The terminator must not occur in `symbols`; this is not checked.
    pub fn train(symbols: impl IntoIterator<Item = S>, terminator: S) -> Self {
        let augmented = symbols
            .into_iter()
            .chain(std::iter::once(terminator.clone()));
        let table = FrequencyTable::from_symbols(augmented);

        let total = BigInt::from(table.total());
        let mut entries = Vec::with_capacity(table.len());
        let mut start = BigRational::zero();
        for (symbol, count) in table.iter() {
            let end = &start + BigRational::new(BigInt::from(count), total.clone());
            entries.push((symbol.clone(), Interval::new(start, end.clone())));
            start = end;
        }

        debug!(
            alphabet = entries.len(),
            augmented_len = table.total(),
            "trained model"
        );

        Self::from_parts(entries, terminator)
    }

    /// Bounds must be in lowest terms.
    fn from_parts(entries: Vec<(S, Interval)>, terminator: S) -> Self {
        let scale = entries.iter().fold(BigInt::one(), |scale, (_, interval)| {
            scale
                .lcm(interval.start.denom())
                .lcm(interval.end.denom())
        });
        let scaled = entries
            .iter()
            .map(|(_, interval)| {
                let start = interval.start.numer() * (&scale / interval.start.denom());
                let end = interval.end.numer() * (&scale / interval.end.denom());
                (start, end)
            })
            .collect();
        Self {
            entries,
            terminator,
            scaled,
            scale,
        }
    }

    pub fn terminator(&self) -> &S {
        &self.terminator
    }

    /// Entries in layout order
    pub fn entries(&self) -> impl Iterator<Item = (&S, &Interval)> + '_ {
        self.entries.iter().map(|(symbol, interval)| (symbol, interval))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn interval(&self, symbol: &S) -> Option<&Interval> {
        self.index_of(symbol).map(|index| self.entry(index).1)
    }

    /// Find the entry whose interval contains `value`.
    ///
    /// Entries are scanned in layout order and the first match wins.
    pub fn lookup(&self, value: &BigRational) -> Result<(&S, &Interval), CoderError> {
        self.index_containing(value.numer(), value.denom())
            .map(|index| self.entry(index))
            .ok_or_else(|| CoderError::ValueOutOfRange {
                value: value.to_string(),
            })
    }

    /// Index of the first entry containing `numer / denom`. `denom` must be
    /// positive. Compares by cross-multiplying, never reducing.
    pub(crate) fn index_containing(&self, numer: &BigInt, denom: &BigInt) -> Option<usize> {
        let scaled = numer * &self.scale;
        self.scaled
            .iter()
            .position(|(start, end)| start * denom <= scaled && scaled < end * denom)
    }

    pub(crate) fn index_of(&self, symbol: &S) -> Option<usize> {
        self.entries.iter().position(|(s, _)| s == symbol)
    }

    pub(crate) fn entry(&self, index: usize) -> (&S, &Interval) {
        let (symbol, interval) = &self.entries[index];
        (symbol, interval)
    }

    /// Bounds of entry `index` as numerators over [`Model::scale`]
    pub(crate) fn scaled_bounds(&self, index: usize) -> (&BigInt, &BigInt) {
        let (start, end) = &self.scaled[index];
        (start, end)
    }

    /// Common denominator of every bound
    pub(crate) fn scale(&self) -> &BigInt {
        &self.scale
    }

    /// Width of the widest interval
    pub fn max_probability(&self) -> BigRational {
        self.entries
            .iter()
            .map(|(_, interval)| interval.width())
            .max()
            .unwrap_or_else(BigRational::zero)
    }

    /// Check that the intervals tile [0, 1) in order and the terminator is present.
    pub fn validate(&self) -> Result<(), CoderError> {
        let first = self
            .entries
            .first()
            .ok_or_else(|| CoderError::MalformedModel("model has no entries".into()))?;
        if !first.1.start.is_zero() {
            return Err(CoderError::MalformedModel(format!(
                "first interval starts at {}",
                first.1.start
            )));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        for (i, (symbol, interval)) in self.entries.iter().enumerate() {
            if interval.start >= interval.end {
                return Err(CoderError::MalformedModel(format!(
                    "empty interval {interval} for {symbol:?}"
                )));
            }
            if let Some((_, next)) = self.entries.get(i + 1) {
                if interval.end != next.start {
                    return Err(CoderError::MalformedModel(format!(
                        "interval {interval} is not followed by one starting at {}",
                        interval.end
                    )));
                }
            }
            if !seen.insert(symbol) {
                return Err(CoderError::MalformedModel(format!(
                    "duplicate symbol {symbol:?}"
                )));
            }
        }

        if let Some((_, last)) = self.entries.last() {
            if !last.end.is_one() {
                return Err(CoderError::MalformedModel(format!(
                    "last interval ends at {}",
                    last.end
                )));
            }
        }
        if !seen.contains(&&self.terminator) {
            return Err(CoderError::MalformedModel(format!(
                "terminator {:?} has no interval",
                self.terminator
            )));
        }
        Ok(())
    }
}
