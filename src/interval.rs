//! Working interval shared by the encoder and decoder
//!
//! Both sides narrow the same interval and apply the same rescaling steps, so
//! keeping the conditions in one place keeps them in lockstep.
//!
//! Bounds are integer numerators over a denominator tracked alongside them.
//! Narrowing multiplies the denominator by the model's scale and rescaling
//! only touches numerators, so nothing is ever reduced. The denominator starts
//! even and stays even, which keeps `1/2` representable for E3.

use num::{BigInt, BigRational, Zero};
use tracing::trace;

/// One renormalization step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// E1: interval lies in [0, 1/2), x -> 2x
    Lower,
    /// E2: interval lies in [1/2, 1), x -> 2x - 1
    Upper,
    /// E3: interval lies in [1/4, 3/4), x -> 2x - 1/2
    Middle,
}

impl Rescale {
    /// Apply the step to `numer / denominator`, returning the new numerator
    /// over the same (even) denominator.
    pub fn apply(self, numer: &BigInt, denominator: &BigInt) -> BigInt {
        let doubled = numer << 1usize;
        match self {
            Rescale::Lower => doubled,
            Rescale::Upper => doubled - denominator,
            Rescale::Middle => doubled - (denominator >> 1usize),
        }
    }
}

/// Current `[low, high)` candidate range, starting at `[0, 1)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingInterval {
    low: BigInt,
    high: BigInt,
    denominator: BigInt,
}

impl Default for WorkingInterval {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingInterval {
    pub fn new() -> Self {
        Self::with_denominator(BigInt::from(2))
    }

    /// `[0, 1)` written over `denominator`, which must be even and positive.
    pub(crate) fn with_denominator(denominator: BigInt) -> Self {
        Self {
            low: BigInt::zero(),
            high: denominator.clone(),
            denominator,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_bounds(low: BigRational, high: BigRational) -> Self {
        use num::Integer;

        let denominator = low.denom().lcm(high.denom()) << 1usize;
        let over = |x: &BigRational| x.numer() * (&denominator / x.denom());
        Self {
            low: over(&low),
            high: over(&high),
            denominator,
        }
    }

    #[cfg(test)]
    pub(crate) fn low(&self) -> BigRational {
        BigRational::new(self.low.clone(), self.denominator.clone())
    }

    #[cfg(test)]
    pub(crate) fn high(&self) -> BigRational {
        BigRational::new(self.high.clone(), self.denominator.clone())
    }

    pub(crate) fn low_numer(&self) -> &BigInt {
        &self.low
    }

    pub(crate) fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// `high - low` over [`WorkingInterval::denominator`]
    pub(crate) fn width_numer(&self) -> BigInt {
        &self.high - &self.low
    }

    /// Shrink to the sub-range `[start/scale, end/scale)` within the current
    /// range. The denominator grows by a factor of `scale`.
    pub fn narrow(&mut self, start: &BigInt, end: &BigInt, scale: &BigInt) {
        let width = self.width_numer();
        let base = &self.low * scale;
        self.high = &base + end * &width;
        self.low = base + start * &width;
        self.denominator *= scale;
    }

    /// `low < 1/4`, the flush decision
    pub(crate) fn low_below_quarter(&self) -> bool {
        (&self.low << 2usize) < self.denominator
    }

    /// The step whose condition currently holds, checked in E1, E2, E3 order.
    pub fn pending_rescale(&self) -> Option<Rescale> {
        let denominator = &self.denominator;
        if (&self.high << 1usize) < *denominator {
            Some(Rescale::Lower)
        } else if (&self.low << 1usize) >= *denominator {
            Some(Rescale::Upper)
        } else if (&self.low << 2usize) >= *denominator
            && (&self.high << 2usize) < denominator * 3
        {
            Some(Rescale::Middle)
        } else {
            None
        }
    }

    /// Apply the next applicable step, if any, and report which one ran.
    pub fn rescale(&mut self) -> Option<Rescale> {
        let step = self.pending_rescale()?;
        self.low = step.apply(&self.low, &self.denominator);
        self.high = step.apply(&self.high, &self.denominator);
        trace!(?step, denominator_bits = self.denominator.bits(), "rescaled");
        Some(step)
    }
}
