//!
//! Comparators and row bounds.
//!
//! An equation compares two expressions with a [Comparator]. When the equation is brought to
//! standard form (see [crate::constraint::StandardForm]) all variable terms end up on one side as
//! the row `Σ (right - left)·x`, and all constants on the other as `c = left.constant -
//! right.constant`. The comparator then becomes a [Bound] on that row:
//!
//! | Equation | Standard form | Bound |
//! |---|---|---|
//! | `left = right` | `row = c` | [Bound::Equal] |
//! | `left < right` | `row ≥ c` | [Bound::Min]   |
//! | `left > right` | `row ≤ c` | [Bound::Max]   |
//!
//! All comparisons are non-strict; `<` means "at most" and `>` means "at least".

use std::fmt;
use serde::{Deserialize, Serialize};

/// Comparison between the two sides of an equation. Comparisons are non-strict.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// `left = right`
    Equal,
    /// `left ≤ right`
    LessThan,
    /// `left ≥ right`
    GreaterThan,
}

/// Bound on a standard form row `Σ aᵢ·xᵢ`.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Row is fixed to the value.
    Equal(f64),
    /// Row is at least the value.
    Min(f64),
    /// Row is at most the value.
    Max(f64),
}

impl Comparator {
    /// The bound on the row `Σ (right - left)·x` when the constant side is `constant`.
    pub fn bound(self, constant : f64) -> Bound {
        match self {
            Comparator::Equal       => Bound::Equal(constant),
            Comparator::LessThan    => Bound::Min(constant),
            Comparator::GreaterThan => Bound::Max(constant),
        }
    }

    /// Symbol used when printing equations.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal       => "=",
            Comparator::LessThan    => "<",
            Comparator::GreaterThan => ">",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.symbol()) }
}

impl Bound {
    /// The bound as a closed interval `(lower,upper)`, using infinities for open ends.
    pub fn interval(self) -> (f64,f64) {
        match self {
            Bound::Equal(c) => (c,c),
            Bound::Min(c)   => (c,f64::INFINITY),
            Bound::Max(c)   => (f64::NEG_INFINITY,c),
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Bound::Equal(c) | Bound::Min(c) | Bound::Max(c) => c
        }
    }

    /// Check whether a row activity satisfies the bound within `tol`.
    pub fn contains(self, activity : f64, tol : f64) -> bool {
        let (lb,ub) = self.interval();
        activity >= lb - tol && activity <= ub + tol
    }
}

/// Comparator for `left = right`.
pub fn equal_to() -> Comparator { Comparator::Equal }
/// Comparator for `left ≤ right`.
pub fn less_than() -> Comparator { Comparator::LessThan }
/// Comparator for `left ≥ right`.
pub fn greater_than() -> Comparator { Comparator::GreaterThan }
