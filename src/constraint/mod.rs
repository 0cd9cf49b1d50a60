use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{Bound, Comparator};
use crate::expr::{IntoLinear, LinearExpression, Variable};

/// A comparison `left (=,<,>) right` between two affine expressions.
#[derive(Clone,Debug,PartialEq)]
pub struct LinearEquation {
    left       : LinearExpression,
    comparator : Comparator,
    right      : LinearExpression,
}

/// An equation rearranged as `constant (comparator) Σ terms`, i.e. with every variable term on
/// the right and every constant on the left.
#[derive(Clone,Debug,PartialEq)]
pub struct StandardForm {
    pub constant   : f64,
    pub terms      : BTreeMap<Variable,f64>,
    pub comparator : Comparator,
}

impl LinearEquation {
    pub fn new<L,R>(left : L, comparator : Comparator, right : R) -> LinearEquation
        where
            L : IntoLinear,
            R : IntoLinear
    {
        LinearEquation{
            left       : left.into_linear(),
            comparator,
            right      : right.into_linear()
        }
    }

    pub fn left(&self) -> &LinearExpression { &self.left }
    pub fn right(&self) -> &LinearExpression { &self.right }
    pub fn comparator(&self) -> Comparator { self.comparator }

    /// Rearrange `A + Σ l·x (cmp) D + Σ r·x` into `A - D (cmp) Σ (r - l)·x`.
    pub fn to_standard_form(&self) -> StandardForm {
        let (rconst,mut terms) = self.right.clone().into_parts();
        for (v,c) in self.left.terms() {
            *terms.entry(v.to_string()).or_insert(0.0) -= c;
        }
        StandardForm{
            constant   : self.left.constant() - rconst,
            terms,
            comparator : self.comparator
        }
    }

    /// Bound on the standard form row.
    pub fn bound(&self) -> Bound {
        self.comparator.bound(self.left.constant() - self.right.constant())
    }

    /// Check the equation at a point within tolerance `tol`. Missing variables count as 0.
    pub fn is_satisfied(&self, values : &BTreeMap<Variable,f64>, tol : f64) -> bool {
        let l = self.left.evaluate(values);
        let r = self.right.evaluate(values);
        match self.comparator {
            Comparator::Equal       => (l - r).abs() <= tol,
            Comparator::LessThan    => l <= r + tol,
            Comparator::GreaterThan => l + tol >= r,
        }
    }
}

impl StandardForm {
    pub fn bound(&self) -> Bound { self.comparator.bound(self.constant) }
}

impl fmt::Display for LinearEquation {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

/// Build the equation `left (cmp) right`. Numbers on either side are lifted to constant
/// expressions.
pub fn equation<L,R>(left : L, comparator : Comparator, right : R) -> LinearEquation
    where
        L : IntoLinear,
        R : IntoLinear
{
    LinearEquation::new(left,comparator,right)
}
