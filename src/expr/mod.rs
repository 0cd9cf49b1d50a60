//! Affine expressions over named decision variables.
//!
//! A [LinearExpression] is a constant plus a sparse map from variable names to coefficients.
//! Expressions are values: every operation returns a new expression and leaves its operands
//! untouched, so partial sums can be shared freely while building a model.
//!
//! The builders [term], [var], [terms], [constant] and [sum] are the intended way to create
//! expressions:
//! ```rust
//! use mealplan::*;
//! let meals = [(1,200.0),(2,300.0)];
//! // 200 x_1 + 300 x_2 - 500
//! let e = sum(meals.iter(), |&(i,c)| term(format!("x_{}",i), c)).minus(500.0);
//! assert_eq!(e.coefficient("x_2"), 300.0);
//! assert_eq!(e.constant(), -500.0);
//! ```

mod eval;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Name of a decision variable.
pub type Variable = String;

/// An affine expression `constant + Σ coefficient·variable`. Variables that are not present in
/// the term map have coefficient 0.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct LinearExpression {
    constant : f64,
    terms    : BTreeMap<Variable,f64>,
}

/// Anything that can be lifted to a [LinearExpression]. Numbers become constant expressions
/// without terms.
pub trait IntoLinear {
    fn into_linear(self) -> LinearExpression;
}

impl IntoLinear for LinearExpression {
    fn into_linear(self) -> LinearExpression { self }
}

impl IntoLinear for &LinearExpression {
    fn into_linear(self) -> LinearExpression { self.clone() }
}

impl IntoLinear for f64 {
    fn into_linear(self) -> LinearExpression { constant(self) }
}

impl LinearExpression {
    /// The zero expression.
    pub fn new() -> LinearExpression { Default::default() }

    pub fn constant(&self) -> f64 { self.constant }

    /// Iterate over `(variable,coefficient)` in variable name order.
    pub fn terms(&self) -> impl Iterator<Item = (&str,f64)> {
        self.terms.iter().map(|(v,&c)| (v.as_str(),c))
    }

    /// Coefficient of a variable; 0 if the variable does not occur.
    pub fn coefficient(&self, variable : &str) -> f64 {
        self.terms.get(variable).copied().unwrap_or(0.0)
    }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    /// True if the expression has no variable terms.
    pub fn is_constant(&self) -> bool { self.terms.is_empty() }

    /// Return `self + other`.
    pub fn plus<E>(&self, other : E) -> LinearExpression where E : IntoLinear {
        self.combine(other.into_linear(), 1.0)
    }

    /// Return `self - other`.
    pub fn minus<E>(&self, other : E) -> LinearExpression where E : IntoLinear {
        self.combine(other.into_linear(), -1.0)
    }

    /// Return `scalar·self`, scaling the constant and every coefficient.
    pub fn times(&self, scalar : f64) -> LinearExpression {
        LinearExpression {
            constant : self.constant * scalar,
            terms    : self.terms.iter().map(|(v,&c)| (v.clone(), c * scalar)).collect(),
        }
    }

    fn combine(&self, other : LinearExpression, sign : f64) -> LinearExpression {
        let mut res = self.clone();
        res.constant += sign * other.constant;
        for (v,c) in other.terms {
            *res.terms.entry(v).or_insert(0.0) += sign * c;
        }
        res
    }

    pub(crate) fn into_parts(self) -> (f64,BTreeMap<Variable,f64>) { (self.constant,self.terms) }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v,c) in self.terms.iter() {
            write!(f, "{}*{} + ", c, v)?;
        }
        write!(f, "{}", self.constant)
    }
}

impl<E> Add<E> for LinearExpression where E : IntoLinear {
    type Output = LinearExpression;
    fn add(self, rhs : E) -> LinearExpression { self.plus(rhs) }
}

impl<E> Sub<E> for LinearExpression where E : IntoLinear {
    type Output = LinearExpression;
    fn sub(self, rhs : E) -> LinearExpression { self.minus(rhs) }
}

impl Mul<f64> for LinearExpression {
    type Output = LinearExpression;
    fn mul(self, rhs : f64) -> LinearExpression { self.times(rhs) }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;
    fn neg(self) -> LinearExpression { self.times(-1.0) }
}

////////////////////////////////////////////////////////////
// Builders

/// Expression `coefficient·variable`.
pub fn term<S>(variable : S, coefficient : f64) -> LinearExpression where S : Into<Variable> {
    LinearExpression {
        constant : 0.0,
        terms    : BTreeMap::from([(variable.into(),coefficient)]),
    }
}

/// Expression consisting of a single variable with coefficient 1.
pub fn var<S>(variable : S) -> LinearExpression where S : Into<Variable> { term(variable,1.0) }

/// Expression `Σ coefficient·variable` from `(variable,coefficient)` pairs. Repeated variables
/// are accumulated.
pub fn terms<I,S>(items : I) -> LinearExpression
    where
        I : IntoIterator<Item = (S,f64)>,
        S : Into<Variable>
{
    items.into_iter().fold(LinearExpression::new(), |acc,(v,c)| acc.plus(term(v,c)))
}

/// Constant expression without terms.
pub fn constant(value : f64) -> LinearExpression {
    LinearExpression { constant : value, terms : BTreeMap::new() }
}

/// Sum of `f(item)` over all items. The empty sum is the zero expression.
pub fn sum<I,F,E>(items : I, mut f : F) -> LinearExpression
    where
        I : IntoIterator,
        F : FnMut(I::Item) -> E,
        E : IntoLinear
{
    items.into_iter().fold(LinearExpression::new(), |acc,item| acc.plus(f(item)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plus_leaves_operands() {
        let a = term("x",2.0).plus(1.0);
        let b = term("x",3.0).plus(term("y",-1.0)).plus(4.0);
        let c = a.plus(&b);

        assert_eq!(a.coefficient("x"), 2.0);
        assert_eq!(a.constant(), 1.0);
        assert_eq!(a.coefficient("y"), 0.0);

        assert_eq!(c.coefficient("x"), 5.0);
        assert_eq!(c.coefficient("y"), -1.0);
        assert_eq!(c.constant(), 5.0);
    }

    #[test]
    fn minus_and_times() {
        let a = terms([("x",1.0),("y",2.0)]).plus(3.0);
        let d = a.minus(terms([("y",2.0),("z",1.0)])).minus(1.0);
        assert_eq!(d.coefficient("x"), 1.0);
        assert_eq!(d.coefficient("y"), 0.0);
        assert_eq!(d.coefficient("z"), -1.0);
        assert_eq!(d.constant(), 2.0);

        let t = a.times(-0.5);
        assert_eq!(t.coefficient("x"), -0.5);
        assert_eq!(t.coefficient("y"), -1.0);
        assert_eq!(t.constant(), -1.5);
    }

    #[test]
    fn operators() {
        let e = (var("x") + 2.0 - term("y",3.0)) * 2.0;
        assert_eq!(e, terms([("x",2.0),("y",-6.0)]).plus(4.0));
        assert_eq!(-e.clone(), e.times(-1.0));
    }

    #[test]
    fn sum_builder() {
        let e = sum(1..=3, |i| term(format!("x{}",i), i as f64));
        assert_eq!(e.num_terms(), 3);
        assert_eq!(e.coefficient("x3"), 3.0);

        let empty = sum(Vec::<usize>::new(), |i| constant(i as f64));
        assert!(empty.is_constant());
        assert_eq!(empty.constant(), 0.0);

        let repeated = terms([("x",1.0),("x",2.5)]);
        assert_eq!(repeated.coefficient("x"), 3.5);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", terms([("b",2.0),("a",1.0)]).plus(5.0)), "1*a + 2*b + 5");
        assert_eq!(format!("{}", constant(-1.0)), "-1");
    }
}
