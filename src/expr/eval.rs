// Evaluation of expressions at a point, used when reading solutions back.

use std::collections::BTreeMap;
use super::{LinearExpression, Variable};

impl LinearExpression {
    /// Evaluate the expression at a point. Variables missing from `values` count as 0, which is
    /// what a solver reports for variables it leaves out of its output.
    pub fn evaluate(&self, values : &BTreeMap<Variable,f64>) -> f64 {
        self.evaluate_with(|v| values.get(v).copied())
    }

    /// Evaluate the expression with a lookup function. `None` counts as 0.
    pub fn evaluate_with<F>(&self, mut value : F) -> f64 where F : FnMut(&str) -> Option<f64> {
        self.terms().fold(self.constant(), |acc,(v,c)| acc + c * value(v).unwrap_or(0.0))
    }
}
