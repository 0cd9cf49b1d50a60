//! Interface to LP backends.
//!
//! A backend takes a [Model] and returns a [SolveStatus] with the solution values of the model's
//! variables. Backends must be usable from several threads at once, since the planner solves
//! independent models in parallel.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::expr::Variable;
use crate::model::Model;

/// Outcome of a solve.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// The solution is optimal within tolerances.
    Optimal,
    Infeasible,
    Unbounded,
    /// The time limit was reached before an optimal solution was found.
    TimedOut,
    /// The solver stopped without progress, e.g. from cycling on a degenerate vertex or by
    /// reaching its iteration limit.
    Cycled,
}

impl SolveStatus {
    pub fn is_optimal(self) -> bool { matches!(self, SolveStatus::Optimal) }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal    => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded  => "unbounded",
            SolveStatus::TimedOut   => "timed_out",
            SolveStatus::Cycled     => "cycled",
        })
    }
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct SolveOptions {
    /// Report variables whose value is 0.
    pub include_zero_variables : bool,
    /// Give up after this long.
    pub time_limit : Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions { SolveOptions{ include_zero_variables : true, time_limit : None } }
}

/// Result of a solve.
#[derive(Clone,Debug,PartialEq)]
pub struct SolverOutput {
    pub status    : SolveStatus,
    /// Objective value, if the status is optimal.
    pub objective : Option<f64>,
    /// Solution values. Empty unless the status is optimal.
    pub variables : Vec<(Variable,f64)>,
}

impl SolverOutput {
    /// Output carrying only a status.
    pub fn failed(status : SolveStatus) -> SolverOutput {
        SolverOutput{ status, objective : None, variables : Vec::new() }
    }

    pub fn value(&self, variable : &str) -> Option<f64> {
        self.variables.iter().find(|(v,_)| v == variable).map(|(_,x)| *x)
    }
}

/// An LP backend.
pub trait Solver : Sync {
    /// Minimize or maximize `model` according to its sense.
    ///
    /// Every outcome the solver can report is returned as an `Ok` status; `Err` is reserved for
    /// failures of the backend itself.
    fn solve(&self, model : &Model, options : &SolveOptions) -> Result<SolverOutput,PlanError>;
}

impl<S> Solver for &S where S : Solver+?Sized {
    fn solve(&self, model : &Model, options : &SolveOptions) -> Result<SolverOutput,PlanError> {
        (**self).solve(model,options)
    }
}

impl<S> Solver for Box<S> where S : Solver+?Sized {
    fn solve(&self, model : &Model, options : &SolveOptions) -> Result<SolverOutput,PlanError> {
        (**self).solve(model,options)
    }
}
