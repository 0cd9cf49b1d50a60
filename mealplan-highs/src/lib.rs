//! HiGHS backend for `mealplan`.
//!
//! ```no_run
//! use mealplan::{Household, PlannerConfig, Planner};
//! use mealplan_highs::HighsSolver;
//!
//! let household = Household::from_json(&std::fs::read_to_string("household.json").unwrap()).unwrap();
//! let planner = Planner::new(HighsSolver::new(), PlannerConfig::default());
//! let solution = planner.solve_household(&household).unwrap();
//! for failure in solution.failures.iter() {
//!     eprintln!("{}", failure);
//! }
//! ```

use itertools::izip;
use tracing::trace;

use mealplan::{Model, PlanError, Sense, SolveOptions, SolveStatus, Solver, SolverOutput};
use highs::{HighsModelStatus, RowProblem, SolvedModel};

/// Solves models with HiGHS' LP solver. Each call builds and solves a fresh HiGHS problem, so one
/// solver can be shared between threads.
#[derive(Clone,Copy,Debug,Default)]
pub struct HighsSolver {
    verbose : bool,
}

impl HighsSolver {
    pub fn new() -> HighsSolver { HighsSolver{ verbose : false } }

    /// Let HiGHS write its log to stdout.
    pub fn verbose(self, verbose : bool) -> HighsSolver { HighsSolver{ verbose } }
}

impl HighsSolver {
    fn problem(model : &Model) -> RowProblem {
        let mut pb = RowProblem::default();
        // Variables are free; bounds are expressed as rows of the model.
        let cols : Vec<_> = model.variable_names()
            .map(|v| pb.add_column(model.objective_coefficient(v), f64::NEG_INFINITY..=f64::INFINITY))
            .collect();
        for row in model.rows() {
            let (lb,ub) = row.bound.interval();
            let factors : Vec<_> = row.terms.iter().map(|&(j,c)| (cols[j],c)).collect();
            pb.add_row(lb..=ub, factors);
        }
        pb
    }

    fn run(&self, model : &Model, options : &SolveOptions, presolve : bool) -> Result<SolvedModel,PlanError> {
        let sense = match model.sense() {
            Sense::Minimize => highs::Sense::Minimise,
            Sense::Maximize => highs::Sense::Maximise,
        };
        let mut task = HighsSolver::problem(model).optimise(sense);
        if !self.verbose {
            task.make_quiet();
        }
        if !presolve {
            task.set_option("presolve", "off");
        }
        if let Some(t) = options.time_limit {
            task.set_option("time_limit", t.as_secs_f64());
        }
        task.try_solve().map_err(|e| PlanError::Backend(format!("{:?}",e)))
    }
}

impl Solver for HighsSolver {
    fn solve(&self, model : &Model, options : &SolveOptions) -> Result<SolverOutput,PlanError> {
        let names : Vec<&str> = model.variable_names().collect();

        let mut solved = self.run(model,options,true)?;
        // Presolve may stop without telling the two apart; the simplex method alone does.
        if solved.status() == HighsModelStatus::UnboundedOrInfeasible {
            trace!(model = model.name(), "HiGHS presolve was inconclusive, solving again without it");
            solved = self.run(model,options,false)?;
        }

        let status = match solved.status() {
            HighsModelStatus::Optimal                => SolveStatus::Optimal,
            HighsModelStatus::Infeasible             => SolveStatus::Infeasible,
            // Diet models minimize non-negative errors, so they are bounded below.
            HighsModelStatus::UnboundedOrInfeasible  => SolveStatus::Infeasible,
            HighsModelStatus::Unbounded              => SolveStatus::Unbounded,
            HighsModelStatus::ReachedTimeLimit       => SolveStatus::TimedOut,
            HighsModelStatus::ReachedIterationLimit  => SolveStatus::Cycled,
            other => return Err(PlanError::Backend(format!("{}: unexpected HiGHS status {:?}",model.name(),other))),
        };
        trace!(model = model.name(), ?status, "HiGHS finished");

        if !status.is_optimal() {
            return Ok(SolverOutput::failed(status));
        }

        let solution = solved.get_solution();
        let values = solution.columns();
        let objective = izip!(names.iter(),values.iter())
            .map(|(v,x)| model.objective_coefficient(v) * x)
            .sum();
        let variables = izip!(names.iter(),values.iter())
            .filter(|&(_,&x)| options.include_zero_variables || x != 0.0)
            .map(|(v,&x)| (v.to_string(),x))
            .collect();

        Ok(SolverOutput{ status, objective : Some(objective), variables })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mealplan::*;

    fn lp() -> Model {
        // min x + 2y  s.t.  x + y >= 2, x <= 1
        Model::from_equations("lp", Sense::Minimize, "objective", &terms([("x",1.0),("y",2.0)]),
            [("cover", equation(terms([("x",1.0),("y",1.0)]), greater_than(), 2.0)),
             ("cap",   equation(var("x"), less_than(), 1.0))])
    }

    #[test]
    fn solves_small_lp() {
        let out = HighsSolver::new().solve(&lp(),&SolveOptions::default()).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);
        assert!((out.value("x").unwrap() - 1.0).abs() < 1e-6);
        assert!((out.value("y").unwrap() - 1.0).abs() < 1e-6);
        assert!((out.objective.unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn reports_infeasible() {
        let m = Model::from_equations("bad", Sense::Minimize, "objective", &var("x"),
            [("lo", equation(var("x"), greater_than(), 2.0)),
             ("hi", equation(var("x"), less_than(), 1.0))]);
        let out = HighsSolver::new().solve(&m,&SolveOptions::default()).unwrap();
        assert_eq!(out.status, SolveStatus::Infeasible);
        assert!(out.variables.is_empty());
    }

    #[test]
    fn reports_unbounded() {
        // max x + y  s.t.  x >= 0, y - x <= 1
        let m = Model::from_equations("open", Sense::Maximize, "objective", &terms([("x",1.0),("y",1.0)]),
            [("lo",  equation(var("x"), greater_than(), 0.0)),
             ("gap", equation(var("y").minus(var("x")), less_than(), 1.0))]);
        let out = HighsSolver::new().solve(&m,&SolveOptions::default()).unwrap();
        assert_eq!(out.status, SolveStatus::Unbounded);
        assert!(out.objective.is_none());
    }
}
