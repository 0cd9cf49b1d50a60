//! Solving all models of a household.
//!
//! Models of different (day, person) pairs share nothing but the read-only household snapshot,
//! so they are built and solved in parallel on a bounded worker pool. Results are collected in
//! day and person order regardless of completion order.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::household::{Household, PersonId};
use crate::model::builder::{DayModel, ModelBuilder};
use crate::solution::*;
use crate::solver::{SolveOptions, Solver};

use chrono::NaiveDate;

/// Builds and solves the models of households with a given solver.
pub struct Planner<S> where S : Solver {
    solver : S,
    config : PlannerConfig,
}

enum Outcome {
    Solved(DayReport,MealServings),
    Failed(Failure),
}

impl<S> Planner<S> where S : Solver {
    pub fn new(solver : S, config : PlannerConfig) -> Planner<S> { Planner{ solver, config } }

    pub fn config(&self) -> &PlannerConfig { &self.config }
    pub fn solver(&self) -> &S { &self.solver }

    fn options(&self) -> SolveOptions {
        SolveOptions{ include_zero_variables : true, time_limit : self.config.time_limit() }
    }

    /// Solve every (day, person) model of the household.
    ///
    /// Models that cannot be built or are not solved to optimality are recorded as failures and
    /// do not affect the others.
    ///
    /// # Errors
    /// Fails only if the configuration is invalid or the worker pool cannot be created.
    pub fn solve_household(&self, household : &Household) -> Result<HouseholdSolution,PlanError> {
        self.config.validate()?;
        let builder = ModelBuilder::new(household,&self.config);
        let pairs = builder.pairs();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency.unwrap_or(0))
            .build()
            .map_err(|e| PlanError::ThreadPool(e.to_string()))?;

        let outcomes : Vec<Outcome> = pool.install(|| {
            pairs.par_iter()
                .filter_map(|&(day,person)| builder.build(day,person).map(|m| self.solve_one(day,person,m)))
                .collect()
        });

        let mut res = HouseholdSolution::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Solved(report,servings) => {
                    res.merge(report.person,servings);
                    res.reports.push(report);
                },
                Outcome::Failed(failure) => {
                    warn!(day = %failure.day, person = failure.person, "failed to plan: {}", failure.kind);
                    res.failures.push(failure);
                }
            }
        }

        info!(household = household.id, models = pairs.len(), solved = res.reports.len(), failed = res.failures.len(), "planned household");
        Ok(res)
    }

    fn solve_one(&self, day : NaiveDate, person : PersonId, model : Result<DayModel,PlanError>) -> Outcome {
        let failed = |kind| Outcome::Failed(Failure{ day, person, kind });

        let dm = match model {
            Ok(dm) => dm,
            Err(e) => return failed(FailureKind::Model(e)),
        };
        let output = match self.solver.solve(&dm.model,&self.options()) {
            Ok(output) => output,
            Err(e) => return failed(FailureKind::Backend(e.to_string())),
        };

        debug!(%day, person, status = %output.status, objective = ?output.objective, "solved model");

        if !output.status.is_optimal() {
            return failed(FailureKind::Status(output.status));
        }

        let decoded = decode(&output);
        let values = output.variables.iter().cloned().collect();
        let report = DayReport{
            day,
            person,
            meals     : dm.meals.clone(),
            targets   : dm.targets,
            achieved  : dm.achieved(&values),
            errors    : decoded.errors,
            objective : output.objective,
        };
        Outcome::Solved(report,decoded.servings)
    }
}

/// Solve every (day, person) model of `household` with `solver`. See [Planner::solve_household].
pub fn solve_household<S>(household : &Household, solver : &S, config : &PlannerConfig) -> Result<HouseholdSolution,PlanError>
    where S : Solver+?Sized
{
    Planner::new(solver,config.clone()).solve_household(household)
}
