//! Decoding solver output into servings, and the household result.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::PlanError;
use crate::household::{DishId, MealId, PersonId};
use crate::model::{ServingsVar, CALORIE_ERROR, PROTEIN_ERROR};
use crate::nutrition::Nutrition;
use crate::solver::{SolveStatus, SolverOutput};

/// Servings per dish per meal.
pub type MealServings = BTreeMap<MealId,BTreeMap<DishId,f64>>;

/// The servings and error values of one solved model.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct DecodedModel {
    pub servings : MealServings,
    /// Values of the calorie and protein error variables, i.e. the relative deviations from the
    /// targets.
    pub errors   : Nutrition,
}

/// Decode solver output. Variables that are not servings variables are ignored except for the
/// error variables.
pub fn decode(output : &SolverOutput) -> DecodedModel {
    let mut res = DecodedModel::default();
    for (name,value) in output.variables.iter() {
        if let Some(v) = ServingsVar::decode(name) {
            res.servings.entry(v.meal).or_default().insert(v.dish,*value);
        }
        else if name == CALORIE_ERROR {
            res.errors.calories = *value;
        }
        else if name == PROTEIN_ERROR {
            res.errors.protein = *value;
        }
    }
    res
}

/// Summary of one optimally solved (day, person) model.
#[derive(Clone,Debug,Serialize)]
pub struct DayReport {
    pub day       : NaiveDate,
    pub person    : PersonId,
    /// Meals of the person that day, by start time.
    pub meals     : Vec<MealId>,
    pub targets   : Nutrition,
    /// Calories and protein at the chosen servings.
    pub achieved  : Nutrition,
    /// Relative deviations from the targets.
    pub errors    : Nutrition,
    pub objective : Option<f64>,
}

#[derive(Debug)]
pub enum FailureKind {
    /// The model could not be built.
    Model(PlanError),
    /// The solver finished without an optimal solution.
    Status(SolveStatus),
    /// The solver backend failed.
    Backend(String),
}

/// A (day, person) model that produced no servings.
#[derive(Debug)]
pub struct Failure {
    pub day    : NaiveDate,
    pub person : PersonId,
    pub kind   : FailureKind,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Model(e)   => write!(f, "model error: {}", e),
            FailureKind::Status(s)  => write!(f, "status {}", s),
            FailureKind::Backend(m) => write!(f, "backend error: {}", m),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} person {}: {}", self.day, self.person, self.kind)
    }
}

/// Servings for every person over all planned days, with failures kept on the side.
///
/// A failed (day, person) model contributes nothing to `servings`. It is never reported as zero
/// servings.
#[derive(Debug,Default)]
pub struct HouseholdSolution {
    pub servings : BTreeMap<PersonId,MealServings>,
    pub reports  : Vec<DayReport>,
    pub failures : Vec<Failure>,
}

impl HouseholdSolution {
    /// Add the servings of one solved model. Meals are distinct across days, so servings of
    /// different days never overwrite each other.
    pub fn merge(&mut self, person : PersonId, servings : MealServings) {
        let target = self.servings.entry(person).or_default();
        for (meal,dishes) in servings {
            target.entry(meal).or_default().extend(dishes);
        }
    }

    pub fn get(&self, person : PersonId, meal : MealId, dish : DishId) -> Option<f64> {
        self.servings.get(&person)?.get(&meal)?.get(&dish).copied()
    }

    pub fn report(&self, day : NaiveDate, person : PersonId) -> Option<&DayReport> {
        self.reports.iter().find(|r| r.day == day && r.person == person)
    }

    pub fn failure(&self, day : NaiveDate, person : PersonId) -> Option<&Failure> {
        self.failures.iter().find(|f| f.day == day && f.person == person)
    }

    /// True if every model was solved to optimality.
    pub fn is_complete(&self) -> bool { self.failures.is_empty() }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_servings() {
        let out = SolverOutput{
            status    : SolveStatus::Optimal,
            objective : Some(0.5),
            variables : vec![("servings_1_2".to_string(),1.5),
                             ("servings_1_3".to_string(),0.0),
                             ("servings_4_2".to_string(),2.0),
                             (CALORIE_ERROR.to_string(),0.25),
                             (PROTEIN_ERROR.to_string(),0.1),
                             ("other".to_string(),7.0)],
        };
        let d = decode(&out);
        assert_eq!(d.servings.len(), 2);
        assert_eq!(d.servings[&1][&2], 1.5);
        assert_eq!(d.servings[&1][&3], 0.0);
        assert_eq!(d.servings[&4][&2], 2.0);
        assert_eq!(d.errors, Nutrition::new(0.25,0.1));
    }

    #[test]
    fn merge_days() {
        let mut sol = HouseholdSolution::default();
        sol.merge(1, BTreeMap::from([(10,BTreeMap::from([(1,1.0)]))]));
        sol.merge(1, BTreeMap::from([(11,BTreeMap::from([(1,2.0)]))]));
        sol.merge(2, BTreeMap::from([(10,BTreeMap::from([(1,0.5)]))]));
        assert_eq!(sol.get(1,10,1), Some(1.0));
        assert_eq!(sol.get(1,11,1), Some(2.0));
        assert_eq!(sol.get(2,10,1), Some(0.5));
        assert_eq!(sol.get(2,11,1), None);
        assert!(sol.is_complete());
    }
}
