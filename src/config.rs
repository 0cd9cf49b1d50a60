//! Planner configuration.
//!
//! Every field has a default, so a configuration document only needs to name what it changes:
//! ```rust
//! use mealplan::PlannerConfig;
//! let cfg = PlannerConfig::from_json(r#"{ "concurrency" : 2, "default_weights" : { "calories" : 1, "protein" : 1 } }"#).unwrap();
//! assert_eq!(cfg.concurrency, Some(2));
//! assert_eq!(cfg.formula.goal_slope, 0.2);
//! ```

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::nutrition::{Nutrient, TargetFormula};
use crate::household::PersonId;

/// Weights of the calorie and protein error terms in the objective. Both must be positive.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct ObjectiveWeights {
    pub calories : f64,
    pub protein  : f64,
}

impl Default for ObjectiveWeights {
    /// Calorie accuracy is favored 10:1, since serving counts give the solver more freedom over
    /// calories than over protein.
    fn default() -> ObjectiveWeights { ObjectiveWeights{ calories : 10.0, protein : 1.0 } }
}

impl ObjectiveWeights {
    /// Check that both weights are positive and finite.
    pub fn validate(&self, person : PersonId) -> Result<(),PlanError> {
        for (nutrient,value) in [(Nutrient::Calories,self.calories),(Nutrient::Protein,self.protein)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlanError::NonPositiveWeight{ person, nutrient, value });
            }
        }
        Ok(())
    }
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Weights used for people that have none of their own.
    pub default_weights : ObjectiveWeights,
    /// Coefficients of the daily target equations.
    pub formula         : TargetFormula,
    /// Maximum number of models solved at the same time. `None` uses one worker per core; zero
    /// is rejected.
    pub concurrency     : Option<usize>,
    /// Time limit per model, in seconds. Values that are not positive, or too large for a
    /// [Duration], mean no limit.
    pub time_limit      : Option<f64>,
}

impl PlannerConfig {
    pub fn from_json(data : &str) -> Result<PlannerConfig,PlanError> {
        let cfg : PlannerConfig = serde_json::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the settings that have no sensible reading.
    pub fn validate(&self) -> Result<(),PlanError> {
        if self.concurrency == Some(0) {
            return Err(PlanError::InvalidConfig("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
            .and_then(|t| Duration::try_from_secs_f64(t).ok())
            .filter(|d| !d.is_zero())
    }
}
