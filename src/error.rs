use crate::household::{DishId, FoodId, MealId, PersonId, ServingId};
use crate::nutrition::Nutrient;

/// Errors raised while building or solving models.
///
/// Data-integrity errors name the entities that triggered them so the caller can point at the
/// offending meal, dish or food. The (day, person) pair is carried by the
/// [crate::solution::Failure] record wrapping the error.
#[derive(Debug,thiserror::Error)]
pub enum PlanError {
    #[error("meal {meal} includes dish {dish} which is not in the household")]
    UnknownDish { meal : MealId, dish : DishId },

    #[error("dish {dish} uses food {food} which is not in the household")]
    UnknownFood { dish : DishId, food : FoodId },

    #[error("dish {dish} uses serving {serving} of food {food}, which does not exist")]
    UnknownServing { dish : DishId, food : FoodId, serving : ServingId },

    #[error("meal {meal}: {source}")]
    InMeal { meal : MealId, source : Box<PlanError> },

    #[error("daily {nutrient} target for person {person} is {value}, it must be positive")]
    NonPositiveTarget { person : PersonId, nutrient : Nutrient, value : f64 },

    #[error("{nutrient} weight for person {person} is {value}, it must be positive")]
    NonPositiveWeight { person : PersonId, nutrient : Nutrient, value : f64 },

    #[error("invalid restriction: {0}")]
    InvalidRestriction(String),

    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),

    #[error("solver backend failed: {0}")]
    Backend(String),

    #[error("could not start worker pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
