//! Meal planning for households as linear programs.
//!
//! For every person and every planned day, the crate builds a linear program choosing servings of
//! the dishes in the person's meals so that the day's calories and protein come as close as
//! possible to the person's targets, subject to restrictions placed on dishes and meals.
//!
//! The crate is independent of any particular LP solver. Backends implement [Solver]; the HiGHS
//! backend lives in the `mealplan-highs` crate.
//!
//! # Layers
//! - [expr], [domain] and [constraint]: affine expressions over named variables, comparisons and
//!   their standard form.
//! - [household] and [nutrition]: the input data and the nutrition arithmetic on it.
//! - [model]: solver-ready models and the builder of per-(day, person) diet models.
//! - [solver], [solution] and [planner]: solving, decoding and collecting results.
//!
//! # Example
//! ```rust
//! use mealplan::*;
//! let x = term("servings_1_1", 200.0).plus(term("servings_1_2", 300.0));
//! let eq = equation(x, less_than(), 500.0);
//! // 200 x₁ + 300 x₂ ≤ 500  is the row  -200 x₁ - 300 x₂ ≥ -500
//! let sf = eq.to_standard_form();
//! assert_eq!(sf.terms["servings_1_1"], -200.0);
//! assert_eq!(sf.bound(), Bound::Min(-500.0));
//! ```

pub mod expr;
pub mod domain;
pub mod constraint;
pub mod household;
pub mod nutrition;
pub mod model;
pub mod solver;
pub mod solution;
pub mod planner;
pub mod config;
pub mod error;

pub use expr::*;
pub use domain::*;
pub use constraint::*;
pub use household::*;
pub use nutrition::*;
pub use model::{Model, Row, Sense, ServingsVar, CALORIE_ERROR, PROTEIN_ERROR};
pub use model::builder::{build_models, DayModel, ModelBuilder};
pub use solver::*;
pub use solution::*;
pub use planner::*;
pub use config::*;
pub use error::PlanError;
