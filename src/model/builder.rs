//! Per-(day, person) diet models.
//!
//! For each day and each person taking part in at least one meal that day, the builder creates a
//! model with
//! - one variable per (meal, dish) pair holding the number of servings of the dish eaten in the
//!   meal, see [ServingsVar],
//! - the error variables [CALORIE_ERROR] and [PROTEIN_ERROR], each bounded below by the absolute
//!   deviation of the day's total from the person's target relative to that target,
//! - the objective `minimize w_c·calorie_error + w_p·protein_error`,
//! - non-negativity of all servings, and the dish and meal restrictions of the household.
//!
//! Dish nutrition is computed once per dish for the whole household and shared by all models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{ObjectiveWeights, PlannerConfig};
use crate::constraint::{equation, LinearEquation};
use crate::domain::*;
use crate::error::PlanError;
use crate::expr::*;
use crate::household::*;
use crate::nutrition::{compute_targets, nutrition_of_dish, Nutrient, Nutrition};
use super::{Model, Sense, ServingsVar, CALORIE_ERROR, PROTEIN_ERROR};

/// Name of the objective row.
pub const OBJECTIVE : &str = "objective";

/// The model for one person on one day, with the quantities it was built from.
#[derive(Clone,Debug)]
pub struct DayModel {
    pub day      : NaiveDate,
    pub person   : PersonId,
    /// Participating meals, by start time.
    pub meals    : Vec<MealId>,
    pub model    : Model,
    pub targets  : Nutrition,
    pub weights  : ObjectiveWeights,
    /// Total calories of the day as a function of the servings variables.
    pub calories : LinearExpression,
    /// Total protein of the day as a function of the servings variables.
    pub protein  : LinearExpression,
}

impl DayModel {
    /// Calories and protein eaten at the given servings.
    pub fn achieved(&self, values : &BTreeMap<Variable,f64>) -> Nutrition {
        Nutrition::new(self.calories.evaluate(values), self.protein.evaluate(values))
    }
}

/// Builds diet models from a household snapshot.
pub struct ModelBuilder<'a> {
    household : &'a Household,
    config    : &'a PlannerConfig,
    days      : BTreeMap<NaiveDate,Vec<&'a Meal>>,
    nutrition : BTreeMap<DishId,Nutrition>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(household : &'a Household, config : &'a PlannerConfig) -> ModelBuilder<'a> {
        let days = household.meals_by_day();

        // Dishes that fail here are reported by the models that use them.
        let nutrition = days.values()
            .flatten()
            .flat_map(|meal| meal.components.values())
            .filter_map(|c| household.dishes.get(&c.dish))
            .filter_map(|dish| nutrition_of_dish(dish,&household.foods).ok().map(|n| (dish.id,n)))
            .collect();

        ModelBuilder{ household, config, days, nutrition }
    }

    /// Days with at least one meal.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ { self.days.keys().copied() }

    /// The meals of `day` that `person` takes part in.
    pub fn meals_for(&self, day : NaiveDate, person : &Person) -> Vec<&'a Meal> {
        self.days.get(&day)
            .map(|meals| meals.iter().copied().filter(|m| m.includes(person)).collect())
            .unwrap_or_default()
    }

    /// All `(day,person)` pairs that get a model, in day and person order.
    pub fn pairs(&self) -> Vec<(NaiveDate,PersonId)> {
        self.days.keys()
            .flat_map(|&day| self.household.people.values()
                      .filter(move |p| !self.meals_for(day,p).is_empty())
                      .map(move |p| (day,p.id)))
            .collect()
    }

    /// Build the model for `person` on `day`. Returns `None` if the person is unknown or takes
    /// part in no meal that day.
    pub fn build(&self, day : NaiveDate, person : PersonId) -> Option<Result<DayModel,PlanError>> {
        let person = self.household.people.get(&person)?;
        let meals = self.meals_for(day,person);
        if meals.is_empty() {
            None
        }
        else {
            Some(self.build_for(day,person,meals))
        }
    }

    fn dish_nutrition(&self, meal : MealId, dish : DishId) -> Result<Nutrition,PlanError> {
        if let Some(n) = self.nutrition.get(&dish) {
            return Ok(*n);
        }
        let d = self.household.dishes.get(&dish).ok_or(PlanError::UnknownDish{ meal, dish })?;
        nutrition_of_dish(d,&self.household.foods)
            .map_err(|e| PlanError::InMeal{ meal, source : Box::new(e) })
    }

    fn build_for(&self, day : NaiveDate, person : &Person, mut meals : Vec<&'a Meal>) -> Result<DayModel,PlanError> {
        meals.sort_by_key(|m| (m.starts_at(),m.id));

        let targets = compute_targets(person,&self.config.formula);
        for nutrient in [Nutrient::Calories,Nutrient::Protein] {
            let value = targets.get(nutrient);
            if !(value.is_finite() && value > 0.0) {
                return Err(PlanError::NonPositiveTarget{ person : person.id, nutrient, value });
            }
        }
        let weights = person.weights.unwrap_or(self.config.default_weights);
        weights.validate(person.id)?;

        let mut dishes : BTreeMap<DishId,Nutrition> = BTreeMap::new();
        for meal in meals.iter() {
            for c in meal.components.values() {
                if !dishes.contains_key(&c.dish) {
                    dishes.insert(c.dish, self.dish_nutrition(meal.id,c.dish)?);
                }
            }
        }

        let servings = |meal : &Meal, dish : DishId| ServingsVar::new(meal.id,dish).encode();
        let meal_total = |meal : &Meal, nutrient : Nutrient|
            sum(meal.components.values(), |c| term(servings(meal,c.dish), dishes[&c.dish].get(nutrient)));
        let calories = sum(meals.iter().copied(), |m| meal_total(m,Nutrient::Calories));
        let protein  = sum(meals.iter().copied(), |m| meal_total(m,Nutrient::Protein));

        let objective = terms([(CALORIE_ERROR,weights.calories),(PROTEIN_ERROR,weights.protein)]);

        let mut equations : Vec<(String,LinearEquation)> = Vec::new();

        // error ≥ ±(total/target - 1), so the row constant is exactly ±1
        for (name,error,total,target) in [("calories",CALORIE_ERROR,&calories,targets.calories),
                                          ("protein",PROTEIN_ERROR,&protein,targets.protein)] {
            let deviation = total.times(1.0/target).minus(1.0);
            equations.push((format!("error_{}_over",name),  equation(var(error), greater_than(), deviation.clone())));
            equations.push((format!("error_{}_under",name), equation(var(error), greater_than(), -deviation)));
        }

        for meal in meals.iter().copied() {
            for c in meal.components.values() {
                let x = servings(meal,c.dish);
                equations.push((format!("nonnegative_{}_{}",meal.id,c.dish), equation(0.0, less_than(), var(x.clone()))));

                if let Some(r) = c.restriction {
                    let cmp = r.kind.comparator();
                    let kcal = dishes[&c.dish].calories;
                    let eq = match r.amount {
                        ComponentAmount::Percentage(p) => equation(term(x,kcal), cmp, meal_total(meal,Nutrient::Calories).times(p / 100.0)),
                        ComponentAmount::Calories(a)   => equation(term(x,kcal), cmp, a),
                        ComponentAmount::Servings(a)   => equation(var(x), cmp, a),
                    };
                    equations.push((format!("restrict_component_{}_{}",meal.id,c.dish), eq));
                }
            }

            if let Some(r) = meal.restriction {
                let cmp = r.kind.comparator();
                let eq = match r.amount {
                    MealAmount::Percentage(p) => equation(meal_total(meal,Nutrient::Calories), cmp, calories.times(p / 100.0)),
                    MealAmount::Calories(a)   => equation(meal_total(meal,Nutrient::Calories), cmp, a),
                };
                equations.push((format!("restrict_meal_{}",meal.id), eq));
            }
        }

        let model = Model::from_equations(&format!("{}_{}",day,person.id), Sense::Minimize, OBJECTIVE, &objective, equations);

        debug!(%day, person = person.id, variables = model.num_variables(), constraints = model.num_constraints(), "built model");

        Ok(DayModel{
            day,
            person : person.id,
            meals  : meals.iter().map(|m| m.id).collect(),
            model,
            targets,
            weights,
            calories,
            protein,
        })
    }
}

/// Build every model of a household, keyed by day and person.
///
/// A person without meals on a day has no entry for that day. Construction errors are kept per
/// entry and do not affect other entries.
pub fn build_models(household : &Household, config : &PlannerConfig) -> BTreeMap<NaiveDate,BTreeMap<PersonId,Result<DayModel,PlanError>>> {
    let builder = ModelBuilder::new(household,config);
    let mut res : BTreeMap<NaiveDate,BTreeMap<PersonId,Result<DayModel,PlanError>>> = BTreeMap::new();
    for (day,person) in builder.pairs() {
        if let Some(m) = builder.build(day,person) {
            res.entry(day).or_default().insert(person,m);
        }
    }
    res
}
