//! The household graph: people, meals with their dish components, dishes with ingredients, and
//! foods with serving conversions.
//!
//! A [Household] is a plain snapshot. The optimizer only reads it, so one snapshot can be shared
//! by any number of concurrent model builders.
//!
//! In JSON, every collection is written as a list of objects carrying their own id:
//! ```rust
//! use mealplan::Household;
//! let h = Household::from_json(r#"{
//!     "id" : 1, "name" : "Home",
//!     "people" : [ { "id" : 1, "name" : "Ann", "age" : 30, "sex" : 0, "height" : 165,
//!                    "weight" : 60, "activity" : 1, "goal" : 0 } ],
//!     "meals"  : [ { "id" : 10, "name" : "Lunch", "day" : "2024-05-01",
//!                    "components" : [ { "dish" : 7, "restriction" : { "kind" : "no_more_than",
//!                                                                     "amount" : { "servings" : 2 } } } ] } ],
//!     "dishes" : [ { "id" : 7, "name" : "Toast", "ingredients" : [ { "food" : 3, "amount" : 2, "serving" : 5 } ] } ],
//!     "foods"  : [ { "id" : 3, "name" : "Bread", "calories" : 2.5, "protein" : 0.09,
//!                    "servings" : [ { "id" : 5, "amount" : 28, "unit" : "slice" } ] } ]
//! }"#).unwrap();
//! assert_eq!(h.meals[&10].components[&7].dish, 7);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::Comparator;
use crate::error::PlanError;
use crate::config::ObjectiveWeights;

pub type HouseholdId = u64;
pub type PersonId    = u64;
pub type MealId      = u64;
pub type DishId      = u64;
pub type FoodId      = u64;
pub type ServingId   = u64;

/// Items stored in id-keyed collections.
pub trait Keyed {
    fn key(&self) -> u64;
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Household {
    pub id   : HouseholdId,
    pub name : String,
    #[serde(default, with = "keyed")]
    pub people : BTreeMap<PersonId,Person>,
    #[serde(default, with = "keyed")]
    pub meals  : BTreeMap<MealId,Meal>,
    /// Every dish the household's meals may reference.
    #[serde(default, with = "keyed")]
    pub dishes : BTreeMap<DishId,Dish>,
    /// Every food the dishes may reference.
    #[serde(default, with = "keyed")]
    pub foods  : BTreeMap<FoodId,Food>,
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Person {
    pub id       : PersonId,
    #[serde(default)]
    pub name     : String,
    /// Years
    pub age      : f64,
    /// 0 is female, 1 is male. Values in between are allowed when metabolism is ambiguous.
    pub sex      : f64,
    /// cm
    pub height   : f64,
    /// kg
    pub weight   : f64,
    /// 0 (sedentary) to 4 (athlete)
    pub activity : f64,
    /// Negative to lose weight, 0 to maintain, positive to gain. Larger magnitudes go faster.
    pub goal     : f64,
    /// A visiting person only takes part in meals that whitelist them; others take part in every
    /// meal that does not blacklist them.
    #[serde(default)]
    pub visiting : bool,
    /// Objective weights for this person. Falls back to the planner default.
    #[serde(default)]
    pub weights  : Option<ObjectiveWeights>,
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Meal {
    pub id   : MealId,
    #[serde(default)]
    pub name : String,
    /// Meals without a day are not planned.
    #[serde(default)]
    pub day  : Option<NaiveDate>,
    #[serde(default)]
    pub time : Option<NaiveTime>,
    /// Restriction on the meal's share of the day's calories.
    #[serde(default)]
    pub restriction : Option<MealRestriction>,
    /// Components keyed by dish. A dish appears at most once per meal.
    #[serde(default, with = "keyed")]
    pub components  : BTreeMap<DishId,Component>,
    #[serde(default)]
    pub whitelist   : BTreeSet<PersonId>,
    #[serde(default)]
    pub blacklist   : BTreeSet<PersonId>,
}

/// Inclusion of a dish in a meal.
#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Component {
    pub dish        : DishId,
    #[serde(default)]
    pub restriction : Option<ComponentRestriction>,
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Dish {
    pub id          : DishId,
    #[serde(default)]
    pub name        : String,
    /// Ingredients making up one serving of the dish.
    #[serde(default)]
    pub ingredients : Vec<Ingredient>,
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Ingredient {
    pub food    : FoodId,
    /// Number of the chosen servings, or grams/mL when no serving is chosen.
    pub amount  : f64,
    #[serde(default)]
    pub serving : Option<ServingId>,
}

#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Food {
    pub id        : FoodId,
    #[serde(default)]
    pub name      : String,
    /// Measured in mL rather than g.
    #[serde(default)]
    pub by_volume : bool,
    /// kcal per g or mL
    #[serde(default)]
    pub calories  : Option<f64>,
    /// g protein per g or mL
    #[serde(default)]
    pub protein   : Option<f64>,
    #[serde(default, with = "keyed")]
    pub servings  : BTreeMap<ServingId,Serving>,
}

/// A unit conversion for a food, e.g. "1/8 pie" = 50 g.
#[derive(Clone,Debug,Default,Serialize,Deserialize)]
pub struct Serving {
    pub id             : ServingId,
    /// g or mL in one serving
    pub amount         : f64,
    /// Amount of `unit` this serving is, e.g. 0.125 for "1/8 pie"
    #[serde(default = "one")]
    pub amount_of_unit : f64,
    #[serde(default)]
    pub unit           : Option<String>,
    #[serde(default)]
    pub modifier       : Option<String>,
}

fn one() -> f64 { 1.0 }

////////////////////////////////////////////////////////////
// Restrictions

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    Exactly,
    NoMoreThan,
    NoLessThan,
}

impl RestrictionKind {
    /// Comparator placing the restricted quantity on the left.
    pub fn comparator(self) -> Comparator {
        match self {
            RestrictionKind::Exactly    => Comparator::Equal,
            RestrictionKind::NoMoreThan => Comparator::LessThan,
            RestrictionKind::NoLessThan => Comparator::GreaterThan,
        }
    }
}

/// What a meal restriction measures.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealAmount {
    /// Percent of the day's calories over all of the person's meals.
    Percentage(f64),
    /// kcal
    Calories(f64),
}

/// What a component restriction measures.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentAmount {
    /// Percent of the meal's calories.
    Percentage(f64),
    /// kcal
    Calories(f64),
    /// Number of servings of the dish.
    Servings(f64),
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct Restriction<A> {
    pub kind   : RestrictionKind,
    pub amount : A,
}

pub type MealRestriction      = Restriction<MealAmount>;
pub type ComponentRestriction = Restriction<ComponentAmount>;

impl<A> Restriction<A> {
    pub fn new(kind : RestrictionKind, amount : A) -> Restriction<A> { Restriction{ kind, amount } }
}

impl Restriction<ComponentAmount> {
    /// Decode a restriction stored as flat columns, where `percent` is `true` for percent of the
    /// meal, `false` for kcal and null for servings. Returns `None` for unrestricted rows.
    pub fn from_row(amount : f64, percent : Option<bool>, kind : Option<RestrictionKind>) -> Option<ComponentRestriction> {
        kind.map(|kind| Restriction::new(kind, match percent {
            Some(true)  => ComponentAmount::Percentage(amount),
            Some(false) => ComponentAmount::Calories(amount),
            None        => ComponentAmount::Servings(amount),
        }))
    }
}

impl Restriction<MealAmount> {
    /// Decode a restriction stored as flat columns, where `percent` is `true` for percent of the
    /// day and `false` for kcal. Meals cannot be restricted by servings, so a restricted row must
    /// say which of the two it is.
    pub fn from_row(amount : f64, percent : Option<bool>, kind : Option<RestrictionKind>) -> Result<Option<MealRestriction>,PlanError> {
        match (kind,percent) {
            (None,_)                 => Ok(None),
            (Some(kind),Some(true))  => Ok(Some(Restriction::new(kind,MealAmount::Percentage(amount)))),
            (Some(kind),Some(false)) => Ok(Some(Restriction::new(kind,MealAmount::Calories(amount)))),
            (Some(_),None)           => Err(PlanError::InvalidRestriction("meal restriction must be a percentage or a calorie amount".to_string())),
        }
    }
}

////////////////////////////////////////////////////////////
// Accessors

impl Household {
    pub fn new(id : HouseholdId, name : &str) -> Household {
        Household{ id, name : name.to_string(), ..Default::default() }
    }

    pub fn from_json(data : &str) -> Result<Household,PlanError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn add_person(&mut self, person : Person) -> &mut Self { self.people.insert(person.id,person); self }
    pub fn add_meal(&mut self, meal : Meal) -> &mut Self { self.meals.insert(meal.id,meal); self }
    pub fn add_dish(&mut self, dish : Dish) -> &mut Self { self.dishes.insert(dish.id,dish); self }
    pub fn add_food(&mut self, food : Food) -> &mut Self { self.foods.insert(food.id,food); self }

    /// Meals that have a day, grouped by day. Within a day, meals are in id order.
    pub fn meals_by_day(&self) -> BTreeMap<NaiveDate,Vec<&Meal>> {
        let mut res : BTreeMap<NaiveDate,Vec<&Meal>> = BTreeMap::new();
        for meal in self.meals.values() {
            if let Some(day) = meal.day {
                res.entry(day).or_default().push(meal);
            }
        }
        res
    }
}

impl Meal {
    pub fn new(id : MealId, name : &str, day : Option<NaiveDate>) -> Meal {
        Meal{ id, name : name.to_string(), day, ..Default::default() }
    }

    pub fn with_component(mut self, component : Component) -> Meal {
        self.components.insert(component.dish,component);
        self
    }

    pub fn with_restriction(self, restriction : MealRestriction) -> Meal {
        Meal{ restriction : Some(restriction), ..self }
    }

    /// Whether `person` takes part in this meal.
    pub fn includes(&self, person : &Person) -> bool {
        if person.visiting {
            self.whitelist.contains(&person.id)
        }
        else {
            !self.blacklist.contains(&person.id)
        }
    }

    /// Day and time combined. A meal without a time starts at midnight.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        self.day.and_then(|d| match self.time {
            Some(t) => Some(d.and_time(t)),
            None    => d.and_hms_opt(0,0,0),
        })
    }
}

impl Component {
    pub fn new(dish : DishId) -> Component { Component{ dish, restriction : None } }

    pub fn restricted(dish : DishId, kind : RestrictionKind, amount : ComponentAmount) -> Component {
        Component{ dish, restriction : Some(Restriction::new(kind,amount)) }
    }
}

impl Dish {
    pub fn new(id : DishId, name : &str) -> Dish { Dish{ id, name : name.to_string(), ingredients : Vec::new() } }

    pub fn with_ingredient(mut self, food : FoodId, amount : f64, serving : Option<ServingId>) -> Dish {
        self.ingredients.push(Ingredient{ food, amount, serving });
        self
    }
}

impl Food {
    pub fn new(id : FoodId, name : &str, calories : Option<f64>, protein : Option<f64>) -> Food {
        Food{ id, name : name.to_string(), calories, protein, ..Default::default() }
    }

    pub fn with_serving(mut self, serving : Serving) -> Food {
        self.servings.insert(serving.id,serving);
        self
    }

    /// Unit of raw quantities of this food.
    pub fn base_unit(&self) -> &'static str { if self.by_volume { "mL" } else { "g" } }
}

impl Serving {
    pub fn new(id : ServingId, amount : f64, unit : &str) -> Serving {
        Serving{ id, amount, amount_of_unit : 1.0, unit : Some(unit.to_string()), modifier : None }
    }

    /// Human readable label, e.g. `0.125 pie (sliced)`. Servings without a unit are labeled by
    /// their raw quantity.
    pub fn label(&self, food : &Food) -> String {
        let mut s = match &self.unit {
            Some(unit) => format!("{} {}", self.amount_of_unit, unit),
            None       => format!("{}{}", self.amount, food.base_unit()),
        };
        if let Some(m) = &self.modifier {
            s.push_str(&format!(" ({})", m));
        }
        s
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serving {
            Some(s) => write!(f, "{} x serving {} of food {}", self.amount, s, self.food),
            None    => write!(f, "{} of food {}", self.amount, self.food),
        }
    }
}

impl Keyed for Person  { fn key(&self) -> u64 { self.id } }
impl Keyed for Meal    { fn key(&self) -> u64 { self.id } }
impl Keyed for Dish    { fn key(&self) -> u64 { self.id } }
impl Keyed for Food    { fn key(&self) -> u64 { self.id } }
impl Keyed for Serving { fn key(&self) -> u64 { self.id } }
impl Keyed for Component { fn key(&self) -> u64 { self.dish } }

/// Serialize id-keyed maps as lists of their values.
mod keyed {
    use std::collections::BTreeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use super::Keyed;

    pub fn serialize<V,S>(map : &BTreeMap<u64,V>, s : S) -> Result<S::Ok,S::Error>
        where
            V : Serialize,
            S : Serializer
    {
        s.collect_seq(map.values())
    }

    pub fn deserialize<'de,V,D>(d : D) -> Result<BTreeMap<u64,V>,D::Error>
        where
            V : Deserialize<'de>+Keyed,
            D : Deserializer<'de>
    {
        let items = Vec::<V>::deserialize(d)?;
        Ok(items.into_iter().map(|v| (v.key(),v)).collect())
    }
}
