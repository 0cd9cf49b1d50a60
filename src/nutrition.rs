//! Daily targets and dish nutrition.
//!
//! Pure numeric functions without I/O.
//!
//! The calorie target is a resting energy expenditure estimate after Mifflin-St Jeor,
//! ```text
//! REE = 10·weight + 6.25·height − 5·age + 166·sex − 161
//! ```
//! scaled first by an activity multiplier that is linear in the activity level and then by a
//! goal multiplier that is linear in the goal. The protein target is the body weight times a
//! multiplier that is quadratic in the activity level.
//!
//! # References
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//! - Phillips, S.M., & Van Loon, L.J. (2011). Dietary protein for athletes.
//!   *Journal of Sports Sciences*, 29(sup1), S29-S38.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::household::{Dish, Food, FoodId, Person};

/// The nutrients that are planned for.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Nutrient::Calories => "calories", Nutrient::Protein => "protein" })
    }
}

/// Calories (kcal) and protein (g).
#[derive(Clone,Copy,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct Nutrition {
    pub calories : f64,
    pub protein  : f64,
}

impl Nutrition {
    pub fn new(calories : f64, protein : f64) -> Nutrition { Nutrition{ calories, protein } }

    pub fn get(&self, nutrient : Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein  => self.protein,
        }
    }
}

impl Add for Nutrition {
    type Output = Nutrition;
    fn add(self, rhs : Nutrition) -> Nutrition { Nutrition{ calories : self.calories + rhs.calories, protein : self.protein + rhs.protein } }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs : Nutrition) { *self = *self + rhs }
}

impl Mul<f64> for Nutrition {
    type Output = Nutrition;
    fn mul(self, rhs : f64) -> Nutrition { Nutrition{ calories : self.calories * rhs, protein : self.protein * rhs } }
}

impl Sum for Nutrition {
    fn sum<I : Iterator<Item = Nutrition>>(iter : I) -> Nutrition { iter.fold(Nutrition::default(), |a,b| a + b) }
}

/// Coefficients of the target equations.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct TargetFormula {
    /// Activity multiplier is `activity_slope·activity + activity_base`
    pub activity_slope : f64,
    pub activity_base  : f64,
    /// Goal multiplier is `goal_slope·goal + goal_base`
    pub goal_slope     : f64,
    pub goal_base      : f64,
    /// Protein per kg body weight is `protein_quadratic·activity² + protein_linear·activity + protein_base`
    pub protein_quadratic : f64,
    pub protein_linear    : f64,
    pub protein_base      : f64,
}

impl Default for TargetFormula {
    fn default() -> TargetFormula {
        TargetFormula{
            activity_slope    : 0.13125,
            activity_base     : 1.2,
            goal_slope        : 0.2,
            goal_base         : 1.0,
            protein_quadratic : 0.05,
            protein_linear    : 0.1,
            protein_base      : 0.8,
        }
    }
}

impl TargetFormula {
    /// Daily calorie target in kcal.
    ///
    /// # Arguments
    /// - `age` Years.
    /// - `sex` 0 for female, 1 for male.
    /// - `height` cm.
    /// - `weight` kg.
    /// - `goal` Negative to lose, 0 to maintain, positive to gain weight.
    /// - `activity` 0 (sedentary) to 4 (athlete).
    pub fn calories(&self, age : f64, sex : f64, height : f64, weight : f64, goal : f64, activity : f64) -> f64 {
        let sex_adjustment = 166.0 * sex - 161.0;
        let resting = 10.0 * weight + 6.25 * height - 5.0 * age + sex_adjustment;
        let total   = resting * (self.activity_slope * activity + self.activity_base);
        total * (self.goal_slope * goal + self.goal_base)
    }

    /// Daily protein target in g.
    pub fn protein(&self, weight : f64, activity : f64) -> f64 {
        weight * (self.protein_quadratic * activity * activity + self.protein_linear * activity + self.protein_base)
    }
}

/// Daily calorie target using the default formula. See [TargetFormula::calories].
pub fn target_calories(age : f64, sex : f64, height : f64, weight : f64, goal : f64, activity : f64) -> f64 {
    TargetFormula::default().calories(age,sex,height,weight,goal,activity)
}

/// Daily protein target using the default formula. See [TargetFormula::protein].
pub fn target_protein(weight : f64, activity : f64) -> f64 {
    TargetFormula::default().protein(weight,activity)
}

/// Daily calorie and protein targets for a person.
pub fn compute_targets(person : &Person, formula : &TargetFormula) -> Nutrition {
    Nutrition{
        calories : formula.calories(person.age,person.sex,person.height,person.weight,person.goal,person.activity),
        protein  : formula.protein(person.weight,person.activity),
    }
}

/// Nutrition in one serving of a dish.
///
/// Each ingredient contributes `amount × serving size` grams (or mL) of its food; without a
/// chosen serving the amount is taken as raw grams. Missing nutrient values count as 0, and so
/// do negative ones, as well as negative quantities.
///
/// # Errors
/// Fails if an ingredient refers to a food missing from `foods`, or to a serving the food does not
/// have.
pub fn nutrition_of_dish(dish : &Dish, foods : &BTreeMap<FoodId,Food>) -> Result<Nutrition,PlanError> {
    dish.ingredients.iter().try_fold(Nutrition::default(), |total,ingredient| {
        let food = foods.get(&ingredient.food)
            .ok_or(PlanError::UnknownFood{ dish : dish.id, food : ingredient.food })?;
        let multiplier = match ingredient.serving {
            Some(s) => food.servings.get(&s)
                .map(|s| s.amount)
                .ok_or(PlanError::UnknownServing{ dish : dish.id, food : food.id, serving : s })?,
            None => 1.0
        };
        let quantity = (ingredient.amount * multiplier).max(0.0);

        Ok(total + Nutrition{
            calories : food.calories.unwrap_or(0.0).max(0.0) * quantity,
            protein  : food.protein.unwrap_or(0.0).max(0.0) * quantity,
        })
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::household::Serving;

    #[test]
    fn calorie_target() {
        // REE = 700 + 1100 - 150 + 5 = 1655
        let ree = 1655.0;
        assert!((target_calories(30.0,1.0,176.0,70.0,0.0,0.0) - ree * 1.2).abs() < 1e-9);
        assert!((target_calories(30.0,1.0,176.0,70.0,-1.0,4.0) - ree * 1.725 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn protein_target() {
        assert!((target_protein(70.0,0.0) - 56.0).abs() < 1e-9);
        assert!((target_protein(70.0,2.0) - 70.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn formula_is_configurable() {
        let f = TargetFormula{ goal_slope : 0.15, goal_base : 0.55, ..Default::default() };
        let p = Person{ age : 30.0, sex : 0.0, height : 160.0, weight : 55.0, goal : 1.0, activity : 1.0, ..Default::default() };
        let t = compute_targets(&p,&f);
        let ree = 550.0 + 1000.0 - 150.0 - 161.0;
        assert!((t.calories - ree * 1.33125 * 0.7).abs() < 1e-9);
        assert!((t.protein - 55.0 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn dish_nutrition() {
        let foods = BTreeMap::from([
            (1,Food::new(1,"Bread",Some(2.5),Some(0.1)).with_serving(Serving::new(7,30.0,"slice"))),
            (2,Food::new(2,"Butter",Some(7.0),None)),
        ]);
        let dish = Dish::new(1,"Toast")
            .with_ingredient(1,2.0,Some(7))
            .with_ingredient(2,10.0,None);
        let n = nutrition_of_dish(&dish,&foods).unwrap();
        assert!((n.calories - (2.5*60.0 + 70.0)).abs() < 1e-9);
        assert!((n.protein - 6.0).abs() < 1e-9);

        let empty = Dish::new(2,"Air");
        assert_eq!(nutrition_of_dish(&empty,&foods).unwrap(), Nutrition::default());
    }

    #[test]
    fn negative_data_contributes_nothing() {
        let foods = BTreeMap::from([
            (1,Food::new(1,"Broth",Some(-3.0),Some(0.2))),
            (2,Food::new(2,"Rice",Some(1.3),Some(-0.1)).with_serving(Serving::new(1,-50.0,"scoop"))),
            (3,Food::new(3,"Oil",Some(8.8),None)),
        ]);
        let dish = Dish::new(1,"Soup")
            .with_ingredient(1,100.0,None)
            .with_ingredient(2,200.0,None)
            .with_ingredient(3,-10.0,None);
        let n = nutrition_of_dish(&dish,&foods).unwrap();
        assert!((n.calories - 260.0).abs() < 1e-9);
        assert!((n.protein - 20.0).abs() < 1e-9);

        // Two negatives do not make a positive.
        let flipped = Dish::new(2,"Flipped").with_ingredient(1,-100.0,None).with_ingredient(2,2.0,Some(1));
        assert_eq!(nutrition_of_dish(&flipped,&foods).unwrap(), Nutrition::default());
    }

    #[test]
    fn dish_nutrition_errors() {
        let foods = BTreeMap::from([(1,Food::new(1,"Bread",Some(2.5),Some(0.1)))]);
        let missing_food = Dish::new(3,"x").with_ingredient(9,1.0,None);
        assert!(matches!(nutrition_of_dish(&missing_food,&foods), Err(PlanError::UnknownFood{ dish : 3, food : 9 })));
        let missing_serving = Dish::new(4,"y").with_ingredient(1,1.0,Some(5));
        assert!(matches!(nutrition_of_dish(&missing_serving,&foods), Err(PlanError::UnknownServing{ dish : 4, food : 1, serving : 5 })));
    }
}
