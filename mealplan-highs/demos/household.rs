//! Plan the meals of a household and print the servings per person.
//!
//! Usage: `household [HOUSEHOLD.json [CONFIG.json]]`. Without arguments a built-in household is
//! planned with the default configuration. Set `RUST_LOG=debug` to see every model being solved.

use std::error::Error;

use mealplan::*;
use mealplan_highs::HighsSolver;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(),Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args : Vec<String> = std::env::args().collect();
    let household = match args.get(1) {
        Some(path) => Household::from_json(&std::fs::read_to_string(path)?)?,
        None => Household::from_json(include_str!("household.json"))?,
    };
    let config = match args.get(2) {
        Some(path) => PlannerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PlannerConfig::default(),
    };

    println!("Dishes:");
    for dish in household.dishes.values() {
        let n = nutrition_of_dish(dish,&household.foods)?;
        println!("  {} ({:.0} kcal, {:.1} g protein per serving)", dish.name, n.calories, n.protein);
        for ing in dish.ingredients.iter() {
            if let Some(food) = household.foods.get(&ing.food) {
                let unit = ing.serving
                    .and_then(|s| food.servings.get(&s))
                    .map(|s| s.label(food))
                    .unwrap_or_else(|| food.base_unit().to_string());
                println!("    {} x {} {}", ing.amount, unit, food.name);
            }
        }
    }

    let planner = Planner::new(HighsSolver::new(),config);
    let solution = planner.solve_household(&household)?;

    for report in solution.reports.iter() {
        let name = household.people.get(&report.person).map(|p| p.name.as_str()).unwrap_or("?");
        println!("\n{} on {}: target {:.0} kcal / {:.0} g protein, planned {:.0} kcal / {:.0} g protein",
                 name, report.day, report.targets.calories, report.targets.protein, report.achieved.calories, report.achieved.protein);
        for meal_id in report.meals.iter() {
            let Some(meal) = household.meals.get(meal_id) else { continue };
            let time = meal.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default();
            println!("  {} {}", time, meal.name);
            for (dish_id,servings) in solution.servings.get(&report.person).and_then(|s| s.get(meal_id)).into_iter().flatten() {
                let dish = household.dishes.get(dish_id).map(|d| d.name.as_str()).unwrap_or("?");
                println!("    {:6.2} x {}", servings, dish);
            }
        }
    }

    for failure in solution.failures.iter() {
        println!("\nfailed: {}", failure);
    }
    Ok(())
}
