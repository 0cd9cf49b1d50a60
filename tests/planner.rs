use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;

use mealplan::*;

fn day(d : u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024,7,d).unwrap() }

/// Returns a fixed status per model name, and sets every variable to 1 when the status is optimal.
#[derive(Default)]
struct ScriptedSolver {
    statuses : BTreeMap<String,Result<SolveStatus,String>>,
    seen     : Mutex<Vec<(String,SolveOptions)>>,
}

impl ScriptedSolver {
    fn with(mut self, day : NaiveDate, person : PersonId, status : Result<SolveStatus,String>) -> ScriptedSolver {
        self.statuses.insert(format!("{}_{}",day,person),status);
        self
    }
}

impl Solver for ScriptedSolver {
    fn solve(&self, model : &Model, options : &SolveOptions) -> Result<SolverOutput,PlanError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((model.name().to_string(),*options));
        }
        match self.statuses.get(model.name()).cloned().unwrap_or(Ok(SolveStatus::Optimal)) {
            Ok(SolveStatus::Optimal) => Ok(SolverOutput{
                status    : SolveStatus::Optimal,
                objective : Some(1.0),
                variables : model.variable_names().map(|v| (v.to_string(),1.0)).collect(),
            }),
            Ok(status) => Ok(SolverOutput::failed(status)),
            Err(msg)   => Err(PlanError::Backend(msg)),
        }
    }
}

fn household() -> Household {
    let mut h = Household::new(3,"Planner");
    h.add_person(Person{ id : 1, age : 50.0, sex : 1.0, height : 175.0, weight : 78.0, activity : 1.0, ..Default::default() })
     .add_person(Person{ id : 2, age : 45.0, sex : 0.0, height : 160.0, weight : 58.0, activity : 2.0, ..Default::default() })
     .add_food(Food::new(1,"Beans",Some(1.3),Some(0.09)))
     .add_dish(Dish::new(1,"Beans").with_ingredient(1,150.0,None));
    for d in 1..=3 {
        h.add_meal(Meal::new(d as u64,"Dinner",Some(day(d))).with_component(Component::new(1)));
    }
    h
}

#[test]
fn statuses_become_failures() {
    let h = household();
    let solver = ScriptedSolver::default()
        .with(day(1),1,Ok(SolveStatus::Infeasible))
        .with(day(2),2,Ok(SolveStatus::TimedOut))
        .with(day(3),1,Ok(SolveStatus::Cycled))
        .with(day(3),2,Err("license expired".to_string()));

    let sol = solve_household(&h,&solver,&PlannerConfig::default()).unwrap();
    assert_eq!(sol.reports.len(), 2);
    assert_eq!(sol.failures.len(), 4);
    assert!(!sol.is_complete());

    assert!(matches!(sol.failure(day(1),1).map(|f| &f.kind), Some(FailureKind::Status(SolveStatus::Infeasible))));
    assert!(matches!(sol.failure(day(2),2).map(|f| &f.kind), Some(FailureKind::Status(SolveStatus::TimedOut))));
    assert!(matches!(sol.failure(day(3),1).map(|f| &f.kind), Some(FailureKind::Status(SolveStatus::Cycled))));
    match sol.failure(day(3),2).map(|f| &f.kind) {
        Some(FailureKind::Backend(msg)) => assert!(msg.contains("license expired")),
        other => panic!("unexpected {:?}", other),
    }

    // Failed models contribute no servings, not zero servings.
    assert_eq!(sol.get(1,1,1), None);
    assert_eq!(sol.get(1,2,1), Some(1.0));
    assert_eq!(sol.get(2,1,1), Some(1.0));
    assert_eq!(sol.get(2,2,1), None);
    assert_eq!(sol.servings[&1].len(), 1);
}

#[test]
fn reports_evaluate_the_solution() {
    let h = household();
    let sol = solve_household(&h,&ScriptedSolver::default(),&PlannerConfig::default()).unwrap();
    assert_eq!(sol.reports.len(), 6);

    let r = sol.report(day(2),2).unwrap();
    assert_eq!(r.meals, vec![2]);
    assert!((r.achieved.calories - 195.0).abs() < 1e-9);
    assert!((r.achieved.protein - 13.5).abs() < 1e-9);
    assert_eq!(r.errors, Nutrition::new(1.0,1.0));
    assert_eq!(r.objective, Some(1.0));
    assert_eq!(r.targets, compute_targets(&h.people[&2],&TargetFormula::default()));

    // Reports come in day and person order.
    let order : Vec<(NaiveDate,PersonId)> = sol.reports.iter().map(|r| (r.day,r.person)).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn model_errors_do_not_stop_planning() {
    let mut h = household();
    h.add_meal(Meal::new(10,"Odd",Some(day(1))).with_component(Component::new(1)).with_component(Component::new(5)));
    let sol = solve_household(&h,&ScriptedSolver::default(),&PlannerConfig::default()).unwrap();

    for person in [1,2] {
        assert!(matches!(sol.failure(day(1),person).map(|f| &f.kind),
                         Some(FailureKind::Model(PlanError::UnknownDish{ meal : 10, dish : 5 }))));
        assert!(sol.report(day(2),person).is_some());
        assert!(sol.report(day(3),person).is_some());
    }
}

#[test]
fn solve_options_follow_config() {
    let h = household();
    let solver = ScriptedSolver::default();
    let config = PlannerConfig{ concurrency : Some(2), time_limit : Some(2.5), ..Default::default() };
    let planner = Planner::new(&solver,config);
    planner.solve_household(&h).unwrap();

    let seen = solver.seen.lock().unwrap();
    assert_eq!(seen.len(), 6);
    for (_,opts) in seen.iter() {
        assert!(opts.include_zero_variables);
        assert_eq!(opts.time_limit, Some(Duration::from_secs_f64(2.5)));
    }
}

#[test]
fn failures_print_day_and_person() {
    let h = household();
    let solver = ScriptedSolver::default().with(day(1),2,Ok(SolveStatus::Unbounded));
    let sol = solve_household(&h,&solver,&PlannerConfig::default()).unwrap();
    assert_eq!(format!("{}", sol.failures[0]), "day 2024-07-01 person 2: status unbounded");
}

#[test]
fn zero_concurrency_is_a_config_error() {
    let h = household();
    let solver = ScriptedSolver::default();
    let config = PlannerConfig{ concurrency : Some(0), ..Default::default() };
    assert!(matches!(Planner::new(&solver,config).solve_household(&h), Err(PlanError::InvalidConfig(_))));
    // Nothing was solved.
    assert!(solver.seen.lock().unwrap().is_empty());
}
