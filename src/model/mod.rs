//! Solver-ready linear programs.
//!
//! A [Model] holds an objective, a set of named constraint rows with their [Bound]s, and a
//! per-variable coefficient table mapping each variable to its coefficients in the objective and
//! in every row that references it. Variables not referenced by a row have coefficient 0 in it.
//!
//! Models are built from named [LinearEquation]s with [Model::from_equations]; the per-day meal
//! plan models are built by [builder::build_models].

pub mod builder;

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constraint::LinearEquation;
use crate::domain::Bound;
use crate::expr::{LinearExpression, Variable};
use crate::household::{DishId, MealId};

/// Objective sense
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Maximize,
    Minimize
}

/// A linear program in the shape expected by LP backends.
#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct Model {
    name        : String,
    sense       : Sense,
    /// Name of the objective row in the coefficient table.
    objective   : String,
    constraints : BTreeMap<String,Bound>,
    variables   : BTreeMap<Variable,BTreeMap<String,f64>>,
}

/// One constraint row, with terms given as indexes into [Model::variable_names].
#[derive(Clone,Debug,PartialEq)]
pub struct Row<'a> {
    pub name  : &'a str,
    pub bound : Bound,
    pub terms : Vec<(usize,f64)>,
}

impl Model {
    /// Build a model by bringing each equation to standard form and transposing the set of rows
    /// into a per-variable coefficient table.
    ///
    /// # Arguments
    /// - `name` Model name, used in logs.
    /// - `sense` Objective sense.
    /// - `objective_name` Name of the objective row. Must differ from every constraint name.
    /// - `objective` Objective expression. Its constant is ignored.
    /// - `equations` Named constraints. A later equation replaces an earlier one of the same name.
    pub fn from_equations<I,S>(name : &str, sense : Sense, objective_name : &str, objective : &LinearExpression, equations : I) -> Model
        where
            I : IntoIterator<Item = (S,LinearEquation)>,
            S : Into<String>
    {
        let mut rows : BTreeMap<String,(Bound,BTreeMap<Variable,f64>)> = BTreeMap::new();
        for (rowname,eq) in equations {
            let sf = eq.to_standard_form();
            rows.insert(rowname.into(), (sf.bound(),sf.terms));
        }

        let constraints = rows.iter().map(|(n,(b,_))| (n.clone(),*b)).collect();
        let objective_row : (String,BTreeMap<Variable,f64>) =
            (objective_name.to_string(), objective.terms().map(|(v,c)| (v.to_string(),c)).collect());
        let variables = transpose(std::iter::once(objective_row).chain(rows.into_iter().map(|(n,(_,terms))| (n,terms))));

        Model{
            name        : name.to_string(),
            sense,
            objective   : objective_name.to_string(),
            constraints,
            variables,
        }
    }

    pub fn name(&self) -> &str { self.name.as_str() }
    pub fn sense(&self) -> Sense { self.sense }
    pub fn objective_name(&self) -> &str { self.objective.as_str() }

    pub fn num_variables(&self) -> usize { self.variables.len() }
    pub fn num_constraints(&self) -> usize { self.constraints.len() }

    /// Iterate over constraint names and bounds in name order.
    pub fn constraints(&self) -> impl Iterator<Item = (&str,Bound)> {
        self.constraints.iter().map(|(n,&b)| (n.as_str(),b))
    }

    pub fn bound(&self, constraint : &str) -> Option<Bound> { self.constraints.get(constraint).copied() }

    /// Variable names in order. This order defines the column index of each variable.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|v| v.as_str())
    }

    pub fn has_variable(&self, variable : &str) -> bool { self.variables.contains_key(variable) }

    /// Coefficient of `variable` in the row (or objective) named `row`.
    pub fn coefficient(&self, variable : &str, row : &str) -> f64 {
        self.variables.get(variable).and_then(|r| r.get(row)).copied().unwrap_or(0.0)
    }

    pub fn objective_coefficient(&self, variable : &str) -> f64 {
        self.coefficient(variable,self.objective.as_str())
    }

    /// Regroup the coefficient table by constraint row. Rows are in name order, and so are the
    /// terms within a row.
    pub fn rows(&self) -> Vec<Row<'_>> {
        let index : BTreeMap<&str,Vec<(usize,f64)>> = self.variables.iter()
            .enumerate()
            .flat_map(|(j,(_,coefs))| coefs.iter().map(move |(row,&c)| (row.as_str(),(j,c))))
            .filter(|(row,_)| *row != self.objective.as_str())
            .into_group_map()
            .into_iter()
            .collect();

        self.constraints.iter()
            .map(|(name,&bound)| Row{
                name  : name.as_str(),
                bound,
                terms : index.get(name.as_str()).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Activity `Σ a·x` of a row at the given point. Missing variables count as 0.
    pub fn activity(&self, row : &str, values : &BTreeMap<Variable,f64>) -> f64 {
        self.variables.iter()
            .filter_map(|(v,coefs)| coefs.get(row).map(|c| c * values.get(v).copied().unwrap_or(0.0)))
            .sum()
    }

    /// Names of constraints violated by more than `tol` at the given point.
    pub fn violations(&self, values : &BTreeMap<Variable,f64>, tol : f64) -> Vec<&str> {
        self.constraints.iter()
            .filter(|(name,bound)| !bound.contains(self.activity(name,values),tol))
            .map(|(name,_)| name.as_str())
            .collect()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({:?}, {} variables, {} constraints)", self.name, self.sense, self.num_variables(), self.num_constraints())?;
        for (name,bound) in self.constraints.iter() {
            let terms = self.variables.iter()
                .filter_map(|(v,coefs)| coefs.get(name).map(|c| format!("{}*{}", c, v)))
                .join(" + ");
            writeln!(f, "  {}: {} {:?}", name, terms, bound)?;
        }
        Ok(())
    }
}

/// Turn rows of `(row name, variable → coefficient)` into `variable → (row name → coefficient)`.
/// Zero coefficients are dropped but the variable is still registered.
fn transpose<I>(rows : I) -> BTreeMap<Variable,BTreeMap<String,f64>>
    where I : IntoIterator<Item = (String,BTreeMap<Variable,f64>)>
{
    let mut res : BTreeMap<Variable,BTreeMap<String,f64>> = BTreeMap::new();
    for (rowname,terms) in rows {
        for (v,c) in terms {
            let entry = res.entry(v).or_default();
            if c != 0.0 {
                entry.insert(rowname.clone(),c);
            }
        }
    }
    res
}

////////////////////////////////////////////////////////////
// Variable naming

/// Name of the calorie error variable.
pub const CALORIE_ERROR : &str = "calorie_error";
/// Name of the protein error variable.
pub const PROTEIN_ERROR : &str = "protein_error";

const SERVINGS_PREFIX : &str = "servings";
const SEPARATOR : char = '_';

/// Servings of one dish in one meal, encoded as the variable name `servings_<meal>_<dish>`.
/// Ids are integers, so the separator never occurs inside one.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct ServingsVar {
    pub meal : MealId,
    pub dish : DishId,
}

impl ServingsVar {
    pub fn new(meal : MealId, dish : DishId) -> ServingsVar { ServingsVar{ meal, dish } }

    pub fn encode(&self) -> Variable {
        format!("{}{}{}{}{}", SERVINGS_PREFIX, SEPARATOR, self.meal, SEPARATOR, self.dish)
    }

    /// Parse a variable name. Returns `None` for names that are not servings variables.
    pub fn decode(name : &str) -> Option<ServingsVar> {
        let rest = name.strip_prefix(SERVINGS_PREFIX)?.strip_prefix(SEPARATOR)?;
        let (meal,dish) = rest.split_once(SEPARATOR)?;
        Some(ServingsVar{ meal : meal.parse().ok()?, dish : dish.parse().ok()? })
    }
}

impl fmt::Display for ServingsVar {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.encode().as_str()) }
}

impl From<ServingsVar> for Variable {
    fn from(v : ServingsVar) -> Variable { v.encode() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constraint::equation;
    use crate::domain::*;
    use crate::expr::*;

    fn sample() -> Model {
        // min 2x + y  s.t.  x + y >= 1, x <= 3, y - x = 0
        Model::from_equations("sample", Sense::Minimize, "objective",
            &terms([("x",2.0),("y",1.0)]),
            [("cover", equation(terms([("x",1.0),("y",1.0)]), greater_than(), 1.0)),
             ("cap",   equation(var("x"), less_than(), 3.0)),
             ("tie",   equation(var("y"), equal_to(), var("x")))])
    }

    #[test]
    fn transpose_equations() {
        let m = sample();
        assert_eq!(m.num_variables(), 2);
        assert_eq!(m.num_constraints(), 3);
        assert_eq!(m.objective_coefficient("x"), 2.0);
        assert_eq!(m.coefficient("x","cover"), -1.0);
        assert_eq!(m.bound("cover"), Some(Bound::Max(-1.0)));
        assert_eq!(m.coefficient("x","cap"), -1.0);
        assert_eq!(m.bound("cap"), Some(Bound::Min(-3.0)));
        assert_eq!(m.coefficient("x","tie"), 1.0);
        assert_eq!(m.coefficient("y","tie"), -1.0);
        assert_eq!(m.coefficient("z","tie"), 0.0);
    }

    #[test]
    fn later_equation_replaces_earlier() {
        let m = Model::from_equations("dup", Sense::Minimize, "objective", &var("x"),
            [("r", equation(var("x"), less_than(), 1.0)),
             ("r", equation(var("y"), less_than(), 2.0))]);
        assert_eq!(m.num_constraints(), 1);
        assert_eq!(m.bound("r"), Some(Bound::Min(-2.0)));
        assert_eq!(m.coefficient("x","r"), 0.0);
        assert_eq!(m.coefficient("y","r"), -1.0);
        // x stays in the model through the objective.
        assert_eq!(m.objective_coefficient("x"), 1.0);
        assert_eq!(m.rows()[0].terms.len(), 1);
    }

    #[test]
    fn rows_by_index() {
        let m = sample();
        let names : Vec<&str> = m.variable_names().collect();
        assert_eq!(names, vec!["x","y"]);
        let rows = m.rows();
        assert_eq!(rows.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["cap","cover","tie"]);
        assert_eq!(rows[0].terms, vec![(0,-1.0)]);
        assert_eq!(rows[1].terms, vec![(0,-1.0),(1,-1.0)]);
    }

    #[test]
    fn violations() {
        let m = sample();
        let ok = BTreeMap::from([("x".to_string(),0.5),("y".to_string(),0.5)]);
        assert!(m.violations(&ok,1e-9).is_empty());
        let bad = BTreeMap::from([("x".to_string(),4.0)]);
        assert_eq!(m.violations(&bad,1e-9), vec!["cap","tie"]);
    }

    #[test]
    fn zero_coefficients_keep_variable() {
        let m = Model::from_equations("z", Sense::Minimize, "objective", &constant(0.0),
                                      [("r", equation(var("x"), less_than(), var("x").plus(1.0)))]);
        assert!(m.has_variable("x"));
        assert_eq!(m.coefficient("x","r"), 0.0);
        assert!(m.rows()[0].terms.is_empty());
    }

    #[test]
    fn servings_names() {
        let v = ServingsVar::new(12,345);
        assert_eq!(v.encode(), "servings_12_345");
        assert_eq!(ServingsVar::decode("servings_12_345"), Some(v));
        assert_eq!(ServingsVar::decode(CALORIE_ERROR), None);
        assert_eq!(ServingsVar::decode("servings_12"), None);
        assert_eq!(ServingsVar::decode("servings_a_1"), None);
        assert_eq!(ServingsVar::decode("servingsx_1_2"), None);
    }
}
