//! Solver-independent linear model: bounded continuous variables, a maximised
//! linear objective and named linear constraints.

use crate::domain::model::{PersonId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

/// Tolerance used when a constraint without variables is checked as a constant.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl Sense {
    pub fn symbol(&self) -> &'static str {
        match self {
            Sense::LessEqual => "<=",
            Sense::GreaterEqual => ">=",
            Sense::Equal => "=",
        }
    }

    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::LessEqual => lhs <= rhs + tolerance,
            Sense::GreaterEqual => lhs + tolerance >= rhs,
            Sense::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    ProjectCapacity,
    PersonCapacity,
    OverrideZero,
    OverrideMinimum,
    RoleMinimum,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintKind::ProjectCapacity => "project capacity",
            ConstraintKind::PersonCapacity => "person capacity",
            ConstraintKind::OverrideZero => "override (zero)",
            ConstraintKind::OverrideMinimum => "override (minimum)",
            ConstraintKind::RoleMinimum => "role minimum",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// A constraint with no variables reduces to the constant check `0 <sense> rhs`.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn constant_holds(&self) -> bool {
        self.sense.holds(0.0, self.rhs, FEASIBILITY_TOLERANCE)
    }

    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        self.sense.holds(evaluate(&self.terms, values), self.rhs, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Undefined,
}

impl SolverStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolverStatus::Optimal => "Optimal",
            SolverStatus::Infeasible => "Infeasible",
            SolverStatus::Unbounded => "Unbounded",
            SolverStatus::Undefined => "Undefined",
        };
        f.write_str(label)
    }
}

/// Solver verdict; `values` is indexed by [`VarId`] and only filled when optimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub status: SolverStatus,
    pub objective: Option<f64>,
    pub values: Vec<f64>,
}

impl Solution {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolverStatus::Optimal,
            objective: Some(objective),
            values,
        }
    }

    pub fn without_values(status: SolverStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.0).copied()
    }
}

pub fn evaluate(terms: &[(VarId, f64)], values: &[f64]) -> f64 {
    terms
        .iter()
        .map(|(var, coef)| coef * values.get(var.0).copied().unwrap_or(0.0))
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    objective: Vec<(VarId, f64)>,
    constraints: Vec<Constraint>,
    allocation_vars: BTreeMap<(ProjectId, PersonId), VarId>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_variable(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    /// Registers the decision variable of a (project, person) pair.
    /// Returns `None` when the pair already has one.
    pub fn add_allocation_variable(
        &mut self,
        project: ProjectId,
        person: PersonId,
        name: impl Into<String>,
        upper: f64,
    ) -> Option<VarId> {
        if self.allocation_vars.contains_key(&(project, person)) {
            return None;
        }
        let id = self.add_variable(name, 0.0, upper);
        self.allocation_vars.insert((project, person), id);
        Some(id)
    }

    pub fn allocation_var(&self, project: ProjectId, person: PersonId) -> Option<VarId> {
        self.allocation_vars.get(&(project, person)).copied()
    }

    pub fn allocation_vars(&self) -> impl Iterator<Item = (ProjectId, PersonId, VarId)> + '_ {
        self.allocation_vars
            .iter()
            .map(|(&(project, person), &var)| (project, person, var))
    }

    pub fn add_objective_term(&mut self, var: VarId, coefficient: f64) {
        self.objective.push((var, coefficient));
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        kind: ConstraintKind,
        terms: Vec<(VarId, f64)>,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            kind,
            terms,
            sense,
            rhs,
        });
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn constraint_counts(&self) -> BTreeMap<ConstraintKind, usize> {
        let mut counts = BTreeMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        evaluate(&self.objective, values)
    }

    /// Renders the model in CPLEX LP text format.
    pub fn to_lp_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\* {} *\\", self.name);
        out.push_str("Maximize\n");
        let _ = writeln!(out, "obj: {}", self.format_terms(&self.objective));

        out.push_str("Subject To\n");
        for constraint in &self.constraints {
            if constraint.is_constant() {
                let _ = writeln!(
                    out,
                    "\\* {}: 0 {} {} (no matching variables) *\\",
                    constraint.name,
                    constraint.sense.symbol(),
                    constraint.rhs
                );
                continue;
            }
            let _ = writeln!(
                out,
                "{}: {} {} {}",
                constraint.name,
                self.format_terms(&constraint.terms),
                constraint.sense.symbol(),
                constraint.rhs
            );
        }

        if !self.variables.is_empty() {
            out.push_str("Bounds\n");
            for variable in &self.variables {
                let _ = writeln!(
                    out,
                    "{} <= {} <= {}",
                    variable.lower, variable.name, variable.upper
                );
            }
        }

        out.push_str("End\n");
        out
    }

    fn format_terms(&self, terms: &[(VarId, f64)]) -> String {
        if terms.is_empty() {
            return "0".to_string();
        }

        let mut text = String::new();
        for (i, (var, coef)) in terms.iter().enumerate() {
            let name = &self.variables[var.0].name;
            let magnitude = coef.abs();
            let sign = if *coef < 0.0 { "-" } else { "+" };
            if i == 0 {
                if *coef < 0.0 {
                    text.push_str("- ");
                }
            } else {
                let _ = write!(text, " {} ", sign);
            }
            if magnitude == 1.0 {
                text.push_str(name);
            } else {
                let _ = write!(text, "{} {}", magnitude, name);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> Model {
        let mut model = Model::new("demo");
        let x = model
            .add_allocation_variable(ProjectId(0), PersonId(0), "x", 10.0)
            .unwrap();
        let y = model
            .add_allocation_variable(ProjectId(0), PersonId(1), "y", 10.0)
            .unwrap();
        model.add_objective_term(x, 2.0);
        model.add_objective_term(y, 1.0);
        model.add_constraint(
            "cap",
            ConstraintKind::ProjectCapacity,
            vec![(x, 1.0), (y, 1.0)],
            Sense::LessEqual,
            12.0,
        );
        model.add_constraint(
            "empty_role",
            ConstraintKind::RoleMinimum,
            vec![],
            Sense::GreaterEqual,
            5.0,
        );
        model
    }

    #[test]
    fn test_allocation_variable_is_unique_per_pair() {
        let mut model = small_model();
        assert!(model
            .add_allocation_variable(ProjectId(0), PersonId(0), "x_again", 10.0)
            .is_none());
        assert_eq!(model.variables().len(), 2);
        assert_eq!(model.allocation_var(ProjectId(0), PersonId(1)), Some(VarId(1)));
    }

    #[test]
    fn test_constant_constraint_check() {
        let model = small_model();
        let empty = model.constraint("empty_role").unwrap();
        assert!(empty.is_constant());
        assert!(!empty.constant_holds());

        let cap = model.constraint("cap").unwrap();
        assert!(cap.is_satisfied_by(&[10.0, 2.0], 1e-9));
        assert!(!cap.is_satisfied_by(&[10.0, 3.0], 1e-9));
    }

    #[test]
    fn test_lp_string_layout() {
        let lp = small_model().to_lp_string();
        let expected = "\\* demo *\\\n\
Maximize\n\
obj: 2 x + y\n\
Subject To\n\
cap: x + y <= 12\n\
\\* empty_role: 0 >= 5 (no matching variables) *\\\n\
Bounds\n\
0 <= x <= 10\n\
0 <= y <= 10\n\
End\n";
        assert_eq!(lp, expected);
    }

    #[test]
    fn test_negative_coefficients_are_signed() {
        let mut model = Model::new("neg");
        let a = model.add_variable("a", 0.0, 1.0);
        let b = model.add_variable("b", 0.0, 1.0);
        model.add_objective_term(a, -1.0);
        model.add_objective_term(b, -3.5);
        assert!(model.to_lp_string().contains("obj: - a - 3.5 b\n"));
    }
}
