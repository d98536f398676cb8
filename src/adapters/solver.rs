use crate::domain::lp::{Model, Sense, Solution, SolverStatus, VarId};
use crate::domain::ports::Solver;
use crate::utils::error::Result;
use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution as _,
    SolverModel, Variable,
};

/// 浮點誤差容許值，用於檢查求解結果
const VERIFY_TOLERANCE: f64 = 1e-5;

/// Default solver backed by `good_lp` and the pure-Rust microlp engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn linear_expression(handles: &[Variable], terms: &[(VarId, f64)]) -> Expression {
    terms
        .iter()
        .map(|(var, coef)| *coef * handles[var.0])
        .sum::<Expression>()
}

impl Solver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model) -> Result<Solution> {
        // 沒有變數的約束直接當常數檢查，不交給求解器
        for constraint in model.constraints().iter().filter(|c| c.is_constant()) {
            if !constraint.constant_holds() {
                tracing::warn!(
                    "Constraint '{}' (0 {} {}) cannot hold; model is infeasible",
                    constraint.name,
                    constraint.sense.symbol(),
                    constraint.rhs
                );
                return Ok(Solution::without_values(SolverStatus::Infeasible));
            }
            tracing::debug!("Constraint '{}' holds trivially, skipped", constraint.name);
        }

        if model.variables().is_empty() {
            return Ok(Solution::optimal(0.0, Vec::new()));
        }

        let mut problem = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| {
                problem.add(
                    variable()
                        .min(v.lower)
                        .max(v.upper)
                        .name(v.name.clone()),
                )
            })
            .collect();

        let objective = linear_expression(&handles, model.objective());
        let mut lp = problem.maximise(objective).using(microlp);

        for row in model.constraints().iter().filter(|c| !c.is_constant()) {
            let lhs = linear_expression(&handles, &row.terms);
            let rhs = row.rhs;
            lp = match row.sense {
                Sense::LessEqual => lp.with(constraint!(lhs <= rhs)),
                Sense::GreaterEqual => lp.with(constraint!(lhs >= rhs)),
                Sense::Equal => lp.with(constraint!(lhs == rhs)),
            };
        }

        tracing::debug!(
            "Handing {} variables and {} constraints to {}",
            handles.len(),
            model.constraints().len(),
            self.name()
        );

        match lp.solve() {
            Ok(solved) => {
                let values: Vec<f64> = handles.iter().map(|h| solved.value(*h)).collect();
                for row in model.constraints() {
                    if !row.is_satisfied_by(&values, VERIFY_TOLERANCE) {
                        tracing::warn!(
                            "Solver {} returned values that violate '{}' ({})",
                            self.name(),
                            row.name,
                            row.kind
                        );
                    }
                }
                let objective = model.objective_value(&values);
                Ok(Solution::optimal(objective, values))
            }
            Err(ResolutionError::Infeasible) => {
                Ok(Solution::without_values(SolverStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                Ok(Solution::without_values(SolverStatus::Unbounded))
            }
            Err(other) => {
                tracing::warn!("Solver {} returned no verdict: {}", self.name(), other);
                Ok(Solution::without_values(SolverStatus::Undefined))
            }
        }
    }
}
