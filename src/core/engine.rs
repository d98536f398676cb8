use crate::core::{builder, diagnostics, extractor};
use crate::domain::model::{CapacityPolicy, InputData};
use crate::domain::ports::{Pipeline, Solver};
use crate::domain::report::{AllocationRun, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Diagnostics -> model -> solver -> results for one set of inputs, with no I/O.
///
/// Non-optimal solver verdicts are returned in the run, not as errors.
pub fn allocate<V: Solver + ?Sized>(
    input: InputData,
    capacity: &CapacityPolicy,
    solver: &V,
) -> Result<AllocationRun> {
    let diagnostics = diagnostics::run_diagnostics(&input, capacity);
    let model = builder::build_model(&input, capacity);

    tracing::info!("Solving with {}", solver.name());
    let solution = solver.solve(&model)?;
    match solution.objective {
        Some(objective) => tracing::info!(
            "Solver status: {} (objective {:.2})",
            solution.status,
            objective
        ),
        None => tracing::warn!("Solver status: {}", solution.status),
    }

    let result = extractor::extract_results(&input, &model, &solution);

    Ok(AllocationRun {
        input,
        diagnostics,
        model,
        solution,
        result,
    })
}

pub struct AllocationEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AllocationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting allocation run...");
        if self.monitor.is_enabled() {
            tracing::debug!("Resource usage will be logged after each stage");
        }
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Loading input tables...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} projects and {} people",
            input.projects().len(),
            input.people().len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("Checking feasibility, building and solving the model...");
        let run = self.pipeline.transform(input).await?;
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Writing results...");
        let summary = self.pipeline.load(run).await?;
        tracing::info!("Output saved to: {}", summary.output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lp::{Model, Solution, SolverStatus};
    use crate::domain::model::{Person, Project};
    use crate::utils::error::AllocError;

    struct FixedSolver(SolverStatus);

    impl Solver for FixedSolver {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&self, model: &Model) -> Result<Solution> {
            match self.0 {
                SolverStatus::Optimal => {
                    let values = vec![10.0; model.variables().len()];
                    Ok(Solution::optimal(model.objective_value(&values), values))
                }
                status => Ok(Solution::without_values(status)),
            }
        }
    }

    struct BrokenSolver;

    impl Solver for BrokenSolver {
        fn name(&self) -> &str {
            "broken"
        }

        fn solve(&self, _model: &Model) -> Result<Solution> {
            Err(AllocError::ConfigError {
                message: "backend unavailable".to_string(),
            })
        }
    }

    fn input() -> InputData {
        InputData::new(
            vec![Project::new("Apollo", 2.0).with_requirement("Engineer", 100.0)],
            vec![Person::new("ana", 3.0, "Engineer")],
            Vec::new(),
        )
    }

    #[test]
    fn test_allocate_collects_every_stage() {
        let run = allocate(input(), &CapacityPolicy::default(), &FixedSolver(SolverStatus::Optimal))
            .unwrap();

        assert_eq!(run.status(), SolverStatus::Optimal);
        assert_eq!(run.model.variables().len(), 1);
        assert_eq!(run.solution.objective, Some(60.0));
        let result = run.result.unwrap();
        assert_eq!(result.hours_for("Apollo", "ana"), 10.0);
    }

    #[test]
    fn test_non_optimal_verdict_is_not_an_error() {
        let run = allocate(
            input(),
            &CapacityPolicy::default(),
            &FixedSolver(SolverStatus::Unbounded),
        )
        .unwrap();

        assert_eq!(run.status(), SolverStatus::Unbounded);
        assert!(run.result.is_none());
        assert!(!run.diagnostics.has_issues());
    }

    #[test]
    fn test_solver_failure_propagates() {
        let err = allocate(input(), &CapacityPolicy::default(), &BrokenSolver).unwrap_err();
        assert!(err.to_string().contains("backend unavailable"));
    }
}
