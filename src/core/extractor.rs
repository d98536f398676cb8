//! Turns solved variable values into the allocation matrix and detail list.

use crate::domain::lp::{Model, Solution};
use crate::domain::model::{AllocationMatrix, AllocationRecord, AllocationResult, InputData};

/// Values at or below this are solver noise, not allocations.
pub const ALLOCATION_EPSILON: f64 = 1e-6;

/// Decimal places kept in the detailed allocation list.
pub const REPORT_PRECISION: i32 = 2;

pub fn round_hours(hours: f64) -> f64 {
    let factor = 10f64.powi(REPORT_PRECISION);
    (hours * factor).round() / factor
}

/// Positive beyond solver noise and still positive at report precision.
pub fn is_allocated(hours: f64) -> bool {
    hours > ALLOCATION_EPSILON && round_hours(hours) > 0.0
}

/// `None` unless the solution is optimal.
pub fn extract_results(
    input: &InputData,
    model: &Model,
    solution: &Solution,
) -> Option<AllocationResult> {
    if !solution.status.is_optimal() {
        tracing::info!(
            "No allocation produced: solver status is {}",
            solution.status
        );
        return None;
    }

    let people = input.people().len();
    let mut dense = vec![vec![0.0; people]; input.projects().len()];
    for (project_id, person_id, var) in model.allocation_vars() {
        let value = solution.value(var).unwrap_or(0.0);
        // 四捨五入後為 0 的值不算分配，矩陣欄位與明細用同一個判斷
        dense[project_id.0][person_id.0] = if is_allocated(value) { value } else { 0.0 };
    }

    // 只保留至少有一筆正分配的人員欄位
    let kept: Vec<usize> = (0..people)
        .filter(|&column| dense.iter().any(|row| row[column] > 0.0))
        .collect();

    let matrix = AllocationMatrix {
        projects: input.projects().iter().map(|p| p.name.clone()).collect(),
        people: kept
            .iter()
            .map(|&column| input.people()[column].name.clone())
            .collect(),
        cells: dense
            .iter()
            .map(|row| kept.iter().map(|&column| row[column]).collect())
            .collect(),
    };

    let mut records = Vec::new();
    for (row, project) in input.projects().iter().enumerate() {
        for (column, person) in input.people().iter().enumerate() {
            let hours = dense[row][column];
            if hours > 0.0 {
                records.push(AllocationRecord {
                    project: project.name.clone(),
                    person: person.name.clone(),
                    hours_allocated: round_hours(hours),
                });
            }
        }
    }

    tracing::info!(
        "Extracted {} allocation(s) across {} people",
        records.len(),
        matrix.people.len()
    );

    Some(AllocationResult { matrix, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::build_model;
    use crate::domain::lp::SolverStatus;
    use crate::domain::model::{CapacityPolicy, Person, Project};

    fn input() -> InputData {
        InputData::new(
            vec![
                Project::new("Apollo", 1.0).with_requirement("Engineer", 100.0),
                Project::new("Gemini", 1.0).with_requirement("Engineer", 50.0),
            ],
            vec![
                Person::new("ana", 1.0, "Engineer"),
                Person::new("bo", 1.0, "Engineer"),
                Person::new("cy", 1.0, "Engineer"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_drops_idle_people_and_rounds_details() {
        let input = input();
        let model = build_model(&input, &CapacityPolicy::default());
        // 變數順序: Apollo(ana, bo, cy), Gemini(ana, bo, cy)
        let solution = Solution::optimal(
            150.0,
            vec![99.996, 0.0, 1e-9, 0.0, 0.0, 50.004],
        );

        let result = extract_results(&input, &model, &solution).unwrap();

        assert_eq!(result.matrix.people, vec!["ana".to_string(), "cy".to_string()]);
        assert_eq!(result.matrix.projects.len(), 2);
        assert_eq!(result.matrix.get("Apollo", "cy"), Some(0.0));
        assert_eq!(result.matrix.get("Gemini", "cy"), Some(50.004));
        assert_eq!(result.matrix.get("Apollo", "bo"), None);

        assert_eq!(
            result.records,
            vec![
                AllocationRecord {
                    project: "Apollo".to_string(),
                    person: "ana".to_string(),
                    hours_allocated: 100.0,
                },
                AllocationRecord {
                    project: "Gemini".to_string(),
                    person: "cy".to_string(),
                    hours_allocated: 50.0,
                },
            ]
        );
    }

    #[test]
    fn test_non_optimal_produces_nothing() {
        let input = input();
        let model = build_model(&input, &CapacityPolicy::default());
        for status in [
            SolverStatus::Infeasible,
            SolverStatus::Unbounded,
            SolverStatus::Undefined,
        ] {
            let solution = Solution::without_values(status);
            assert!(extract_results(&input, &model, &solution).is_none());
        }
    }

    #[test]
    fn test_values_that_round_to_zero_are_not_allocations() {
        let input = input();
        let model = build_model(&input, &CapacityPolicy::default());
        let solution = Solution::optimal(
            100.0,
            vec![0.004, 100.0, 0.0, 0.0, 0.0049, 0.005],
        );

        let result = extract_results(&input, &model, &solution).unwrap();

        assert!(result.records.iter().all(|r| r.hours_allocated > 0.0));
        assert_eq!(result.hours_for("Apollo", "ana"), 0.0);
        assert_eq!(result.hours_for("Gemini", "cy"), 0.01);
        assert_eq!(result.records.len(), 2);
        // ana 只有四捨五入為 0 的值，不保留欄位
        assert_eq!(result.matrix.people, vec!["bo".to_string(), "cy".to_string()]);
        assert_eq!(result.matrix.get("Gemini", "bo"), Some(0.0));
    }

    #[test]
    fn test_round_hours() {
        assert_eq!(round_hours(12.345_6), 12.35);
        assert_eq!(round_hours(7.0), 7.0);
    }
}
