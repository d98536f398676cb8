use crate::domain::lp::{Model, Solution, SolverStatus};
use crate::domain::model::{AllocationResult, InputData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A required role that no person can cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub project: String,
    pub role: String,
    pub required_hours: f64,
}

/// Available versus required hours for one profile, summed over all projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBalance {
    pub profile: String,
    pub people: usize,
    pub available_hours: f64,
    pub required_hours: f64,
    pub surplus: f64,
}

impl ProfileBalance {
    pub fn is_shortage(&self) -> bool {
        self.surplus < 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub coverage_gaps: Vec<CoverageGap>,
    pub profile_balance: Vec<ProfileBalance>,
}

impl DiagnosticReport {
    pub fn shortages(&self) -> impl Iterator<Item = &ProfileBalance> {
        self.profile_balance.iter().filter(|b| b.is_shortage())
    }

    pub fn shortage_count(&self) -> usize {
        self.shortages().count()
    }

    pub fn has_issues(&self) -> bool {
        !self.coverage_gaps.is_empty() || self.shortage_count() > 0
    }
}

/// Everything produced by one transform stage.
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub input: InputData,
    pub diagnostics: DiagnosticReport,
    pub model: Model,
    pub solution: Solution,
    /// Present only when the solver reported an optimal solution.
    pub result: Option<AllocationResult>,
}

impl AllocationRun {
    pub fn status(&self) -> SolverStatus {
        self.solution.status
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: SolverStatus,
    pub objective: Option<f64>,
    pub output_path: String,
    pub files: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_shortages() {
        let report = DiagnosticReport {
            coverage_gaps: vec![],
            profile_balance: vec![
                ProfileBalance {
                    profile: "Analyst".to_string(),
                    people: 1,
                    available_hours: 2580.0,
                    required_hours: 3000.0,
                    surplus: -420.0,
                },
                ProfileBalance {
                    profile: "Engineer".to_string(),
                    people: 2,
                    available_hours: 5160.0,
                    required_hours: 100.0,
                    surplus: 5060.0,
                },
            ],
        };

        assert_eq!(report.shortage_count(), 1);
        assert_eq!(report.shortages().next().unwrap().profile, "Analyst");
        assert!(report.has_issues());
        assert!(!DiagnosticReport::default().has_issues());
    }
}
