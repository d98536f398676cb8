//! Structural feasibility checks run before the model is built.
//!
//! Both checks are advisory: they log warnings and return a report, they never
//! stop the run. The solver stays the final judge of feasibility.

use crate::domain::model::{CapacityPolicy, InputData};
use crate::domain::report::{CoverageGap, DiagnosticReport, ProfileBalance};
use std::collections::{BTreeMap, BTreeSet};

pub fn run_diagnostics(input: &InputData, capacity: &CapacityPolicy) -> DiagnosticReport {
    let coverage_gaps = check_role_coverage(input);
    let profile_balance = check_profile_capacity(input, capacity);

    let report = DiagnosticReport {
        coverage_gaps,
        profile_balance,
    };

    if report.has_issues() {
        tracing::warn!(
            "Diagnostics found {} coverage gap(s) and {} profile shortage(s)",
            report.coverage_gaps.len(),
            report.shortage_count()
        );
    } else {
        tracing::info!("Diagnostics passed: every required role is covered and no profile is short");
    }

    report
}

/// Required roles (positive hours) with no person of the matching profile.
pub fn check_role_coverage(input: &InputData) -> Vec<CoverageGap> {
    let profiles: BTreeSet<&str> = input.people().iter().map(|p| p.profile.as_str()).collect();

    let mut gaps = Vec::new();
    for project in input.projects() {
        for (role, &hours) in &project.role_requirements {
            if hours > 0.0 && !profiles.contains(role.as_str()) {
                tracing::warn!(
                    "⚠️ Project '{}' requires {} h of role '{}' but nobody has that profile; \
                     its role constraint cannot be met",
                    project.name,
                    hours,
                    role
                );
                gaps.push(CoverageGap {
                    project: project.name.clone(),
                    role: role.clone(),
                    required_hours: hours,
                });
            }
        }
    }
    gaps
}

/// Available hours per profile (head count x person upper bound) against the
/// hours required for that role across all projects.
pub fn check_profile_capacity(input: &InputData, capacity: &CapacityPolicy) -> Vec<ProfileBalance> {
    let mut head_count: BTreeMap<&str, usize> = BTreeMap::new();
    for person in input.people() {
        *head_count.entry(person.profile.as_str()).or_insert(0) += 1;
    }

    let mut required: BTreeMap<&str, f64> = BTreeMap::new();
    for project in input.projects() {
        for (role, &hours) in &project.role_requirements {
            *required.entry(role.as_str()).or_insert(0.0) += hours;
        }
    }

    let profiles: BTreeSet<&str> = head_count.keys().chain(required.keys()).copied().collect();
    let per_person = capacity.person_upper_bound();

    profiles
        .into_iter()
        .map(|profile| {
            let people = head_count.get(profile).copied().unwrap_or(0);
            let available_hours = people as f64 * per_person;
            let required_hours = required.get(profile).copied().unwrap_or(0.0);
            let balance = ProfileBalance {
                profile: profile.to_string(),
                people,
                available_hours,
                required_hours,
                surplus: available_hours - required_hours,
            };

            if balance.is_shortage() {
                tracing::warn!(
                    "⚠️ Profile '{}' is short by {:.2} h ({} people, {:.2} h available, {:.2} h required)",
                    balance.profile,
                    -balance.surplus,
                    balance.people,
                    balance.available_hours,
                    balance.required_hours
                );
            } else {
                tracing::debug!(
                    "Profile '{}': {:.2} h available, {:.2} h required",
                    balance.profile,
                    balance.available_hours,
                    balance.required_hours
                );
            }
            balance
        })
        .collect()
}
