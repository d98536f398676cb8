//! Builds the allocation LP from normalized input.
//!
//! One continuous variable per (project, person) pair, bounded by the person
//! upper bound. The objective maximises hours x cost x funding weight, subject
//! to project and person capacity, manual overrides and per-role minimums.

use crate::core::naming;
use crate::domain::lp::{ConstraintKind, Model, Sense, VarId};
use crate::domain::model::{CapacityPolicy, InputData, OverrideKind, PersonId, ProjectId};
use std::collections::HashMap;

pub const MODEL_NAME: &str = "Resource Allocation";

pub fn build_model(input: &InputData, capacity: &CapacityPolicy) -> Model {
    let mut model = Model::new(MODEL_NAME);
    let upper = capacity.person_upper_bound();

    let vars = add_allocation_variables(&mut model, input, upper);
    add_objective(&mut model, input, &vars);
    add_project_capacity(&mut model, input, &vars);
    add_person_capacity(&mut model, input, &vars, upper);
    add_overrides(&mut model, input, &vars, upper);
    add_role_minimums(&mut model, input, &vars);

    tracing::info!(
        "Model built: {} variables, {} constraints",
        model.variables().len(),
        model.constraints().len()
    );
    for (kind, count) in model.constraint_counts() {
        tracing::debug!("  {}: {}", kind, count);
    }

    model
}

/// Dense (project, person) -> variable lookup, resolved once while the
/// variables are created.
struct AllocationVars {
    people: usize,
    ids: Vec<VarId>,
}

impl AllocationVars {
    fn get(&self, project: ProjectId, person: PersonId) -> VarId {
        self.ids[project.0 * self.people + person.0]
    }
}

fn add_allocation_variables(model: &mut Model, input: &InputData, upper: f64) -> AllocationVars {
    let people = input.people().len();
    let mut ids = Vec::with_capacity(input.projects().len() * people);

    for project_id in input.project_ids() {
        let project = input.project(project_id);
        for person_id in input.person_ids() {
            let person = input.person(person_id);
            let name = naming::allocation_var(&project.name, &person.name);
            // 配對已存在時沿用原本的變數，ids 必須與 (project, person) 一一對齊
            if let Some(var) = model
                .add_allocation_variable(project_id, person_id, name, upper)
                .or_else(|| model.allocation_var(project_id, person_id))
            {
                ids.push(var);
            }
        }
    }

    debug_assert_eq!(ids.len(), input.projects().len() * people);
    AllocationVars { people, ids }
}

fn add_objective(model: &mut Model, input: &InputData, vars: &AllocationVars) {
    for project_id in input.project_ids() {
        let funding = input.project(project_id).funding_weight;
        for person_id in input.person_ids() {
            let cost = input.person(person_id).cost;
            model.add_objective_term(vars.get(project_id, person_id), cost * funding);
        }
    }
}

/// Hours on a project never exceed the sum of its role requirements.
fn add_project_capacity(model: &mut Model, input: &InputData, vars: &AllocationVars) {
    for project_id in input.project_ids() {
        let project = input.project(project_id);
        let terms = input
            .person_ids()
            .map(|person_id| (vars.get(project_id, person_id), 1.0))
            .collect();
        model.add_constraint(
            naming::project_capacity(&project.name),
            ConstraintKind::ProjectCapacity,
            terms,
            Sense::LessEqual,
            project.required_hours(),
        );
    }
}

fn add_person_capacity(model: &mut Model, input: &InputData, vars: &AllocationVars, upper: f64) {
    for person_id in input.person_ids() {
        let person = input.person(person_id);
        let terms = input
            .project_ids()
            .map(|project_id| (vars.get(project_id, person_id), 1.0))
            .collect();
        model.add_constraint(
            naming::person_capacity(&person.name),
            ConstraintKind::PersonCapacity,
            terms,
            Sense::LessEqual,
            upper,
        );
    }
}

fn add_overrides(model: &mut Model, input: &InputData, vars: &AllocationVars, upper: f64) {
    // 同一配對重複出現時以最後一筆為準，維持約束名稱唯一
    let mut resolved: Vec<(ProjectId, PersonId, OverrideKind)> = Vec::new();
    let mut position: HashMap<(ProjectId, PersonId), usize> = HashMap::new();

    for entry in input.overrides() {
        let Some(kind) = entry.kind() else {
            tracing::warn!(
                "Ignoring override {} / {}: invalid value {}",
                entry.project,
                entry.person,
                entry.value
            );
            continue;
        };
        let (Some(project_id), Some(person_id)) =
            (input.project_id(&entry.project), input.person_id(&entry.person))
        else {
            tracing::warn!(
                "Ignoring override {} / {}: unknown project or person",
                entry.project,
                entry.person
            );
            continue;
        };

        if let OverrideKind::AtLeast(hours) = kind {
            if hours > upper {
                tracing::warn!(
                    "Override {} / {} requires {} h, above the person upper bound of {} h",
                    entry.project,
                    entry.person,
                    hours,
                    upper
                );
            }
        }

        match position.get(&(project_id, person_id)) {
            Some(&index) => {
                tracing::warn!(
                    "Override {} / {} given more than once; using value {}",
                    entry.project,
                    entry.person,
                    entry.value
                );
                resolved[index].2 = kind;
            }
            None => {
                position.insert((project_id, person_id), resolved.len());
                resolved.push((project_id, person_id, kind));
            }
        }
    }

    for (project_id, person_id, kind) in resolved {
        let project = &input.project(project_id).name;
        let person = &input.person(person_id).name;
        let var = vars.get(project_id, person_id);
        match kind {
            OverrideKind::ForceZero => model.add_constraint(
                naming::override_zero(project, person),
                ConstraintKind::OverrideZero,
                vec![(var, 1.0)],
                Sense::Equal,
                0.0,
            ),
            OverrideKind::AtLeast(hours) => model.add_constraint(
                naming::override_minimum(project, person),
                ConstraintKind::OverrideMinimum,
                vec![(var, 1.0)],
                Sense::GreaterEqual,
                hours,
            ),
        }
    }
}

/// Matching-profile hours on a project must reach each role requirement.
/// Roles nobody can fill still get their (unsatisfiable) constraint.
fn add_role_minimums(model: &mut Model, input: &InputData, vars: &AllocationVars) {
    for project_id in input.project_ids() {
        let project = input.project(project_id);
        for (role, &hours) in &project.role_requirements {
            if hours <= 0.0 {
                continue;
            }
            let terms: Vec<(VarId, f64)> = input
                .people_with_profile(role)
                .map(|person_id| (vars.get(project_id, person_id), 1.0))
                .collect();
            if terms.is_empty() {
                tracing::warn!(
                    "Role constraint {} / {} has no matching people and is infeasible",
                    project.name,
                    role
                );
            }
            model.add_constraint(
                naming::role_minimum(&project.name, role),
                ConstraintKind::RoleMinimum,
                terms,
                Sense::GreaterEqual,
                hours,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Override, Person, Project};

    fn sample_input() -> InputData {
        InputData::new(
            vec![
                Project::new("Apollo", 2.0)
                    .with_requirement("Engineer", 100.0)
                    .with_requirement("Analyst", 50.0),
                Project::new("Gemini", 1.0).with_requirement("Engineer", 80.0),
            ],
            vec![
                Person::new("ana", 3.0, "Engineer"),
                Person::new("bo", 1.0, "Analyst"),
                Person::new("cy", 2.0, "Engineer"),
            ],
            vec![
                Override::new("Apollo", "cy", 0.0),
                Override::new("Gemini", "ana", 20.0),
                Override::new("Nowhere", "ana", 5.0),
                Override::new("Apollo", "bo", -2.0),
            ],
        )
    }

    #[test]
    fn test_one_variable_per_pair() {
        let model = build_model(&sample_input(), &CapacityPolicy::default());
        assert_eq!(model.variables().len(), 6);
        assert!(model
            .variables()
            .iter()
            .all(|v| v.lower == 0.0 && v.upper == 2580.0));
        assert_eq!(model.variable(VarId(0)).name, "alloc__Apollo__ana");
        assert_eq!(model.variable(VarId(5)).name, "alloc__Gemini__cy");
    }

    #[test]
    fn test_lookup_table_matches_model_variables() {
        let input = sample_input();
        let mut model = Model::new(MODEL_NAME);
        let vars = add_allocation_variables(&mut model, &input, 2580.0);

        for project_id in input.project_ids() {
            for person_id in input.person_ids() {
                let var = vars.get(project_id, person_id);
                assert_eq!(model.allocation_var(project_id, person_id), Some(var));
                assert_eq!(
                    model.variable(var).name,
                    naming::allocation_var(
                        &input.project(project_id).name,
                        &input.person(person_id).name
                    )
                );
            }
        }

        // 重複建立同一組變數時，查表仍指向既有的變數
        let again = add_allocation_variables(&mut model, &input, 2580.0);
        assert_eq!(model.variables().len(), 6);
        assert_eq!(again.ids, vars.ids);
    }

    #[test]
    fn test_objective_weights() {
        let model = build_model(&sample_input(), &CapacityPolicy::default());
        let weights: Vec<f64> = model.objective().iter().map(|(_, w)| *w).collect();
        assert_eq!(weights, vec![6.0, 2.0, 4.0, 3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_capacity_constraints() {
        let model = build_model(&sample_input(), &CapacityPolicy::default());

        let apollo = model.constraint("project_cap__Apollo").unwrap();
        assert_eq!(apollo.sense, Sense::LessEqual);
        assert_eq!(apollo.rhs, 150.0);
        assert_eq!(apollo.terms.len(), 3);

        let ana = model.constraint("person_cap__ana").unwrap();
        assert_eq!(ana.rhs, 2580.0);
        assert_eq!(ana.terms.len(), 2);
    }

    #[test]
    fn test_only_valid_overrides_become_constraints() {
        let model = build_model(&sample_input(), &CapacityPolicy::default());
        let counts = model.constraint_counts();
        assert_eq!(counts.get(&ConstraintKind::OverrideZero), Some(&1));
        assert_eq!(counts.get(&ConstraintKind::OverrideMinimum), Some(&1));

        let zero = model.constraint("override_zero__Apollo__cy").unwrap();
        assert_eq!(zero.sense, Sense::Equal);
        assert_eq!(zero.rhs, 0.0);

        let min = model.constraint("override_min__Gemini__ana").unwrap();
        assert_eq!(min.sense, Sense::GreaterEqual);
        assert_eq!(min.rhs, 20.0);
    }

    #[test]
    fn test_repeated_override_keeps_last_value() {
        let input = InputData::new(
            vec![Project::new("Apollo", 1.0).with_requirement("Engineer", 10.0)],
            vec![Person::new("ana", 1.0, "Engineer")],
            vec![
                Override::new("Apollo", "ana", 4.0),
                Override::new("Apollo", "ana", 0.0),
            ],
        );
        let model = build_model(&input, &CapacityPolicy::default());
        assert!(model.constraint("override_min__Apollo__ana").is_none());
        assert!(model.constraint("override_zero__Apollo__ana").is_some());
    }

    #[test]
    fn test_role_minimum_matches_profiles() {
        let model = build_model(&sample_input(), &CapacityPolicy::default());
        let engineers = model.constraint("role_min__Apollo__Engineer").unwrap();
        assert_eq!(engineers.sense, Sense::GreaterEqual);
        assert_eq!(engineers.rhs, 100.0);
        let names: Vec<&str> = engineers
            .terms
            .iter()
            .map(|(var, _)| model.variable(*var).name.as_str())
            .collect();
        assert_eq!(names, vec!["alloc__Apollo__ana", "alloc__Apollo__cy"]);
    }

    #[test]
    fn test_unmatched_role_still_emits_constraint() {
        let input = InputData::new(
            vec![Project::new("Apollo", 1.0).with_requirement("Pilot", 30.0)],
            vec![Person::new("ana", 1.0, "Engineer")],
            vec![],
        );
        let model = build_model(&input, &CapacityPolicy::default());
        let pilot = model.constraint("role_min__Apollo__Pilot").unwrap();
        assert!(pilot.is_constant());
        assert!(!pilot.constant_holds());
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = build_model(&sample_input(), &CapacityPolicy::default());
        let second = build_model(&sample_input(), &CapacityPolicy::default());
        assert_eq!(first, second);
        assert_eq!(first.to_lp_string(), second.to_lp_string());

        let order: Vec<&str> = first.constraints().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "project_cap__Apollo",
                "project_cap__Gemini",
                "person_cap__ana",
                "person_cap__bo",
                "person_cap__cy",
                "override_zero__Apollo__cy",
                "override_min__Gemini__ana",
                "role_min__Apollo__Analyst",
                "role_min__Apollo__Engineer",
                "role_min__Gemini__Engineer",
            ]
        );
    }
}
