use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 標準全職人力 (FTE) 的年度工時
pub const STANDARD_FTE_HOURS: f64 = 1720.0;

/// 個人年度工時上限相對於標準 FTE 的倍數
pub const DEFAULT_CAPACITY_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub funding_weight: f64,
    /// `TotalResources` column as supplied; informational only.
    pub total_resources: Option<f64>,
    /// Role name -> minimum hours. Only positive requirements are kept.
    pub role_requirements: BTreeMap<String, f64>,
}

impl Project {
    pub fn new(name: impl Into<String>, funding_weight: f64) -> Self {
        Self {
            name: name.into(),
            funding_weight,
            total_resources: None,
            role_requirements: BTreeMap::new(),
        }
    }

    pub fn with_requirement(mut self, role: impl Into<String>, hours: f64) -> Self {
        self.add_requirement(role, hours);
        self
    }

    /// Adds hours to a role requirement; non-positive amounts are ignored.
    pub fn add_requirement(&mut self, role: impl Into<String>, hours: f64) {
        if hours.is_finite() && hours > 0.0 {
            *self.role_requirements.entry(role.into()).or_insert(0.0) += hours;
        }
    }

    pub fn required_hours(&self) -> f64 {
        self.role_requirements.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub cost: f64,
    pub profile: String,
}

impl Person {
    pub fn new(name: impl Into<String>, cost: f64, profile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost,
            profile: profile.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideKind {
    ForceZero,
    AtLeast(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub project: String,
    pub person: String,
    pub value: f64,
}

impl Override {
    pub fn new(project: impl Into<String>, person: impl Into<String>, value: f64) -> Self {
        Self {
            project: project.into(),
            person: person.into(),
            value,
        }
    }

    /// `None` for values that cannot express a valid bound (negative or non-finite).
    pub fn kind(&self) -> Option<OverrideKind> {
        if !self.value.is_finite() || self.value < 0.0 {
            None
        } else if self.value == 0.0 {
            Some(OverrideKind::ForceZero)
        } else {
            Some(OverrideKind::AtLeast(self.value))
        }
    }
}

/// Capacity constants used by both the diagnostics and the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    pub annual_hours: f64,
    pub capacity_factor: f64,
}

impl CapacityPolicy {
    pub fn new(annual_hours: f64, capacity_factor: f64) -> Self {
        Self {
            annual_hours,
            capacity_factor,
        }
    }

    /// Maximum hours a single person can be allocated across all projects.
    pub fn person_upper_bound(&self) -> f64 {
        self.annual_hours * self.capacity_factor
    }
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self::new(STANDARD_FTE_HOURS, DEFAULT_CAPACITY_FACTOR)
    }
}

/// Normalized input tables for one run, with name lookups resolved once.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    projects: Vec<Project>,
    people: Vec<Person>,
    overrides: Vec<Override>,
    project_index: HashMap<String, ProjectId>,
    person_index: HashMap<String, PersonId>,
}

impl InputData {
    /// Builds the tables; later duplicates of a project or person name are dropped.
    pub fn new(projects: Vec<Project>, people: Vec<Person>, overrides: Vec<Override>) -> Self {
        let mut data = Self {
            overrides,
            ..Self::default()
        };

        for project in projects {
            if data.project_index.contains_key(&project.name) {
                tracing::warn!("Duplicate project '{}' ignored", project.name);
                continue;
            }
            data.project_index
                .insert(project.name.clone(), ProjectId(data.projects.len()));
            data.projects.push(project);
        }

        for person in people {
            if data.person_index.contains_key(&person.name) {
                tracing::warn!("Duplicate person '{}' ignored", person.name);
                continue;
            }
            data.person_index
                .insert(person.name.clone(), PersonId(data.people.len()));
            data.people.push(person);
        }

        data
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    pub fn person(&self, id: PersonId) -> &Person {
        &self.people[id.0]
    }

    pub fn project_id(&self, name: &str) -> Option<ProjectId> {
        self.project_index.get(name).copied()
    }

    pub fn person_id(&self, name: &str) -> Option<PersonId> {
        self.person_index.get(name).copied()
    }

    pub fn project_ids(&self) -> impl Iterator<Item = ProjectId> + '_ {
        (0..self.projects.len()).map(ProjectId)
    }

    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        (0..self.people.len()).map(PersonId)
    }

    /// People whose profile equals `role`, in input order.
    pub fn people_with_profile<'a>(&'a self, role: &'a str) -> impl Iterator<Item = PersonId> + 'a {
        self.person_ids()
            .filter(move |id| self.people[id.0].profile == role)
    }
}

/// One strictly positive allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub project: String,
    pub person: String,
    pub hours_allocated: f64,
}

/// Dense project x person matrix of allocated hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationMatrix {
    pub projects: Vec<String>,
    pub people: Vec<String>,
    /// `cells[row][column]`, rows follow `projects`, columns follow `people`.
    pub cells: Vec<Vec<f64>>,
}

impl AllocationMatrix {
    pub fn get(&self, project: &str, person: &str) -> Option<f64> {
        let row = self.projects.iter().position(|p| p == project)?;
        let column = self.people.iter().position(|p| p == person)?;
        Some(self.cells[row][column])
    }

    pub fn row_total(&self, project: &str) -> Option<f64> {
        let row = self.projects.iter().position(|p| p == project)?;
        Some(self.cells[row].iter().sum())
    }

    pub fn column_total(&self, person: &str) -> Option<f64> {
        let column = self.people.iter().position(|p| p == person)?;
        Some(self.cells.iter().map(|row| row[column]).sum())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub matrix: AllocationMatrix,
    pub records: Vec<AllocationRecord>,
}

impl AllocationResult {
    pub fn total_hours(&self) -> f64 {
        self.records.iter().map(|r| r.hours_allocated).sum()
    }

    pub fn hours_for(&self, project: &str, person: &str) -> f64 {
        self.records
            .iter()
            .find(|r| r.project == project && r.person == person)
            .map(|r| r.hours_allocated)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_requirements_keep_positive_hours_only() {
        let mut project = Project::new("Apollo", 2.0)
            .with_requirement("Engineer", 120.0)
            .with_requirement("Analyst", 0.0)
            .with_requirement("Designer", -5.0);
        project.add_requirement("Engineer", 30.0);

        assert_eq!(project.role_requirements.len(), 1);
        assert_eq!(project.required_hours(), 150.0);
    }

    #[test]
    fn test_override_kind() {
        assert_eq!(Override::new("A", "B", 0.0).kind(), Some(OverrideKind::ForceZero));
        assert_eq!(
            Override::new("A", "B", 40.0).kind(),
            Some(OverrideKind::AtLeast(40.0))
        );
        assert_eq!(Override::new("A", "B", -1.0).kind(), None);
        assert_eq!(Override::new("A", "B", f64::NAN).kind(), None);
    }

    #[test]
    fn test_input_data_resolves_ids_and_drops_duplicates() {
        let data = InputData::new(
            vec![Project::new("Apollo", 1.0), Project::new("Apollo", 9.0)],
            vec![
                Person::new("ana", 1.0, "Engineer"),
                Person::new("bo", 1.0, "Analyst"),
                Person::new("cy", 1.0, "Engineer"),
            ],
            vec![],
        );

        assert_eq!(data.projects().len(), 1);
        assert_eq!(data.project(ProjectId(0)).funding_weight, 1.0);
        assert_eq!(data.person_id("bo"), Some(PersonId(1)));
        assert_eq!(data.person_id("nobody"), None);

        let engineers: Vec<PersonId> = data.people_with_profile("Engineer").collect();
        assert_eq!(engineers, vec![PersonId(0), PersonId(2)]);
    }

    #[test]
    fn test_default_person_upper_bound() {
        assert_eq!(CapacityPolicy::default().person_upper_bound(), 2580.0);
    }
}
