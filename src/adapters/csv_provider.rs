//! Data provider for the four CSV input tables.
//!
//! Row-level problems (blank names, unparsable numbers, unknown projects) are
//! logged and the row is skipped. Only a table without its required columns
//! is an error.

use crate::domain::model::{InputData, Override, Person, Project};
use crate::domain::ports::{DataProvider, Storage};
use crate::utils::error::{AllocError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const PROJECT_NAME: &str = "ProjectName";
pub const FUNDING: &str = "Funding";
pub const TOTAL_RESOURCES: &str = "TotalResources";
pub const PERSON_NAME: &str = "PersonName";
pub const COST: &str = "Cost";
pub const PROFILE: &str = "Profile";
pub const CONSTRAINT_VALUE: &str = "ConstraintValue";

/// Where the provider finds each table.
#[derive(Debug, Clone)]
pub struct InputFiles {
    pub projects: String,
    pub people: String,
    pub overrides: Option<String>,
    pub roles: String,
}

impl InputFiles {
    pub fn in_dir(
        dir: &str,
        projects: &str,
        people: &str,
        overrides: Option<&str>,
        roles: &str,
    ) -> Self {
        let join = |file: &str| Path::new(dir).join(file).to_string_lossy().into_owned();
        Self {
            projects: join(projects),
            people: join(people),
            overrides: overrides.map(join),
            roles: join(roles),
        }
    }
}

pub struct CsvDataProvider<'a, S: Storage> {
    storage: &'a S,
    files: InputFiles,
}

impl<'a, S: Storage> CsvDataProvider<'a, S> {
    pub fn new(storage: &'a S, files: InputFiles) -> Self {
        Self { storage, files }
    }
}

impl<S: Storage> DataProvider for CsvDataProvider<'_, S> {
    async fn load(&self) -> Result<InputData> {
        let projects_raw = self.storage.read_file(&self.files.projects).await?;
        let mut projects = parse_projects(&self.files.projects, &projects_raw)?;

        let people_raw = self.storage.read_file(&self.files.people).await?;
        let people = parse_people(&self.files.people, &people_raw)?;

        let roles_raw = self.storage.read_file(&self.files.roles).await?;
        apply_role_requirements(&self.files.roles, &roles_raw, &mut projects)?;

        let overrides = match &self.files.overrides {
            Some(path) if self.storage.exists(path).await => {
                let raw = self.storage.read_file(path).await?;
                parse_overrides(path, &raw)?
            }
            Some(path) => {
                tracing::info!("No overrides file at {}, continuing without overrides", path);
                Vec::new()
            }
            None => Vec::new(),
        };

        warn_on_total_mismatch(&projects);

        tracing::info!(
            "Loaded {} projects, {} people, {} overrides",
            projects.len(),
            people.len(),
            overrides.len()
        );

        Ok(InputData::new(projects, people, overrides))
    }
}

fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data)
}

/// Blank, non-numeric and non-finite cells are `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn required(&self, source_name: &str, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| AllocError::data(source_name, format!("missing column '{}'", column)))
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

pub fn parse_projects(source_name: &str, data: &[u8]) -> Result<Vec<Project>> {
    let mut rdr = reader(data);
    let columns = Columns::from_headers(rdr.headers()?);
    let name_col = columns.required(source_name, PROJECT_NAME)?;
    let funding_col = columns.required(source_name, FUNDING)?;
    let total_col = columns.optional(TOTAL_RESOURCES);

    let mut projects = Vec::new();
    let mut seen = HashSet::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let name = cell(&record, name_col);
        if name.is_empty() {
            tracing::warn!("{} row {}: blank project name, skipped", source_name, line + 2);
            continue;
        }
        let Some(funding) = parse_number(cell(&record, funding_col)) else {
            tracing::warn!(
                "{} row {}: project '{}' has invalid Funding '{}', skipped",
                source_name,
                line + 2,
                name,
                cell(&record, funding_col)
            );
            continue;
        };

        // 重複的專案名稱以第一筆為準，角色需求才會落在保留下來的那一筆
        if !seen.insert(name.to_string()) {
            tracing::warn!(
                "{} row {}: duplicate project '{}', keeping the first occurrence",
                source_name,
                line + 2,
                name
            );
            continue;
        }

        let mut project = Project::new(name, funding);
        project.total_resources = total_col.and_then(|col| parse_number(cell(&record, col)));
        projects.push(project);
    }

    Ok(projects)
}

pub fn parse_people(source_name: &str, data: &[u8]) -> Result<Vec<Person>> {
    let mut rdr = reader(data);
    let columns = Columns::from_headers(rdr.headers()?);
    let name_col = columns.required(source_name, PERSON_NAME)?;
    let cost_col = columns.required(source_name, COST)?;
    let profile_col = columns.required(source_name, PROFILE)?;

    let mut people = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let name = cell(&record, name_col);
        let profile = cell(&record, profile_col);
        if name.is_empty() || profile.is_empty() {
            tracing::warn!(
                "{} row {}: blank person name or profile, skipped",
                source_name,
                line + 2
            );
            continue;
        }
        let Some(cost) = parse_number(cell(&record, cost_col)) else {
            tracing::warn!(
                "{} row {}: person '{}' has invalid Cost '{}', skipped",
                source_name,
                line + 2,
                name,
                cell(&record, cost_col)
            );
            continue;
        };
        people.push(Person::new(name, cost, profile));
    }

    Ok(people)
}

pub fn parse_overrides(source_name: &str, data: &[u8]) -> Result<Vec<Override>> {
    let mut rdr = reader(data);
    let columns = Columns::from_headers(rdr.headers()?);
    let project_col = columns.required(source_name, PROJECT_NAME)?;
    let person_col = columns.required(source_name, PERSON_NAME)?;
    let value_col = columns.required(source_name, CONSTRAINT_VALUE)?;

    let mut overrides = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let project = cell(&record, project_col);
        let person = cell(&record, person_col);
        let raw_value = cell(&record, value_col);

        match parse_number(raw_value) {
            Some(value) if value >= 0.0 => {
                overrides.push(Override::new(project, person, value));
            }
            _ => {
                tracing::warn!(
                    "⚠️ {} row {}: invalid override value '{}' for {} / {}, ignored",
                    source_name,
                    line + 2,
                    raw_value,
                    project,
                    person
                );
            }
        }
    }

    Ok(overrides)
}

/// Adds role-hour cells to the matching projects. The project column is
/// `ProjectName` when present, otherwise the first column; every other column
/// is a role.
pub fn apply_role_requirements(
    source_name: &str,
    data: &[u8],
    projects: &mut [Project],
) -> Result<()> {
    let mut rdr = reader(data);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(AllocError::data(source_name, "no header row"));
    }
    let project_col = Columns::from_headers(&headers)
        .optional(PROJECT_NAME)
        .unwrap_or(0);

    let roles: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != project_col && !name.trim().is_empty())
        .map(|(i, name)| (i, name.trim().to_string()))
        .collect();

    let mut positions: HashMap<String, usize> = HashMap::new();
    for (i, project) in projects.iter().enumerate() {
        positions.entry(project.name.clone()).or_insert(i);
    }

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let name = cell(&record, project_col);
        let Some(&position) = positions.get(name) else {
            tracing::warn!(
                "{} row {}: role requirements for unknown project '{}', skipped",
                source_name,
                line + 2,
                name
            );
            continue;
        };

        for (col, role) in &roles {
            // 空白或非數值視為 0，add_requirement 只保留正值
            let hours = parse_number(cell(&record, *col)).unwrap_or(0.0);
            projects[position].add_requirement(role.as_str(), hours);
        }
    }

    Ok(())
}

fn warn_on_total_mismatch(projects: &[Project]) {
    for project in projects {
        if let Some(total) = project.total_resources {
            let required = project.required_hours();
            if (total - required).abs() > 1e-6 {
                tracing::warn!(
                    "Project '{}': TotalResources {} differs from summed role requirements {}; \
                     the role sum is used as the project capacity",
                    project.name,
                    total,
                    required
                );
            }
        }
    }
}
