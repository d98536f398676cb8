use crate::config::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_OVERRIDES_FILE, DEFAULT_PEOPLE_FILE, DEFAULT_PROJECTS_FILE,
    DEFAULT_ROLES_FILE, SUPPORTED_FORMATS,
};
use crate::domain::model::{CapacityPolicy, DEFAULT_CAPACITY_FACTOR, STANDARD_FTE_HOURS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AllocError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "resource-alloc")]
#[command(about = "Allocate people to projects by solving a linear program")]
pub struct CliConfig {
    #[arg(long, default_value = ".")]
    pub input_dir: String,

    #[arg(long, default_value = DEFAULT_PROJECTS_FILE)]
    pub projects: String,

    #[arg(long, default_value = DEFAULT_PEOPLE_FILE)]
    pub people: String,

    #[arg(long, default_value = DEFAULT_OVERRIDES_FILE)]
    pub overrides: String,

    #[arg(long, default_value = DEFAULT_ROLES_FILE)]
    pub roles: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values = ["csv", "json", "lp"])]
    pub formats: Vec<String>,

    #[arg(long, default_value_t = STANDARD_FTE_HOURS)]
    pub annual_hours: f64,

    #[arg(long, default_value_t = DEFAULT_CAPACITY_FACTOR)]
    pub capacity_factor: f64,

    #[arg(long, help = "Bundle all outputs into a single ZIP archive")]
    pub compress: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn projects_file(&self) -> &str {
        &self.projects
    }

    fn people_file(&self) -> &str {
        &self.people
    }

    fn overrides_file(&self) -> Option<&str> {
        Some(self.overrides.as_str())
    }

    fn roles_file(&self) -> &str {
        &self.roles
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn capacity(&self) -> CapacityPolicy {
        CapacityPolicy::new(self.annual_hours, self.capacity_factor)
    }

    fn output_formats(&self) -> Vec<String> {
        self.formats.clone()
    }

    fn archive_name(&self) -> Option<&str> {
        self.compress.then_some(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_dir", &self.input_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        for (field, file) in [
            ("projects", &self.projects),
            ("people", &self.people),
            ("overrides", &self.overrides),
            ("roles", &self.roles),
        ] {
            validation::validate_non_empty_string(field, file)?;
            validation::validate_file_extension(field, file, &["csv"])?;
        }
        validation::validate_positive("annual_hours", self.annual_hours)?;
        validation::validate_range("capacity_factor", self.capacity_factor, 0.1, 10.0)?;

        for format in &self.formats {
            if !SUPPORTED_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
                return Err(AllocError::InvalidConfigValueError {
                    field: "formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        SUPPORTED_FORMATS.join(", ")
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["resource-alloc"]);
        assert_eq!(config.projects, "projects.csv");
        assert_eq!(config.capacity().person_upper_bound(), 2580.0);
        assert_eq!(config.output_formats(), vec!["csv", "json", "lp"]);
        assert_eq!(config.archive_name(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_arguments() {
        let config = CliConfig::parse_from([
            "resource-alloc",
            "--input-dir",
            "data",
            "--annual-hours",
            "1600",
            "--capacity-factor",
            "1.0",
            "--formats",
            "csv",
            "--compress",
        ]);
        assert_eq!(config.input_dir(), "data");
        assert_eq!(config.capacity().person_upper_bound(), 1600.0);
        assert_eq!(config.output_formats(), vec!["csv"]);
        assert_eq!(config.archive_name(), Some("allocation_output.zip"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = CliConfig::parse_from(["resource-alloc", "--people", "people.xlsx"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["resource-alloc", "--annual-hours", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["resource-alloc", "--formats", "csv,pdf"]);
        assert!(config.validate().is_err());
    }
}
