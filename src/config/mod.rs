#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub const DEFAULT_PROJECTS_FILE: &str = "projects.csv";
pub const DEFAULT_PEOPLE_FILE: &str = "people.csv";
pub const DEFAULT_OVERRIDES_FILE: &str = "overrides.csv";
pub const DEFAULT_ROLES_FILE: &str = "roles.csv";
pub const DEFAULT_ARCHIVE_NAME: &str = "allocation_output.zip";

pub const SUPPORTED_FORMATS: [&str; 3] = ["csv", "json", "lp"];

#[cfg(feature = "cli")]
pub use cli::CliConfig;
