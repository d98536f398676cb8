use crate::config::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_PEOPLE_FILE, DEFAULT_PROJECTS_FILE, DEFAULT_ROLES_FILE,
    SUPPORTED_FORMATS,
};
use crate::domain::model::{CapacityPolicy, DEFAULT_CAPACITY_FACTOR, STANDARD_FTE_HOURS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AllocError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub dir: String,
    #[serde(default = "default_projects")]
    pub projects: String,
    #[serde(default = "default_people")]
    pub people: String,
    pub overrides: Option<String>,
    #[serde(default = "default_roles")]
    pub roles: String,
}

fn default_projects() -> String {
    DEFAULT_PROJECTS_FILE.to_string()
}

fn default_people() -> String {
    DEFAULT_PEOPLE_FILE.to_string()
}

fn default_roles() -> String {
    DEFAULT_ROLES_FILE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub annual_hours: Option<f64>,
    pub capacity_factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Option<Vec<String>>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AllocError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AllocError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AllocError::ConfigError {
            message: format!("Invalid environment variable pattern: {}", e),
        })?;

        let substituted = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });
        Ok(substituted.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("run.name", &self.run.name)?;
        validation::validate_path("input.dir", &self.input.dir)?;
        validation::validate_path("output.path", &self.output.path)?;

        let mut files = vec![
            ("input.projects", self.input.projects.as_str()),
            ("input.people", self.input.people.as_str()),
            ("input.roles", self.input.roles.as_str()),
        ];
        if let Some(overrides) = &self.input.overrides {
            files.push(("input.overrides", overrides.as_str()));
        }
        for (field, file) in files {
            validation::validate_file_extension(field, file, &["csv"])?;
        }

        let capacity = self.capacity();
        validation::validate_positive("capacity.annual_hours", capacity.annual_hours)?;
        validation::validate_range("capacity.capacity_factor", capacity.capacity_factor, 0.1, 10.0)?;

        // 驗證輸出格式
        for format in self.formats() {
            if !SUPPORTED_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
                return Err(AllocError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        SUPPORTED_FORMATS.join(", ")
                    ),
                });
            }
        }

        if let Some(compression) = &self.output.compression {
            if compression.enabled {
                let filename = compression
                    .filename
                    .as_deref()
                    .unwrap_or(DEFAULT_ARCHIVE_NAME);
                validation::validate_file_extension(
                    "output.compression.filename",
                    filename,
                    &["zip"],
                )?;
            }
        }

        Ok(())
    }

    /// 取得輸出格式，未設定時輸出全部
    pub fn formats(&self) -> Vec<String> {
        self.output
            .formats
            .clone()
            .unwrap_or_else(|| SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn capacity(&self) -> CapacityPolicy {
        CapacityPolicy::new(
            self.capacity.annual_hours.unwrap_or(STANDARD_FTE_HOURS),
            self.capacity
                .capacity_factor
                .unwrap_or(DEFAULT_CAPACITY_FACTOR),
        )
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.input.dir
    }

    fn projects_file(&self) -> &str {
        &self.input.projects
    }

    fn people_file(&self) -> &str {
        &self.input.people
    }

    fn overrides_file(&self) -> Option<&str> {
        self.input.overrides.as_deref()
    }

    fn roles_file(&self) -> &str {
        &self.input.roles
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn capacity(&self) -> CapacityPolicy {
        TomlConfig::capacity(self)
    }

    fn output_formats(&self) -> Vec<String> {
        self.formats()
    }

    fn archive_name(&self) -> Option<&str> {
        self.output
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
