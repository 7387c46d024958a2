use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineInfo,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub student_db: String,
    pub enrollments: String,
    pub departments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unknown
    /// variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn student_db_path(&self) -> &str {
        &self.source.student_db
    }

    fn enrollments_path(&self) -> &str {
        &self.source.enrollments
    }

    fn departments_path(&self) -> &str {
        &self.source.departments
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("source.student_db", &self.source.student_db)?;
        validation::validate_path("source.enrollments", &self.source.enrollments)?;
        validation::validate_path("source.departments", &self.source.departments)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "term-report"
description = "Student term focus report"
version = "1.0.0"

[source]
student_db = "./input/student_info.sqlite3"
enrollments = "./input/enrollments.dat"
departments = "./input/departments.json"

[load]
output_path = "./report-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "term-report");
        assert_eq!(config.enrollments_path(), "./input/enrollments.dat");
        assert_eq!(config.output_path(), "./report-output");
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_ETL_OUTPUT", "/tmp/etl-output");

        let toml_content = r#"
[pipeline]
name = "term-report"
description = "test"
version = "1.0"

[source]
student_db = "./input/student_info.sqlite3"
enrollments = "./input/enrollments.dat"
departments = "./input/departments.json"

[load]
output_path = "${TEST_ETL_OUTPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "/tmp/etl-output");

        std::env::remove_var("TEST_ETL_OUTPUT");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
student_db = "./db"
enrollments = "./dat"
departments = "./json"

[load]
output_path = "./output"

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_missing_section_is_a_config_error() {
        let toml_content = r#"
[pipeline]
name = "broken"
description = "no sources"
version = "1.0"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }
}
