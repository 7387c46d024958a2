use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "student-term-etl")]
#[command(about = "Reconciles student-records sources into a per-term department-focus report")]
pub struct CliConfig {
    #[arg(long, default_value = "./input/student_info.sqlite3")]
    pub student_db: String,

    #[arg(long, default_value = "./input/enrollments.dat")]
    pub enrollments: String,

    #[arg(long, default_value = "./input/departments.json")]
    pub departments: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Load paths from a TOML configuration file instead")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn student_db_path(&self) -> &str {
        &self.student_db
    }

    fn enrollments_path(&self) -> &str {
        &self.enrollments
    }

    fn departments_path(&self) -> &str {
        &self.departments
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("student_db", &self.student_db)?;
        validation::validate_path("enrollments", &self.enrollments)?;
        validation::validate_path("departments", &self.departments)?;
        validation::validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_validate() {
        let config = CliConfig::parse_from(["student-term-etl"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.output_path(), "./output");
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let config = CliConfig::parse_from(["student-term-etl", "--output-path", ""]);
        assert!(config.validate().is_err());
    }
}
