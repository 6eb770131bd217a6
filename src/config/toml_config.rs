use crate::core::evaluator::MAX_DECIMALS;
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{CuppingError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub report: ReportInfo,
    pub output: OutputConfig,
    pub batch: Option<InputConfig>,
    pub sales: Option<InputConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Option<Vec<OutputFormat>>,
    pub archive: Option<bool>,
    pub decimals: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

/// Resolved settings for one report job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub input_path: String,
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub archive: bool,
    pub decimals: u32,
}

impl ConfigProvider for JobSettings {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    fn archive(&self) -> bool {
        self.archive
    }

    fn decimals(&self) -> u32 {
        self.decimals
    }
}

impl ReportConfig {
    /// Reads and parses a TOML file, expanding `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CuppingError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CuppingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CuppingError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_formats(&self) -> Vec<OutputFormat> {
        self.output
            .formats
            .clone()
            .unwrap_or_else(|| vec![OutputFormat::Csv, OutputFormat::Json])
    }

    pub fn decimals(&self) -> u32 {
        self.output.decimals.unwrap_or(2)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    fn job(&self, input: &InputConfig) -> JobSettings {
        JobSettings {
            input_path: input.input.clone(),
            output_path: self.output.output_path.clone(),
            output_formats: self.output_formats(),
            archive: self.output.archive.unwrap_or(false),
            decimals: self.decimals(),
        }
    }

    pub fn batch_job(&self) -> Option<JobSettings> {
        self.batch.as_ref().map(|input| self.job(input))
    }

    pub fn sales_job(&self) -> Option<JobSettings> {
        self.sales.as_ref().map(|input| self.job(input))
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("report.name", &self.report.name)?;
        validate_path("output.output_path", &self.output.output_path)?;
        validate_range("output.decimals", self.decimals(), 0, MAX_DECIMALS)?;

        if self.output_formats().is_empty() {
            return Err(CuppingError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }

        if self.batch.is_none() && self.sales.is_none() {
            return Err(CuppingError::MissingConfigError {
                field: "batch or sales".to_string(),
            });
        }

        for (field, input) in [("batch.input", &self.batch), ("sales.input", &self.sales)] {
            if let Some(input) = input {
                validate_path(field, &input.input)?;
                validate_file_extensions(field, std::slice::from_ref(&input.input), &["csv"])?;
            }
        }

        Ok(())
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
