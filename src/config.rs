use crate::error::ExtractError;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_input() -> PathBuf {
    PathBuf::from("gov.pdf")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// File names of the JSON outputs, relative to `output_dir`.
#[derive(Deserialize, Debug)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub per_demand_files: bool,
    #[serde(default = "default_demands_file")]
    pub demands_file: String,
    #[serde(default = "default_mapping_file")]
    pub mapping_file: String,
    #[serde(default = "default_analysis_file")]
    pub analysis_file: String,
}

fn default_true() -> bool {
    true
}

fn default_demands_file() -> String {
    "all_demands.json".to_string()
}

fn default_mapping_file() -> String {
    "ministry_department_mapping.json".to_string()
}

fn default_analysis_file() -> String {
    "budget_analysis.json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            per_demand_files: true,
            demands_file: default_demands_file(),
            mapping_file: default_mapping_file(),
            analysis_file: default_analysis_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            log_filter: default_log_filter(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "input = \"budget.pdf\"\n[output]\nper_demand_files = false\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.input, PathBuf::from("budget.pdf"));
        assert_eq!(cfg.output_dir, PathBuf::from("output_json"));
        assert!(!cfg.output.per_demand_files);
        assert_eq!(cfg.output.analysis_file, "budget_analysis.json");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.log_filter, "info");
        assert!(cfg.output.per_demand_files);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "input = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_overrides_win() {
        let cfg = Config::default().with_overrides(Some("x.txt".into()), None);
        assert_eq!(cfg.input, PathBuf::from("x.txt"));
        assert_eq!(cfg.output_dir, PathBuf::from("output_json"));
    }
}
