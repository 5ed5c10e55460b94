use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ScenarioFile;

/// File read when `--file` is not given.
pub const DEFAULT_SCENARIO_FILE: &str = "scenario.yml";

/// Reads and parses a scenario file. The format follows the extension:
/// `.yml`/`.yaml`, `.toml` or `.json`.
///
/// Only syntax is checked here; per-scenario settings are validated when each
/// scenario starts so one bad entry cannot stop the others.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, or lists no
/// scenarios.
pub fn load_scenario_file(path: &Path) -> AppResult<ScenarioFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let file: ScenarioFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml" | "yaml") => serde_yaml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some(ext) => {
            return Err(AppError::config(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            }));
        }
        None => return Err(AppError::config(ConfigError::MissingExtension)),
    };

    if file.scenarios.is_empty() {
        return Err(AppError::config(ConfigError::NoScenarios {
            path: path.to_path_buf(),
        }));
    }
    Ok(file)
}
