use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read scenario file '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML scenario file '{path}': {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to parse TOML scenario file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON scenario file '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported scenario file extension '{ext}'. Use .yml, .yaml, .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Scenario file must have a .yml, .yaml, .toml or .json extension.")]
    MissingExtension,
    #[error("Scenario file '{path}' does not define any scenarios.")]
    NoScenarios { path: PathBuf },
}
