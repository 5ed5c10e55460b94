//! Scenario file loading.
mod loader;
pub mod types;


pub use loader::{DEFAULT_SCENARIO_FILE, load_scenario_file};
pub use types::ScenarioFile;
