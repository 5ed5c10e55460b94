mod app;
mod assertion;
mod config;
mod http;
mod scenario;
mod validation;

pub use app::{AppError, AppResult};
pub use assertion::AssertionError;
pub use config::ConfigError;
pub use http::HttpError;
pub use scenario::ScenarioError;
pub use validation::ValidationError;
