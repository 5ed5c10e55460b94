use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::DEFAULT_SCENARIO_FILE;
use crate::engine::EngineConfig;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::{OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Paced outbound HTTP traffic generator - runs named scenarios concurrently at a fixed request rate, validates responses, and reports outcome counts."
)]
pub struct RunArgs {
    /// Scenario file (.yml, .yaml, .toml or .json)
    #[arg(long = "file", short = 'f', default_value = DEFAULT_SCENARIO_FILE)]
    pub scenario_file: PathBuf,

    /// HTTP request concurrency per scenario
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = "100",
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Timeout for each request (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Format of the final summary
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl RunArgs {
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            workers: self.concurrency.as_non_zero(),
            request_timeout: self.request_timeout,
        }
    }
}
