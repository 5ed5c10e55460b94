//! Core library for the `trickle` CLI.
//!
//! `trickle` runs named HTTP GET scenarios side by side, each at its own
//! request rate, checks every response against the scenario's rules and
//! counts the outcomes. The library exposes the pieces the binary wires
//! together: argument types, scenario file loading, the execution engine and
//! summary rendering.
pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod scenario;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;
