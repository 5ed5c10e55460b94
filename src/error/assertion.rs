use thiserror::Error;

/// A response arrived but did not satisfy one of the scenario's rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssertionError {
    #[error("{rule}: status code is invalid: expected: {expected}, got: {actual}")]
    StatusCode {
        rule: String,
        expected: u16,
        actual: u16,
    },
}
