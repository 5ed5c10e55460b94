use crate::error::AssertionError;
use crate::scenario::Validate;

use super::CompletedResponse;

/// Applies `rules` in order; the first failing rule is returned and the rest
/// are skipped. An empty rule list always passes.
///
/// # Errors
///
/// Returns the first assertion the response does not satisfy.
pub fn validate(rules: &[Validate], response: &CompletedResponse) -> Result<(), AssertionError> {
    rules.iter().try_for_each(|rule| rule.check(response))
}

impl Validate {
    /// Runs every check set on this rule against `response`.
    ///
    /// # Errors
    ///
    /// Returns the first check that fails.
    pub fn check(&self, response: &CompletedResponse) -> Result<(), AssertionError> {
        if let Some(expected) = self.status_code
            && response.status != expected
        {
            return Err(AssertionError::StatusCode {
                rule: self.label("status_code"),
                expected,
                actual: response.status,
            });
        }
        Ok(())
    }
}
