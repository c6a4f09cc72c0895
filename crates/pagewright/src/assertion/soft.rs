//! Soft assertions.
//!
//! Collect failures without stopping the test, then report them all at once
//! with [`SoftAssertions::verify`]. In [`AssertionMode::FailFast`] the first
//! failure is returned immediately instead.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::panic::Location;

use super::Assertions;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::Wait;

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Location where the assertion failed (<file:line>)
    pub location: Option<String>,
    /// Index of this assertion in the sequence
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            location: None,
            index,
        }
    }

    /// Set the location of the failure
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Mode for soft assertions behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionMode {
    /// Collect all failures (default)
    #[default]
    Collect,
    /// Stop on first failure (like hard assertions)
    FailFast,
}

/// Soft assertions collector
///
/// ```
/// use pagewright::SoftAssertions;
///
/// let mut soft = SoftAssertions::new();
/// soft.assert_eq(&"Open", &"Closed", "status column").unwrap();
/// soft.assert_true(false, "row is highlighted").unwrap();
/// assert_eq!(soft.failure_count(), 2);
/// assert!(soft.verify().is_err());
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
    mode: AssertionMode,
    assertion_count: usize,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a specific mode
    #[must_use]
    pub fn with_mode(mode: AssertionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> AssertionMode {
        self.mode
    }

    /// Check a page-state expectation, recording a timeout as a failure.
    ///
    /// Returns whether the expectation held.
    ///
    /// # Errors
    ///
    /// Driver failures always propagate; an assertion failure propagates in
    /// [`AssertionMode::FailFast`]
    pub async fn expect(&mut self, assertions: &Assertions, wait: &Wait) -> PagewrightResult<bool> {
        self.assertion_count += 1;
        match assertions.assert(wait).await {
            Ok(()) => Ok(true),
            Err(e @ PagewrightError::AssertionFailed { .. }) => {
                self.record(e.to_string(), None)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Assert two values are equal
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_eq<T: PartialEq + Debug>(
        &mut self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> PagewrightResult<()> {
        self.check(
            actual == expected,
            format!("{message}: expected {expected:?}, got {actual:?}"),
        )
    }

    /// Assert two values are not equal
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_ne<T: PartialEq + Debug>(
        &mut self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> PagewrightResult<()> {
        self.check(
            actual != expected,
            format!("{message}: expected values to differ, both were {actual:?}"),
        )
    }

    /// Assert a condition is true
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_true(&mut self, condition: bool, message: &str) -> PagewrightResult<()> {
        self.check(condition, format!("{message}: expected true, got false"))
    }

    /// Assert a condition is false
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_false(&mut self, condition: bool, message: &str) -> PagewrightResult<()> {
        self.check(!condition, format!("{message}: expected false, got true"))
    }

    /// Assert a string contains a substring
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_contains(
        &mut self,
        haystack: &str,
        needle: &str,
        message: &str,
    ) -> PagewrightResult<()> {
        self.check(
            haystack.contains(needle),
            format!("{message}: expected '{haystack}' to contain '{needle}'"),
        )
    }

    /// Assert a collection has expected length
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn assert_len<T>(
        &mut self,
        collection: &[T],
        expected: usize,
        message: &str,
    ) -> PagewrightResult<()> {
        self.check(
            collection.len() == expected,
            format!(
                "{message}: expected length {expected}, got {}",
                collection.len()
            ),
        )
    }

    /// Record a custom failure
    ///
    /// # Errors
    ///
    /// `AssertionFailed` in fail-fast mode
    #[track_caller]
    pub fn fail(&mut self, message: impl Into<String>) -> PagewrightResult<()> {
        self.check(false, message.into())
    }

    #[track_caller]
    fn check(&mut self, passed: bool, message: String) -> PagewrightResult<()> {
        self.assertion_count += 1;
        if passed {
            return Ok(());
        }
        let caller = Location::caller();
        self.record(message, Some(format!("{}:{}", caller.file(), caller.line())))
    }

    fn record(&mut self, message: String, location: Option<String>) -> PagewrightResult<()> {
        let mut failure = AssertionFailure::new(message, self.failures.len());
        if let Some(location) = location {
            failure = failure.with_location(location);
        }
        tracing::debug!(failure = %failure, "soft assertion failed");
        if self.mode == AssertionMode::FailFast {
            let err = PagewrightError::AssertionFailed {
                target: "soft assertion".to_string(),
                expected: "pass".to_string(),
                actual: failure.to_string(),
            };
            self.failures.push(failure);
            return Err(err);
        }
        self.failures.push(failure);
        Ok(())
    }

    /// Get all failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of assertions checked
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Verify all assertions passed, returning every failure otherwise
    ///
    /// # Errors
    ///
    /// Returns `SoftAssertionsFailed` if any assertion failed
    pub fn verify(&self) -> PagewrightResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(PagewrightError::SoftAssertionsFailed {
            count: self.failures.len(),
            failures: self.failures.iter().map(ToString::to_string).collect(),
        })
    }

    /// Clear all recorded failures
    pub fn clear(&mut self) {
        self.failures.clear();
        self.assertion_count = 0;
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count - self.failures.len(),
            failed: self.failures.len(),
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod collect_mode {
        use super::*;

        #[test]
        fn test_new_creates_empty() {
            let soft = SoftAssertions::new();
            assert!(soft.all_passed());
            assert_eq!(soft.assertion_count(), 0);
            assert_eq!(soft.mode(), AssertionMode::Collect);
            assert!(soft.verify().is_ok());
        }

        #[test]
        fn test_failures_accumulate_in_order() {
            let mut soft = SoftAssertions::new();
            soft.assert_eq(&"Open", &"Closed", "status").unwrap();
            soft.assert_true(true, "visible").unwrap();
            soft.assert_contains("Case #42", "#43", "title").unwrap();
            soft.fail("custom").unwrap();

            assert_eq!(soft.assertion_count(), 4);
            assert_eq!(soft.failure_count(), 3);
            assert_eq!(soft.failures()[1].index, 1);
            assert!(soft.failures()[0].message.starts_with("status: expected \"Closed\""));
            assert!(soft.failures()[0]
                .location
                .as_deref()
                .unwrap()
                .contains("soft.rs"));
        }

        #[test]
        fn test_verify_reports_everything() {
            let mut soft = SoftAssertions::new();
            soft.assert_false(true, "flag").unwrap();
            soft.assert_len(&[1, 2], 3, "rows").unwrap();

            let err = soft.verify().unwrap_err();
            let PagewrightError::SoftAssertionsFailed { count, failures } = &err else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(*count, 2);
            assert!(failures[1].contains("expected length 3, got 2"));
            assert!(err.to_string().starts_with("2 soft assertion(s) failed:"));
        }

        #[test]
        fn test_summary_and_clear() {
            let mut soft = SoftAssertions::new();
            soft.assert_ne(&1, &2, "differ").unwrap();
            soft.assert_ne(&1, &1, "differ").unwrap();
            assert_eq!(
                soft.summary(),
                AssertionSummary {
                    total: 2,
                    passed: 1,
                    failed: 1
                }
            );
            soft.clear();
            assert!(soft.all_passed());
            assert_eq!(soft.assertion_count(), 0);
        }
    }

    mod fail_fast_mode {
        use super::*;

        #[test]
        fn test_first_failure_returns_error() {
            let mut soft = SoftAssertions::with_mode(AssertionMode::FailFast);
            soft.assert_true(true, "fine").unwrap();
            let err = soft.assert_eq(&1, &2, "numbers").unwrap_err();
            assert!(matches!(err, PagewrightError::AssertionFailed { .. }));
            assert_eq!(soft.failure_count(), 1);
        }
    }

    mod page_expectations {
        use super::*;
        use crate::config::{ConfigOverrides, Environment, RuntimeConfig};
        use crate::locator::{Locator, Selector};
        use crate::mock::{MockDriver, MockElement};
        use crate::wait::Condition;
        use std::sync::Arc;

        #[tokio::test(start_paused = true)]
        async fn test_expect_records_instead_of_failing() {
            let driver = Arc::new(MockDriver::new());
            driver.insert(MockElement::new("t", "h1").test_id("title").text("Clients"));
            let config = RuntimeConfig::with_overrides(
                Environment::Qa,
                ConfigOverrides::new().timeout_ms(1_000),
            )
            .unwrap();
            let assertions = Assertions::new(driver, Arc::new(config));
            let title = Locator::from(Selector::test_id("title"));

            let mut soft = SoftAssertions::new();
            let held = soft
                .expect(&assertions, &Wait::locator(&title, Condition::Visible))
                .await
                .unwrap();
            assert!(held);
            let held = soft
                .expect(
                    &assertions,
                    &assertions
                        .expect(&title)
                        .wait_for(Condition::HasText("Activities".into())),
                )
                .await
                .unwrap();
            assert!(!held);
            assert_eq!(soft.failure_count(), 1);
            assert!(soft.failures()[0].message.contains("Clients"));
        }
    }
}
