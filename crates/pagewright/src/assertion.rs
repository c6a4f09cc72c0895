//! Assertions over page state.
//!
//! Assertions run on the same engine as waits. The difference is the
//! failure: a timed-out assertion becomes `AssertionFailed` with expected and
//! observed state, ready for a test report.
//!
//! ```no_run
//! # async fn demo(page: &pagewright::PageContext) -> pagewright::PagewrightResult<()> {
//! use pagewright::{Locator, Selector, UrlPattern};
//!
//! let title = Locator::new("page title", Selector::test_id("page-title"));
//! let expect = page.assertions();
//! expect.expect(&title).to_have_text("Activities").await?;
//! expect.expect_page().to_have_url(UrlPattern::Glob("*/activities".into())).await?;
//! # Ok(())
//! # }
//! ```

mod soft;

pub use soft::{AssertionFailure, AssertionMode, AssertionSummary, SoftAssertions};

use std::fmt;
use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{Condition, UrlPattern, Wait, WaitEngine, WaitTarget};

/// Assertion engine
#[derive(Clone)]
pub struct Assertions {
    waits: WaitEngine,
}

impl fmt::Debug for Assertions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertions").finish_non_exhaustive()
    }
}

impl Assertions {
    /// Create an engine
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: Arc<RuntimeConfig>) -> Self {
        Self {
            waits: WaitEngine::new(driver, config),
        }
    }

    /// Assert that `wait` is satisfied within its timeout.
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` on timeout; driver and argument errors pass
    /// through unchanged
    pub async fn assert(&self, wait: &Wait) -> PagewrightResult<()> {
        match self.waits.wait(wait).await {
            Ok(_) => Ok(()),
            Err(PagewrightError::WaitTimeoutExpired {
                condition,
                target,
                observed,
                ..
            }) => Err(PagewrightError::AssertionFailed {
                target,
                expected: condition,
                actual: observed,
            }),
            Err(e) => Err(e),
        }
    }

    /// Start an expectation on a locator
    #[must_use]
    pub fn expect(&self, locator: &Locator) -> Expect<'_> {
        Expect {
            assertions: self,
            target: WaitTarget::Locator(locator.clone()),
            timeout_ms: None,
        }
    }

    /// Start an expectation on a resolved handle
    #[must_use]
    pub fn expect_handle(&self, handle: &ElementHandle) -> Expect<'_> {
        Expect {
            assertions: self,
            target: WaitTarget::Handle(handle.clone()),
            timeout_ms: None,
        }
    }

    /// Start an expectation on the page
    #[must_use]
    pub const fn expect_page(&self) -> PageExpect<'_> {
        PageExpect {
            assertions: self,
            timeout_ms: None,
        }
    }
}

/// Element expectation builder
#[derive(Debug)]
pub struct Expect<'a> {
    assertions: &'a Assertions,
    target: WaitTarget,
    timeout_ms: Option<u64>,
}

impl Expect<'_> {
    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The wait this expectation would run for `condition`, e.g. to feed
    /// [`SoftAssertions::expect`]
    #[must_use]
    pub fn wait_for(&self, condition: Condition) -> Wait {
        Wait {
            target: self.target.clone(),
            condition,
            timeout_ms: self.timeout_ms,
        }
    }

    async fn check(&self, condition: Condition) -> PagewrightResult<()> {
        self.assertions.assert(&self.wait_for(condition)).await
    }

    /// Expect the element to be visible
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_visible(&self) -> PagewrightResult<()> {
        self.check(Condition::Visible).await
    }

    /// Expect the element to be hidden or absent
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_hidden(&self) -> PagewrightResult<()> {
        self.check(Condition::Hidden).await
    }

    /// Expect the element to be enabled
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_enabled(&self) -> PagewrightResult<()> {
        self.check(Condition::Enabled).await
    }

    /// Expect the element to be disabled
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_disabled(&self) -> PagewrightResult<()> {
        self.check(Condition::Disabled).await
    }

    /// Expect the checkbox to be checked
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_checked(&self) -> PagewrightResult<()> {
        self.check(Condition::Checked).await
    }

    /// Expect the checkbox to be unchecked
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it is not within the timeout
    pub async fn to_be_unchecked(&self) -> PagewrightResult<()> {
        self.check(Condition::Unchecked).await
    }

    /// Expect the trimmed text to equal `text`
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it does not within the timeout
    pub async fn to_have_text(&self, text: &str) -> PagewrightResult<()> {
        self.check(Condition::HasText(text.to_string())).await
    }

    /// Expect the text to contain `text`
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it does not within the timeout
    pub async fn to_contain_text(&self, text: &str) -> PagewrightResult<()> {
        self.check(Condition::ContainsText(text.to_string())).await
    }

    /// Expect exactly `count` matches
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when the count differs at the timeout
    pub async fn to_have_count(&self, count: usize) -> PagewrightResult<()> {
        self.check(Condition::CountEquals(count)).await
    }
}

/// Page expectation builder
#[derive(Debug)]
pub struct PageExpect<'a> {
    assertions: &'a Assertions,
    timeout_ms: Option<u64>,
}

impl PageExpect<'_> {
    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    async fn check(&self, condition: Condition) -> PagewrightResult<()> {
        let wait = Wait {
            target: WaitTarget::Page,
            condition,
            timeout_ms: self.timeout_ms,
        };
        self.assertions.assert(&wait).await
    }

    /// Expect the URL to match `pattern`
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it does not within the timeout
    pub async fn to_have_url(&self, pattern: UrlPattern) -> PagewrightResult<()> {
        self.check(Condition::UrlMatches(pattern)).await
    }

    /// Expect the URL to differ from `previous`
    ///
    /// # Errors
    ///
    /// `AssertionFailed` when it does not within the timeout
    pub async fn to_have_left(&self, previous: &str) -> PagewrightResult<()> {
        self.check(Condition::UrlChangedFrom(previous.to_string()))
            .await
    }
}
