//! Selector fallback resolution.
//!
//! [`FallbackChain`] is the only place that knows the fallback policy:
//! candidates are probed strictly in declaration order with a cheap
//! existence check, the first candidate that matches anything wins, and
//! later candidates are never touched.

use std::fmt;
use std::sync::Arc;

use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::{Locator, Selector};
use crate::result::{PagewrightError, PagewrightResult};

/// Result of probing one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Matched this many elements
    Found(usize),
    /// Matched nothing
    Missing,
    /// The probe itself failed
    Failed(String),
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(n) => write!(f, "found {n}"),
            Self::Missing => write!(f, "not found"),
            Self::Failed(message) => write!(f, "probe failed: {message}"),
        }
    }
}

/// One probed candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Candidate position in the locator
    pub index: usize,
    /// The candidate
    pub selector: Selector,
    /// What the probe saw
    pub outcome: ProbeOutcome,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.index + 1, self.selector, self.outcome)
    }
}

/// A successfully resolved locator
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Handle for every match of the winning candidate
    pub handle: ElementHandle,
    /// Position of the winning candidate
    pub index: usize,
    /// The winning candidate
    pub selector: Selector,
    /// Number of elements it matched
    pub matches: usize,
    /// Every probe made, the winner last
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// Whether a lower-preference candidate had to be used
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        self.index > 0
    }
}

/// Ordered-fallback element resolver
#[derive(Clone)]
pub struct FallbackChain {
    driver: Arc<dyn BrowserDriver>,
}

impl fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain").finish_non_exhaustive()
    }
}

impl FallbackChain {
    /// Create a chain over `driver`
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    /// Resolve `locator` against the whole page.
    ///
    /// # Errors
    ///
    /// Returns `NoCandidateResolved` listing every attempt when no candidate
    /// matches
    pub async fn resolve(&self, locator: &Locator) -> PagewrightResult<Resolution> {
        self.resolve_in(locator, None).await
    }

    /// Resolve `locator` inside the matches of `scope`.
    ///
    /// # Errors
    ///
    /// Returns `NoCandidateResolved` listing every attempt when no candidate
    /// matches
    pub async fn resolve_within(
        &self,
        locator: &Locator,
        scope: &ElementHandle,
    ) -> PagewrightResult<Resolution> {
        self.resolve_in(locator, Some(scope)).await
    }

    /// Lazy handles for every candidate, in order, without probing
    #[must_use]
    pub fn handles(&self, locator: &Locator, scope: Option<&ElementHandle>) -> Vec<ElementHandle> {
        locator
            .candidates()
            .iter()
            .map(|selector| self.driver.locate(selector, scope))
            .collect()
    }

    async fn resolve_in(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
    ) -> PagewrightResult<Resolution> {
        let mut attempts = Vec::with_capacity(locator.len());
        for (index, selector) in locator.candidates().iter().enumerate() {
            let handle = self.driver.locate(selector, scope);
            let outcome = match self.driver.count(&handle).await {
                Ok(0) => ProbeOutcome::Missing,
                Ok(n) => ProbeOutcome::Found(n),
                Err(e) => ProbeOutcome::Failed(e.to_string()),
            };
            tracing::debug!(
                element = locator.name(),
                candidate = index,
                strategy = selector.strategy(),
                selector = %selector,
                outcome = %outcome,
                "probed selector candidate"
            );
            let found = match outcome {
                ProbeOutcome::Found(n) => Some(n),
                _ => None,
            };
            attempts.push(Attempt {
                index,
                selector: selector.clone(),
                outcome,
            });
            if let Some(matches) = found {
                return Ok(Resolution {
                    handle,
                    index,
                    selector: selector.clone(),
                    matches,
                    attempts,
                });
            }
        }

        Err(PagewrightError::NoCandidateResolved {
            element: locator.name().to_string(),
            attempted: attempts.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use crate::mock::{MockDriver, MockElement};

    fn chain_with(elements: Vec<MockElement>) -> (Arc<MockDriver>, FallbackChain) {
        let driver = Arc::new(MockDriver::new());
        for e in elements {
            driver.insert(e);
        }
        let chain = FallbackChain::new(driver.clone());
        (driver, chain)
    }

    mod resolve_tests {
        use super::*;

        #[tokio::test]
        async fn test_primary_wins_and_fallbacks_untouched() {
            let (driver, chain) = chain_with(vec![MockElement::new("q", "input")
                .test_id("search-input")
                .placeholder("Search...")]);
            let loc = Locator::new("search", Selector::test_id("search-input"))
                .or(Selector::placeholder("Search..."));

            let r = chain.resolve(&loc).await.unwrap();
            assert_eq!(r.index, 0);
            assert!(!r.used_fallback());
            assert_eq!(r.attempts.len(), 1);
            assert!(!driver.was_called("count:placeholder"));
        }

        #[tokio::test]
        async fn test_second_candidate_wins() {
            let (driver, chain) =
                chain_with(vec![MockElement::new("q", "input").placeholder("Search activities...")]);
            let loc = Locator::new("search", Selector::test_id("search-input"))
                .or(Selector::placeholder("Search activities..."))
                .or(Selector::css("input.search"));

            let r = chain.resolve(&loc).await.unwrap();
            assert_eq!(r.index, 1);
            assert_eq!(r.selector, Selector::placeholder("Search activities..."));
            assert_eq!(r.attempts[0].outcome, ProbeOutcome::Missing);
            assert!(!driver.was_called("count:css"));
        }

        #[tokio::test]
        async fn test_multi_match_handle_covers_all() {
            let (_, chain) = chain_with(vec![
                MockElement::new("r1", "tr").query("tbody tr"),
                MockElement::new("r2", "tr").query("tbody tr"),
            ]);
            let r = chain.resolve(&Locator::from(Selector::css("tbody tr"))).await.unwrap();
            assert_eq!(r.matches, 2);
        }

        #[tokio::test]
        async fn test_failure_lists_every_attempt_in_order() {
            let (_, chain) = chain_with(vec![]);
            let loc = Locator::new("save button", Selector::test_id("save"))
                .or(Selector::role_named("button", "Save"))
                .or(Selector::css("button.save"));

            let err = chain.resolve(&loc).await.unwrap_err();
            let PagewrightError::NoCandidateResolved { element, attempted } = &err else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(element, "save button");
            assert_eq!(attempted.len(), 3);
            assert!(attempted[0].starts_with("#1 test-id(\"save\")"));
            assert!(attempted[1].contains("role(\"button\", name=\"Save\")"));
            assert!(attempted[2].ends_with("(not found)"));
        }

        #[tokio::test]
        async fn test_probe_error_counts_as_failed_attempt() {
            let (driver, chain) = chain_with(vec![MockElement::new("b", "button").text("Save")]);
            driver.fail_probe(
                Selector::test_id("save"),
                DriverError::Protocol("stale frame".into()),
            );
            let loc = Locator::new("save", Selector::test_id("save")).or(Selector::text("Save"));

            let r = chain.resolve(&loc).await.unwrap();
            assert_eq!(r.index, 1);
            assert_eq!(
                r.attempts[0].outcome,
                ProbeOutcome::Failed("stale frame".into())
            );
        }

        #[tokio::test]
        async fn test_resolve_within_scope() {
            let (driver, chain) = chain_with(vec![
                MockElement::new("panel", "div").test_id("options"),
                MockElement::new("o1", "li").role("option").text("Closed").inside("panel"),
                MockElement::new("o2", "li").role("option").text("Closed"),
            ]);
            let scope = driver.locate(&Selector::test_id("options"), None);
            let r = chain
                .resolve_within(&Locator::from(Selector::role_named("option", "Closed")), &scope)
                .await
                .unwrap();
            assert_eq!(r.matches, 1);
            assert!(r.handle.description().starts_with("test-id(\"options\") >> "));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_first_present_candidate_wins(present in proptest::collection::vec(any::<bool>(), 1..8)) {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                let elements = present
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| **p)
                    .map(|(i, _)| MockElement::new(format!("e{i}"), "div").test_id(format!("c{i}")))
                    .collect();
                let (driver, chain) = chain_with(elements);
                let candidates = (0..present.len())
                    .map(|i| Selector::test_id(format!("c{i}")))
                    .collect();
                let loc = Locator::from_candidates("prop", candidates).unwrap();

                let result = runtime.block_on(chain.resolve(&loc));
                match present.iter().position(|p| *p) {
                    Some(winner) => {
                        let r = result.unwrap();
                        prop_assert_eq!(r.index, winner);
                        prop_assert_eq!(r.attempts.len(), winner + 1);
                        prop_assert_eq!(driver.call_count("count:"), winner + 1);
                    }
                    None => {
                        let is_exhausted = matches!(
                            result,
                            Err(PagewrightError::NoCandidateResolved { ref attempted, .. })
                                if attempted.len() == present.len()
                        );
                        prop_assert!(is_exhausted);
                    }
                }
            }
        }
    }
}
