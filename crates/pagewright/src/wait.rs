//! State-based waits.
//!
//! A [`Wait`] pairs a target with a [`Condition`] and an optional timeout.
//! The [`WaitEngine`] never polls on its own: it picks the driver wait
//! primitive that matches the condition and hands it the effective timeout
//! (the per-call value, else `RuntimeConfig::timeout_ms`).
//!
//! ## Combinators
//!
//! - [`WaitEngine::any`] resolves with the index of the first satisfied wait
//! - [`WaitEngine::all`] runs every wait concurrently; total time tracks the
//!   slowest member, not the sum
//! - [`WaitEngine::wait_soft`] turns a timeout into `Ok(false)`
//! - [`WaitEngine::wait_until_gone`] waits for something to appear and then
//!   disappear (loading spinners, toasts)
//!
//! A timeout of 0 checks once and fails immediately if unsatisfied.

use futures::future::{select_ok, try_join_all};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::chain::FallbackChain;
use crate::config::RuntimeConfig;
use crate::driver::{BrowserDriver, ElementHandle, ElementState};
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};

// =============================================================================
// URL PATTERN
// =============================================================================

/// Pattern for matching page URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match, compiled once (see [`UrlPattern::regex`])
    Regex(UrlRegex),
    /// Glob pattern (e.g., "**/cases/*/edit")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Compile a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `pattern` is not a valid regex
    pub fn regex(pattern: &str) -> PagewrightResult<Self> {
        UrlRegex::new(pattern).map(Self::Regex)
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(re) => re.is_match(url),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "{p:?}"),
            Self::Prefix(p) => write!(f, "prefix {p:?}"),
            Self::Contains(p) => write!(f, "containing {p:?}"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Glob(p) => write!(f, "glob {p:?}"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Compiled URL regex; compares and serializes as its source text
#[derive(Debug, Clone)]
pub struct UrlRegex(regex::Regex);

impl UrlRegex {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `pattern` is not a valid regex
    pub fn new(pattern: &str) -> PagewrightResult<Self> {
        regex::Regex::new(pattern).map(Self).map_err(|e| {
            PagewrightError::invalid_argument(format!("invalid url regex {pattern:?}: {e}"))
        })
    }

    /// Source text
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `url` matches
    #[must_use]
    pub fn is_match(&self, url: &str) -> bool {
        self.0.is_match(url)
    }
}

impl PartialEq for UrlRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for UrlRegex {}

impl Serialize for UrlRegex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UrlRegex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::new(&pattern).map_err(serde::de::Error::custom)
    }
}

/// `*` matches any run of characters; everything else is literal.
///
/// The first segment is anchored at the start and the last at the end
/// unless the pattern begins or ends with `*`.
fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let &[head, ref middle @ .., tail] = parts.as_slice() else {
        return url == pattern;
    };
    if head.len() + tail.len() > url.len() || !url.starts_with(head) || !url.ends_with(tail) {
        return false;
    }
    let mut rest = &url[head.len()..url.len() - tail.len()];
    for &part in middle.iter().filter(|p| !p.is_empty()) {
        match rest.find(part) {
            Some(found) => rest = &rest[found + part.len()..],
            None => return false,
        }
    }
    true
}

// =============================================================================
// CONDITIONS AND TARGETS
// =============================================================================

/// What a wait is waiting for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Attached and rendered
    Visible,
    /// Absent or not rendered
    Hidden,
    /// Present in the DOM
    Attached,
    /// Absent from the DOM
    Detached,
    /// Accepts interaction
    Enabled,
    /// Refuses interaction
    Disabled,
    /// Checkbox/radio on
    Checked,
    /// Checkbox/radio off
    Unchecked,
    /// Trimmed text equals
    HasText(String),
    /// Text contains
    ContainsText(String),
    /// Page URL differs from the given one
    UrlChangedFrom(String),
    /// Page URL matches
    UrlMatches(UrlPattern),
    /// Exactly this many elements match
    CountEquals(usize),
}

impl Condition {
    /// Conditions satisfied by an element that does not exist
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::Hidden | Self::Detached | Self::CountEquals(0))
    }

    /// Conditions about the page rather than an element
    #[must_use]
    pub const fn is_page_level(&self) -> bool {
        matches!(self, Self::UrlChangedFrom(_) | Self::UrlMatches(_))
    }

    /// Driver element state for state conditions
    #[must_use]
    pub const fn element_state(&self) -> Option<ElementState> {
        match self {
            Self::Visible => Some(ElementState::Visible),
            Self::Hidden => Some(ElementState::Hidden),
            Self::Attached => Some(ElementState::Attached),
            Self::Detached => Some(ElementState::Detached),
            Self::Enabled => Some(ElementState::Enabled),
            Self::Disabled => Some(ElementState::Disabled),
            Self::Checked => Some(ElementState::Checked),
            Self::Unchecked => Some(ElementState::Unchecked),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(state) = self.element_state() {
            return write!(f, "{state}");
        }
        match self {
            Self::HasText(t) => write!(f, "text {t:?}"),
            Self::ContainsText(t) => write!(f, "containing {t:?}"),
            Self::UrlChangedFrom(u) => write!(f, "url changed from {u:?}"),
            Self::UrlMatches(p) => write!(f, "url matching {p}"),
            Self::CountEquals(n) => write!(f, "count {n}"),
            _ => Ok(()),
        }
    }
}

/// What a wait observes
#[derive(Debug, Clone)]
pub enum WaitTarget {
    /// The page itself (URL conditions)
    Page,
    /// A logical element resolved through the fallback chain
    Locator(Locator),
    /// An already resolved handle
    Handle(ElementHandle),
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::Locator(l) => write!(f, "{l}"),
            Self::Handle(h) => write!(f, "{h}"),
        }
    }
}

/// A wait request
#[derive(Debug, Clone)]
pub struct Wait {
    /// Target
    pub target: WaitTarget,
    /// Condition
    pub condition: Condition,
    /// Per-call timeout; the configured default when `None`
    pub timeout_ms: Option<u64>,
}

impl Wait {
    /// Wait on a locator
    #[must_use]
    pub fn locator(locator: &Locator, condition: Condition) -> Self {
        Self {
            target: WaitTarget::Locator(locator.clone()),
            condition,
            timeout_ms: None,
        }
    }

    /// Wait on a resolved handle
    #[must_use]
    pub fn handle(handle: &ElementHandle, condition: Condition) -> Self {
        Self {
            target: WaitTarget::Handle(handle.clone()),
            condition,
            timeout_ms: None,
        }
    }

    /// Wait on the page URL
    #[must_use]
    pub const fn page(condition: Condition) -> Self {
        Self {
            target: WaitTarget::Page,
            condition,
            timeout_ms: None,
        }
    }

    /// Override the timeout for this wait
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

impl fmt::Display for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to be {}", self.target, self.condition)
    }
}

/// Result of a satisfied wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Handle that satisfied an element wait
    pub handle: Option<ElementHandle>,
}

/// Whether [`WaitEngine::wait_until_gone`] requires the element to show up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// Never appearing counts as gone
    #[default]
    Optional,
    /// Never appearing is a timeout
    Required,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Executes waits against the driver
#[derive(Clone)]
pub struct WaitEngine {
    driver: Arc<dyn BrowserDriver>,
    chain: FallbackChain,
    config: Arc<RuntimeConfig>,
}

impl fmt::Debug for WaitEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitEngine")
            .field("timeout_ms", &self.config.timeout_ms())
            .finish_non_exhaustive()
    }
}

type Race = Result<ElementHandle, Option<PagewrightError>>;

impl WaitEngine {
    /// Create an engine
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: Arc<RuntimeConfig>) -> Self {
        let chain = FallbackChain::new(Arc::clone(&driver));
        Self {
            driver,
            chain,
            config,
        }
    }

    /// Runtime configuration in use
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Effective timeout for `wait`
    #[must_use]
    pub fn timeout_for(&self, wait: &Wait) -> Duration {
        Duration::from_millis(wait.timeout_ms.unwrap_or_else(|| self.config.timeout_ms()))
    }

    /// Wait until the condition holds.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeoutExpired` carrying the observed state when the
    /// timeout elapses, `DriverOperationFailed` when the driver errors, and
    /// `InvalidArgument` for an element condition on the page target
    pub async fn wait(&self, wait: &Wait) -> PagewrightResult<WaitResult> {
        let timeout = self.timeout_for(wait);
        let start = Instant::now();
        let outcome = self.run(wait, timeout).await?;
        let elapsed = start.elapsed();
        match outcome {
            Some(handle) => {
                tracing::debug!(wait = %wait, elapsed_ms = millis(elapsed), "wait satisfied");
                Ok(WaitResult {
                    elapsed,
                    waited_for: wait.to_string(),
                    handle,
                })
            }
            None => {
                let observed = self.observe(wait).await;
                tracing::debug!(
                    wait = %wait,
                    timeout_ms = millis(timeout),
                    observed = observed.as_str(),
                    "wait timed out"
                );
                Err(PagewrightError::WaitTimeoutExpired {
                    condition: wait.condition.to_string(),
                    target: wait.target.to_string(),
                    timeout_ms: millis(timeout),
                    elapsed_ms: millis(elapsed),
                    observed,
                })
            }
        }
    }

    /// Like [`wait`](Self::wait) but a timeout yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Propagates every failure other than a timeout
    pub async fn wait_soft(&self, wait: &Wait) -> PagewrightResult<bool> {
        match self.wait(wait).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve with the index of the first satisfied wait; the rest are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty slice, and the last member's
    /// error when none is satisfied
    pub async fn any(&self, waits: &[Wait]) -> PagewrightResult<usize> {
        if waits.is_empty() {
            return Err(PagewrightError::invalid_argument(
                "any() needs at least one wait",
            ));
        }
        let racers = waits
            .iter()
            .enumerate()
            .map(|(i, w)| Box::pin(async move { self.wait(w).await.map(|_| i) }));
        let (winner, _rest) = select_ok(racers).await?;
        Ok(winner)
    }

    /// Wait for every member concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first member error; the remaining members are dropped
    pub async fn all(&self, waits: &[Wait]) -> PagewrightResult<Vec<WaitResult>> {
        try_join_all(waits.iter().map(|w| self.wait(w))).await
    }

    /// Wait for `locator` to appear, then to disappear, each phase with its
    /// own timeout budget. Returns whether the element appeared.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeoutExpired` when the element stays visible, or when
    /// it never appears and `presence` is [`Presence::Required`]
    pub async fn wait_until_gone(
        &self,
        locator: &Locator,
        timeout_ms: Option<u64>,
        presence: Presence,
    ) -> PagewrightResult<bool> {
        let with_budget = |condition| {
            let w = Wait::locator(locator, condition);
            match timeout_ms {
                Some(ms) => w.with_timeout(ms),
                None => w,
            }
        };

        match self.wait(&with_budget(Condition::Visible)).await {
            Ok(_) => {}
            Err(e) if e.is_timeout() && presence == Presence::Optional => {
                tracing::debug!(element = locator.name(), "never appeared, treating as gone");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
        let _ = self.wait(&with_budget(Condition::Hidden)).await?;
        Ok(true)
    }

    /// `Ok(Some(handle))` when satisfied (the handle is `None` for page
    /// waits), `Ok(None)` on timeout
    async fn run(
        &self,
        wait: &Wait,
        timeout: Duration,
    ) -> PagewrightResult<Option<Option<ElementHandle>>> {
        if wait.condition.is_page_level() {
            return Ok(self.wait_url(&wait.condition, timeout).await?.then_some(None));
        }
        match &wait.target {
            WaitTarget::Page => Err(PagewrightError::invalid_argument(format!(
                "condition '{}' needs an element target",
                wait.condition
            ))),
            WaitTarget::Handle(handle) => Ok(self
                .wait_handle(handle, &wait.condition, timeout)
                .await?
                .then(|| Some(handle.clone()))),
            WaitTarget::Locator(locator) => Ok(self
                .wait_locator(locator, &wait.condition, timeout)
                .await?
                .map(Some)),
        }
    }

    async fn wait_locator(
        &self,
        locator: &Locator,
        condition: &Condition,
        timeout: Duration,
    ) -> PagewrightResult<Option<ElementHandle>> {
        let start = Instant::now();
        match self.chain.resolve(locator).await {
            Ok(resolution) => {
                let remaining = timeout.saturating_sub(start.elapsed());
                let handle = resolution.handle;
                Ok(self
                    .wait_handle(&handle, condition, remaining)
                    .await?
                    .then_some(handle))
            }
            Err(PagewrightError::NoCandidateResolved { .. }) => {
                let mut handles = self.chain.handles(locator, None);
                if condition.is_absence() {
                    return Ok(Some(handles.swap_remove(0)));
                }
                let remaining = timeout.saturating_sub(start.elapsed());
                let racers = handles.into_iter().map(|handle| {
                    Box::pin(async move {
                        match self.wait_handle(&handle, condition, remaining).await {
                            Ok(true) => Race::Ok(handle),
                            Ok(false) => Race::Err(None),
                            Err(e) => Race::Err(Some(e)),
                        }
                    })
                });
                match select_ok(racers).await {
                    Ok((handle, _rest)) => Ok(Some(handle)),
                    Err(None) => Ok(None),
                    Err(Some(e)) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn wait_handle(
        &self,
        handle: &ElementHandle,
        condition: &Condition,
        timeout: Duration,
    ) -> PagewrightResult<bool> {
        let (operation, result) = match condition {
            Condition::HasText(expected) => {
                let expected = expected.trim();
                let predicate = |text: &str| text.trim() == expected;
                (
                    "wait_for_text",
                    self.driver.wait_for_text(handle, &predicate, timeout).await,
                )
            }
            Condition::ContainsText(needle) => {
                let predicate = |text: &str| text.contains(needle.as_str());
                (
                    "wait_for_text",
                    self.driver.wait_for_text(handle, &predicate, timeout).await,
                )
            }
            Condition::CountEquals(n) => (
                "wait_for_count",
                self.driver.wait_for_count(handle, *n, timeout).await,
            ),
            other => match other.element_state() {
                Some(state) => (
                    "wait_for_state",
                    self.driver.wait_for_state(handle, state, timeout).await,
                ),
                None => return self.wait_url(other, timeout).await,
            },
        };
        result.map_err(|e| PagewrightError::driver(operation, handle, e))
    }

    async fn wait_url(&self, condition: &Condition, timeout: Duration) -> PagewrightResult<bool> {
        let result = match condition {
            Condition::UrlChangedFrom(from) => {
                let predicate = |url: &str| url != from;
                self.driver.wait_for_url(&predicate, timeout).await
            }
            Condition::UrlMatches(pattern) => {
                let predicate = |url: &str| pattern.matches(url);
                self.driver.wait_for_url(&predicate, timeout).await
            }
            other => {
                return Err(PagewrightError::invalid_argument(format!(
                    "'{other}' is not a page condition"
                )))
            }
        };
        result.map_err(|e| PagewrightError::driver("wait_for_url", "page", e))
    }

    /// Describe what the target looks like right now
    async fn observe(&self, wait: &Wait) -> String {
        if wait.condition.is_page_level() {
            return match self.driver.current_url().await {
                Ok(url) => format!("url {url:?}"),
                Err(e) => format!("url unavailable: {e}"),
            };
        }
        match &wait.target {
            WaitTarget::Page => "page".to_string(),
            WaitTarget::Handle(handle) => self.observe_handle(handle).await,
            WaitTarget::Locator(locator) => match self.chain.resolve(locator).await {
                Ok(resolution) => self.observe_handle(&resolution.handle).await,
                Err(_) => format!("no candidate matched ({} tried)", locator.len()),
            },
        }
    }

    async fn observe_handle(&self, handle: &ElementHandle) -> String {
        let count = match self.driver.count(handle).await {
            Ok(0) => return "no matching element".to_string(),
            Ok(n) => n,
            Err(e) => return format!("unobservable: {e}"),
        };
        let visible = self.driver.is_visible(handle).await.unwrap_or(false);
        let text = self
            .driver
            .text_content(handle)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        format!("{count} match(es), visible={visible}, text={:?}", text.trim())
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, Environment};
    use crate::locator::Selector;
    use crate::mock::{MockDriver, MockElement};

    fn engine(timeout_ms: u64) -> (Arc<MockDriver>, WaitEngine) {
        let driver = Arc::new(MockDriver::new());
        let config = RuntimeConfig::with_overrides(
            Environment::Qa,
            ConfigOverrides::new().timeout_ms(timeout_ms),
        )
        .unwrap();
        let engine = WaitEngine::new(driver.clone(), Arc::new(config));
        (driver, engine)
    }

    fn spinner() -> Locator {
        Locator::new("spinner", Selector::test_id("spinner"))
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_patterns() {
            let url = "https://qa.example.com/cases/42/edit";
            assert!(UrlPattern::Exact(url.into()).matches(url));
            assert!(UrlPattern::Prefix("https://qa".into()).matches(url));
            assert!(UrlPattern::Contains("/cases/".into()).matches(url));
            assert!(UrlPattern::regex(r"/cases/\d+/edit$").unwrap().matches(url));
            assert!(UrlPattern::Glob("*/cases/*/edit".into()).matches(url));
            assert!(!UrlPattern::Glob("*/clients/*".into()).matches(url));
            assert!(UrlPattern::Any.matches(""));
        }

        #[test]
        fn test_invalid_regex_rejected_up_front() {
            let err = UrlPattern::regex("(").unwrap_err();
            assert!(matches!(err, PagewrightError::InvalidArgument { .. }));
            assert!(err.to_string().contains("invalid url regex"));
        }

        #[test]
        fn test_regex_round_trips_through_json() {
            let pattern = UrlPattern::regex(r"/cases/\d+$").unwrap();
            let json = serde_json::to_string(&pattern).unwrap();
            let back: UrlPattern = serde_json::from_str(&json).unwrap();
            assert_eq!(back, pattern);
            assert!(serde_json::from_str::<UrlPattern>(r#"{"Regex":"("}"#).is_err());
        }

        #[test]
        fn test_glob_anchors_last_segment_at_end() {
            let url = "https://app.test/edit/cases/7/edit";
            assert!(UrlPattern::Glob("*/edit".into()).matches(url));
            assert!(UrlPattern::Glob("https://*/edit".into()).matches(url));
            assert!(UrlPattern::Glob("*/cases/*/edit".into()).matches(url));
            assert!(!UrlPattern::Glob("*/edit".into()).matches("https://app.test/edit/cases"));
            assert!(UrlPattern::Glob("*/edit*".into()).matches("https://app.test/edit/cases"));
        }

        #[test]
        fn test_glob_segments_do_not_overlap() {
            assert!(!UrlPattern::Glob("ab*ba".into()).matches("aba"));
            assert!(UrlPattern::Glob("ab*ba".into()).matches("abba"));
            assert!(UrlPattern::Glob("exact".into()).matches("exact"));
            assert!(!UrlPattern::Glob("exact".into()).matches("exactly"));
            assert!(UrlPattern::Glob("**".into()).matches(""));
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_absence_conditions() {
            assert!(Condition::Hidden.is_absence());
            assert!(Condition::Detached.is_absence());
            assert!(Condition::CountEquals(0).is_absence());
            assert!(!Condition::CountEquals(1).is_absence());
            assert!(!Condition::Visible.is_absence());
        }

        #[test]
        fn test_display() {
            assert_eq!(Condition::Visible.to_string(), "visible");
            assert_eq!(Condition::HasText("Done".into()).to_string(), "text \"Done\"");
            assert_eq!(Condition::CountEquals(3).to_string(), "count 3");
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_satisfied_before_timeout() {
            let (driver, engine) = engine(5_000);
            driver.insert(MockElement::new("s", "div").test_id("spinner").hidden());
            driver.after(Duration::from_millis(400), |dom| dom.show("s"));

            let r = engine
                .wait(&Wait::locator(&spinner(), Condition::Visible))
                .await
                .unwrap();
            assert!(r.elapsed >= Duration::from_millis(400));
            assert!(r.elapsed < Duration::from_millis(5_000));
            assert!(r.handle.is_some());
        }

        #[tokio::test(start_paused = true)]
        async fn test_timeout_reports_observed_state() {
            let (driver, engine) = engine(5_000);
            driver.insert(MockElement::new("s", "div").test_id("spinner").text("Loading"));

            let err = engine
                .wait(&Wait::locator(&spinner(), Condition::Hidden).with_timeout(1_000))
                .await
                .unwrap_err();
            let PagewrightError::WaitTimeoutExpired {
                timeout_ms,
                elapsed_ms,
                observed,
                ..
            } = &err
            else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(*timeout_ms, 1_000);
            assert!(*elapsed_ms >= 1_000);
            assert!(observed.contains("visible=true"));
            assert!(observed.contains("Loading"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_default_timeout_comes_from_config() {
            let (_, engine) = engine(2_000);
            let err = engine
                .wait(&Wait::locator(&spinner(), Condition::Visible))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                PagewrightError::WaitTimeoutExpired { timeout_ms: 2_000, .. }
            ));
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_timeout_fails_immediately() {
            let (_, engine) = engine(5_000);
            let start = Instant::now();
            let err = engine
                .wait(&Wait::locator(&spinner(), Condition::Visible).with_timeout(0))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_absent_element_is_hidden_immediately() {
            let (_, engine) = engine(5_000);
            let start = Instant::now();
            engine
                .wait(&Wait::locator(&spinner(), Condition::Hidden))
                .await
                .unwrap();
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_late_fallback_candidate_satisfies() {
            let (driver, engine) = engine(5_000);
            driver.after(Duration::from_millis(300), |dom| {
                dom.insert(MockElement::new("t", "div").text("Saved"));
            });
            let toast = Locator::new("toast", Selector::test_id("toast")).or(Selector::text("Saved"));
            let r = engine
                .wait(&Wait::locator(&toast, Condition::Visible))
                .await
                .unwrap();
            assert_eq!(r.handle.unwrap().description(), "text(\"Saved\")");
        }

        #[tokio::test(start_paused = true)]
        async fn test_text_and_count_conditions() {
            let (driver, engine) = engine(5_000);
            driver.insert(MockElement::new("h", "h1").test_id("title").text("  Cases "));
            driver.insert(MockElement::new("r1", "tr").query("tr"));
            driver.after(Duration::from_millis(100), |dom| {
                dom.insert(MockElement::new("r2", "tr").query("tr"));
            });
            let title = Locator::from(Selector::test_id("title"));
            engine
                .wait(&Wait::locator(&title, Condition::HasText("Cases".into())))
                .await
                .unwrap();
            engine
                .wait(&Wait::locator(&title, Condition::ContainsText("Case".into())))
                .await
                .unwrap();
            engine
                .wait(&Wait::locator(&Locator::from(Selector::css("tr")), Condition::CountEquals(2)))
                .await
                .unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_url_conditions() {
            let (driver, engine) = engine(5_000);
            driver.set_url("https://qa.example.com/cases");
            driver.after(Duration::from_millis(250), |dom| {
                dom.set_url("https://qa.example.com/cases/7");
            });
            engine
                .wait(&Wait::page(Condition::UrlChangedFrom(
                    "https://qa.example.com/cases".into(),
                )))
                .await
                .unwrap();
            engine
                .wait(&Wait::page(Condition::UrlMatches(UrlPattern::Glob("*/cases/*".into()))))
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_element_condition_on_page_rejected() {
            let (_, engine) = engine(5_000);
            let err = engine.wait(&Wait::page(Condition::Visible)).await.unwrap_err();
            assert!(matches!(err, PagewrightError::InvalidArgument { .. }));
        }
    }

    mod combinator_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_any_returns_first_satisfied() {
            let (driver, engine) = engine(5_000);
            driver.after(Duration::from_millis(200), |dom| {
                dom.insert(MockElement::new("err", "div").test_id("error"));
            });
            let waits = [
                Wait::locator(&Locator::from(Selector::test_id("success")), Condition::Visible),
                Wait::locator(&Locator::from(Selector::test_id("error")), Condition::Visible),
            ];
            assert_eq!(engine.any(&waits).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_any_empty_is_error() {
            let (_, engine) = engine(5_000);
            assert!(matches!(
                engine.any(&[]).await,
                Err(PagewrightError::InvalidArgument { .. })
            ));
        }

        #[tokio::test(start_paused = true)]
        async fn test_all_takes_slowest_not_sum() {
            let (driver, engine) = engine(5_000);
            for (id, ms) in [("a", 300), ("b", 500), ("c", 400)] {
                driver.insert(MockElement::new(id, "div").test_id(id).hidden());
                driver.after(Duration::from_millis(ms), move |dom| dom.show(id));
            }
            let waits: Vec<Wait> = ["a", "b", "c"]
                .iter()
                .map(|id| Wait::locator(&Locator::from(Selector::test_id(*id)), Condition::Visible))
                .collect();

            let start = Instant::now();
            let results = engine.all(&waits).await.unwrap();
            assert_eq!(results.len(), 3);
            assert!(start.elapsed() >= Duration::from_millis(500));
            assert!(start.elapsed() < Duration::from_millis(1_000));
        }

        #[tokio::test(start_paused = true)]
        async fn test_all_fails_with_the_member_that_timed_out() {
            let (driver, engine) = engine(5_000);
            driver.insert(MockElement::new("a", "div").test_id("a"));
            let waits = [
                Wait::locator(&Locator::from(Selector::test_id("a")), Condition::Visible),
                Wait::locator(&Locator::from(Selector::test_id("late")), Condition::Visible)
                    .with_timeout(700),
            ];

            let start = Instant::now();
            let err = engine.all(&waits).await.unwrap_err();
            let PagewrightError::WaitTimeoutExpired {
                target,
                timeout_ms,
                elapsed_ms,
                ..
            } = &err
            else {
                panic!("unexpected error: {err}");
            };
            assert!(target.contains("late"));
            assert_eq!(*timeout_ms, 700);
            assert!(*elapsed_ms >= 700);
            assert!(start.elapsed() < Duration::from_millis(5_000));
        }

        #[tokio::test(start_paused = true)]
        async fn test_any_fails_when_every_member_times_out() {
            let (_, engine) = engine(5_000);
            let waits = [
                Wait::locator(&Locator::from(Selector::test_id("ok")), Condition::Visible)
                    .with_timeout(300),
                Wait::locator(&Locator::from(Selector::test_id("err")), Condition::Visible)
                    .with_timeout(600),
            ];

            let start = Instant::now();
            let err = engine.any(&waits).await.unwrap_err();
            assert!(err.is_timeout());
            assert!(start.elapsed() >= Duration::from_millis(600));
            assert!(start.elapsed() < Duration::from_millis(5_000));
        }

        #[tokio::test(start_paused = true)]
        async fn test_condition_true_only_after_timeout_fails() {
            let (driver, engine) = engine(5_000);
            driver.insert(MockElement::new("s", "div").test_id("spinner").hidden());
            driver.after(Duration::from_millis(1_500), |dom| dom.show("s"));

            let start = Instant::now();
            let err = engine
                .wait(&Wait::locator(&spinner(), Condition::Visible).with_timeout(1_000))
                .await
                .unwrap_err();
            let PagewrightError::WaitTimeoutExpired { elapsed_ms, observed, .. } = &err else {
                panic!("unexpected error: {err}");
            };
            assert!(*elapsed_ms >= 1_000);
            assert!(start.elapsed() < Duration::from_millis(1_500));
            assert!(observed.contains("visible=false"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_candidate_race_gets_only_the_remaining_budget() {
            let (driver, engine) = engine(5_000);
            driver.set_probe_latency(Duration::from_millis(300));
            let toast = Locator::new("toast", Selector::test_id("toast")).or(Selector::text("Saved"));

            let err = engine
                .wait(&Wait::locator(&toast, Condition::Visible).with_timeout(1_000))
                .await
                .unwrap_err();
            let PagewrightError::WaitTimeoutExpired { elapsed_ms, .. } = &err else {
                panic!("unexpected error: {err}");
            };
            assert!(*elapsed_ms >= 1_000);
            assert!(*elapsed_ms < 1_100, "elapsed {elapsed_ms}ms");
        }

        #[tokio::test(start_paused = true)]
        async fn test_soft_wait_turns_timeout_into_false() {
            let (_, engine) = engine(5_000);
            let ok = engine
                .wait_soft(&Wait::locator(&spinner(), Condition::Visible).with_timeout(100))
                .await
                .unwrap();
            assert!(!ok);
        }

        #[tokio::test(start_paused = true)]
        async fn test_gone_optional_never_appearing() {
            let (_, engine) = engine(5_000);
            let appeared = engine
                .wait_until_gone(&spinner(), Some(500), Presence::Optional)
                .await
                .unwrap();
            assert!(!appeared);
        }

        #[tokio::test(start_paused = true)]
        async fn test_gone_required_never_appearing() {
            let (_, engine) = engine(5_000);
            let err = engine
                .wait_until_gone(&spinner(), Some(500), Presence::Required)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_gone_after_appearing() {
            let (driver, engine) = engine(5_000);
            driver.after(Duration::from_millis(100), |dom| {
                dom.insert(MockElement::new("s", "div").test_id("spinner"));
            });
            driver.after(Duration::from_millis(900), |dom| dom.hide("s"));
            let start = Instant::now();
            let appeared = engine
                .wait_until_gone(&spinner(), Some(1_000), Presence::Required)
                .await
                .unwrap();
            assert!(appeared);
            assert!(start.elapsed() >= Duration::from_millis(900));
        }
    }
}
