//! Element interactions.
//!
//! Every interaction follows the same protocol:
//!
//! 1. **Locate**: a [`Target::Locator`] goes through the fallback chain; a
//!    [`Target::Handle`] is used as is
//! 2. **Wait, then act**: wait until the element is visible (attached for
//!    uploads) and, unless forced, enabled; then call the driver
//! 3. **Settle**: sleep `slow_mo_ms` if configured. Purely cosmetic, never a
//!    substitute for a wait
//!
//! Nothing here retries. A failed step surfaces as
//! `ElementNotActionable`, `NoCandidateResolved` or `DriverOperationFailed`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::chain::FallbackChain;
use crate::config::RuntimeConfig;
use crate::driver::{BrowserDriver, ClickOptions, ElementHandle, SelectOption};
use crate::locator::{Locator, Selector};
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{Condition, Wait, WaitEngine};

/// Element an action is aimed at
#[derive(Debug, Clone)]
pub enum Target {
    /// Resolve through the fallback chain first
    Locator(Locator),
    /// Already resolved; the locate phase is skipped
    Handle(ElementHandle),
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Self::Locator(locator.clone())
    }
}

impl From<ElementHandle> for Target {
    fn from(handle: ElementHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&ElementHandle> for Target {
    fn from(handle: &ElementHandle) -> Self {
        Self::Handle(handle.clone())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator(l) => write!(f, "{l}"),
            Self::Handle(h) => write!(f, "{h}"),
        }
    }
}

/// How an action ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The driver performed the interaction
    Performed,
    /// The element was already in the requested state; no driver call made
    AlreadySatisfied,
    /// Value read after the interaction
    ReadBack(String),
}

/// Options for [`Actions::fill`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillOptions {
    /// Issue an explicit clear before filling
    pub clear: bool,
    /// Type keystroke by keystroke with this delay instead of filling
    pub keystroke_delay_ms: Option<u64>,
    /// Skip the enabled check
    pub force: bool,
    /// Per-call timeout for the actionability waits
    pub timeout_ms: Option<u64>,
}

impl FillOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear before filling
    #[must_use]
    pub const fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// Type with a per-keystroke delay
    #[must_use]
    pub const fn typed(mut self, delay_ms: u64) -> Self {
        self.keystroke_delay_ms = Some(delay_ms);
        self
    }

    /// Skip the enabled check
    #[must_use]
    pub const fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Set the actionability timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Readiness an interaction requires before the driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Attached,
    Visible,
    Interactive,
}

/// Interaction executor
#[derive(Clone)]
pub struct Actions {
    driver: Arc<dyn BrowserDriver>,
    chain: FallbackChain,
    waits: WaitEngine,
    config: Arc<RuntimeConfig>,
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("slow_mo_ms", &self.config.slow_mo_ms())
            .finish_non_exhaustive()
    }
}

impl Actions {
    /// Create an executor
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: Arc<RuntimeConfig>) -> Self {
        Self {
            chain: FallbackChain::new(Arc::clone(&driver)),
            waits: WaitEngine::new(Arc::clone(&driver), Arc::clone(&config)),
            driver,
            config,
        }
    }

    /// Click with default options.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn click(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        self.click_with(target, &ClickOptions::default()).await
    }

    /// Double click.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn double_click(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        self.click_with(target, &ClickOptions::new().click_count(2))
            .await
    }

    /// Click with explicit button, count, delay and force options.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn click_with(
        &self,
        target: impl Into<Target>,
        options: &ClickOptions,
    ) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self
            .prepare(&target, Readiness::Interactive, options.force, None)
            .await?;
        self.driver
            .click(&handle, options)
            .await
            .map_err(|e| PagewrightError::driver("click", &target, e))?;
        self.settle("click", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Put `value` into a text input.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn fill(
        &self,
        target: impl Into<Target>,
        value: &str,
        options: &FillOptions,
    ) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self
            .prepare(&target, Readiness::Interactive, options.force, options.timeout_ms)
            .await?;
        if options.clear {
            self.driver
                .clear(&handle)
                .await
                .map_err(|e| PagewrightError::driver("clear", &target, e))?;
        }
        match options.keystroke_delay_ms {
            Some(delay_ms) => self
                .driver
                .type_text(&handle, value, Duration::from_millis(delay_ms))
                .await
                .map_err(|e| PagewrightError::driver("type_text", &target, e))?,
            None => self
                .driver
                .fill(&handle, value)
                .await
                .map_err(|e| PagewrightError::driver("fill", &target, e))?,
        }
        self.settle("fill", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Fill the input associated with the label `label`.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn fill_by_label(
        &self,
        label: &str,
        value: &str,
        options: &FillOptions,
    ) -> PagewrightResult<ActionOutcome> {
        let field = Locator::new(format!("field labelled {label:?}"), Selector::label(label));
        self.fill(field, value, options).await
    }

    /// Choose an option of a native select; reads back the selected value.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn select_option(
        &self,
        target: impl Into<Target>,
        option: &SelectOption,
    ) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self
            .prepare(&target, Readiness::Interactive, false, None)
            .await?;
        let selected = self
            .driver
            .select_option(&handle, option)
            .await
            .map_err(|e| PagewrightError::driver("select_option", &target, e))?;
        self.settle("select_option", &target).await;
        Ok(ActionOutcome::ReadBack(selected.join(",")))
    }

    /// Pick an option from a dropdown that is not a native select.
    ///
    /// Clicks `trigger`, waits for the option with visible text
    /// `option_text` (inside `panel` when given), then clicks it. The option
    /// is located only after the panel opens.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn select_custom(
        &self,
        trigger: impl Into<Target>,
        option_text: &str,
        panel: Option<&Locator>,
    ) -> PagewrightResult<ActionOutcome> {
        let _ = self.click(trigger).await?;

        let option = option_locator(option_text, panel);
        let shown = self
            .waits
            .wait(&Wait::locator(&option, Condition::Visible))
            .await
            .map_err(|e| not_actionable(&Target::Locator(option.clone()), e))?;
        tracing::debug!(option = option_text, elapsed_ms = ?shown.elapsed, "dropdown option visible");

        self.click(option).await
    }

    /// Check a checkbox or radio; no driver call if already checked.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn check(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        self.set_checked(target.into(), Some(true)).await
    }

    /// Uncheck a checkbox; no driver call if already unchecked.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn uncheck(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        self.set_checked(target.into(), Some(false)).await
    }

    /// Flip a checkbox regardless of its current state.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn toggle(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        self.set_checked(target.into(), None).await
    }

    /// Move the pointer over an element.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn hover(&self, target: impl Into<Target>) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self.prepare(&target, Readiness::Visible, false, None).await?;
        self.driver
            .hover(&handle)
            .await
            .map_err(|e| PagewrightError::driver("hover", &target, e))?;
        self.settle("hover", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Attach files to a file input. File inputs are usually hidden, so
    /// this only waits for the input to be attached.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn upload(
        &self,
        target: impl Into<Target>,
        files: &[PathBuf],
    ) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self.prepare(&target, Readiness::Attached, false, None).await?;
        self.driver
            .set_input_files(&handle, files)
            .await
            .map_err(|e| PagewrightError::driver("set_input_files", &target, e))?;
        self.settle("upload", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Drag `source` onto `destination`.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn drag_and_drop(
        &self,
        source: impl Into<Target>,
        destination: impl Into<Target>,
    ) -> PagewrightResult<ActionOutcome> {
        let source = source.into();
        let destination = destination.into();
        let from = self
            .prepare(&source, Readiness::Interactive, false, None)
            .await?;
        let to = self
            .prepare(&destination, Readiness::Visible, false, None)
            .await?;
        self.driver
            .drag_to(&from, &to)
            .await
            .map_err(|e| PagewrightError::driver("drag_to", &source, e))?;
        self.settle("drag_and_drop", &source).await;
        Ok(ActionOutcome::Performed)
    }

    /// Press a key (e.g. "Enter", "Control+A") on an element.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn press(
        &self,
        target: impl Into<Target>,
        key: &str,
    ) -> PagewrightResult<ActionOutcome> {
        let target = target.into();
        let handle = self
            .prepare(&target, Readiness::Interactive, false, None)
            .await?;
        self.driver
            .press(&handle, key)
            .await
            .map_err(|e| PagewrightError::driver("press", &target, e))?;
        self.settle("press", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Trimmed text content.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn text_of(&self, target: impl Into<Target>) -> PagewrightResult<String> {
        let target = target.into();
        let handle = self.prepare(&target, Readiness::Attached, false, None).await?;
        let text = self
            .driver
            .text_content(&handle)
            .await
            .map_err(|e| PagewrightError::driver("text_content", &target, e))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    /// Current input value.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn value_of(&self, target: impl Into<Target>) -> PagewrightResult<String> {
        let target = target.into();
        let handle = self.prepare(&target, Readiness::Attached, false, None).await?;
        self.driver
            .input_value(&handle)
            .await
            .map_err(|e| PagewrightError::driver("input_value", &target, e))
    }

    /// Attribute value.
    ///
    /// # Errors
    ///
    /// See the module docs
    pub async fn attribute_of(
        &self,
        target: impl Into<Target>,
        name: &str,
    ) -> PagewrightResult<Option<String>> {
        let target = target.into();
        let handle = self.prepare(&target, Readiness::Attached, false, None).await?;
        self.driver
            .attribute(&handle, name)
            .await
            .map_err(|e| PagewrightError::driver("attribute", &target, e))
    }

    /// `desired` of `None` toggles
    async fn set_checked(
        &self,
        target: Target,
        desired: Option<bool>,
    ) -> PagewrightResult<ActionOutcome> {
        let handle = self
            .prepare(&target, Readiness::Interactive, false, None)
            .await?;
        let current = self
            .driver
            .is_checked(&handle)
            .await
            .map_err(|e| PagewrightError::driver("is_checked", &target, e))?;
        let next = match desired {
            Some(want) if want == current => {
                tracing::debug!(element = %target, checked = current, "already in requested state");
                return Ok(ActionOutcome::AlreadySatisfied);
            }
            Some(want) => want,
            None => !current,
        };
        self.driver
            .set_checked(&handle, next)
            .await
            .map_err(|e| PagewrightError::driver("set_checked", &target, e))?;
        self.settle("set_checked", &target).await;
        Ok(ActionOutcome::Performed)
    }

    /// Locate and wait until the element is ready for the interaction
    async fn prepare(
        &self,
        target: &Target,
        readiness: Readiness,
        force: bool,
        timeout_ms: Option<u64>,
    ) -> PagewrightResult<ElementHandle> {
        let handle = match target {
            Target::Locator(locator) => self.chain.resolve(locator).await?.handle,
            Target::Handle(handle) => handle.clone(),
        };

        let budget = timeout_ms.unwrap_or_else(|| self.config.timeout_ms());
        let start = Instant::now();
        let mut gates = vec![match readiness {
            Readiness::Attached => Condition::Attached,
            Readiness::Visible | Readiness::Interactive => Condition::Visible,
        }];
        if readiness == Readiness::Interactive && !force {
            gates.push(Condition::Enabled);
        }

        for condition in gates {
            let spent = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let wait = Wait::handle(&handle, condition).with_timeout(budget.saturating_sub(spent));
            let _ = self
                .waits
                .wait(&wait)
                .await
                .map_err(|e| not_actionable(target, e))?;
        }
        Ok(handle)
    }

    async fn settle(&self, action: &str, target: &Target) {
        tracing::debug!(action, element = %target, "action performed");
        if self.config.slow_mo_ms() > 0 {
            tokio::time::sleep(self.config.slow_mo()).await;
        }
    }
}

/// Options are matched by role first, then by plain text
fn option_locator(option_text: &str, panel: Option<&Locator>) -> Locator {
    let option = Locator::new(
        format!("option {option_text:?}"),
        Selector::role_named("option", option_text),
    )
    .or(Selector::text(option_text));
    let Some(panel) = panel else {
        return option;
    };
    let mut scoped = Vec::with_capacity(option.len() * panel.len());
    for scope in panel.candidates() {
        for inner in option.candidates() {
            scoped.push(inner.clone().within(scope.clone()));
        }
    }
    Locator::from_candidates(option.name(), scoped).unwrap_or(option)
}

fn not_actionable(target: &Target, error: PagewrightError) -> PagewrightError {
    match error {
        PagewrightError::WaitTimeoutExpired {
            condition,
            elapsed_ms,
            observed,
            ..
        } => PagewrightError::ElementNotActionable {
            target: target.to_string(),
            condition,
            elapsed_ms,
            observed,
        },
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, Environment};
    use crate::driver::DriverError;
    use crate::mock::{MockDriver, MockElement};

    fn actions_with(overrides: ConfigOverrides) -> (Arc<MockDriver>, Actions) {
        let driver = Arc::new(MockDriver::new());
        let config = RuntimeConfig::with_overrides(Environment::Qa, overrides).unwrap();
        let actions = Actions::new(driver.clone(), Arc::new(config));
        (driver, actions)
    }

    fn actions() -> (Arc<MockDriver>, Actions) {
        actions_with(ConfigOverrides::new().timeout_ms(2_000))
    }

    fn by_id(id: &str) -> Locator {
        Locator::from(Selector::test_id(id))
    }

    mod click_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_click_waits_for_visibility() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("save", "button").test_id("save").hidden());
            driver.insert(MockElement::new("toast", "div").test_id("toast").hidden());
            driver.on_click("save", |dom| dom.show("toast"));
            driver.after(Duration::from_millis(300), |dom| dom.show("save"));

            let outcome = actions.click(&by_id("save")).await.unwrap();
            assert_eq!(outcome, ActionOutcome::Performed);
            assert!(driver.element("toast").unwrap().visible);
        }

        #[tokio::test(start_paused = true)]
        async fn test_disabled_is_not_actionable() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("save", "button").test_id("save").disabled());

            let err = actions.click(&by_id("save")).await.unwrap_err();
            let PagewrightError::ElementNotActionable {
                condition,
                elapsed_ms,
                ..
            } = &err
            else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(condition, "enabled");
            assert!(*elapsed_ms >= 2_000);
            assert!(!driver.was_called("click"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_force_skips_enabled_check() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("save", "button").test_id("save").disabled());
            actions
                .click_with(&by_id("save"), &ClickOptions::new().force(true))
                .await
                .unwrap();
            assert_eq!(driver.call_count("click"), 1);
        }

        #[tokio::test]
        async fn test_missing_element_propagates_chain_error() {
            let (_, actions) = actions();
            let err = actions.click(&by_id("ghost")).await.unwrap_err();
            assert!(matches!(err, PagewrightError::NoCandidateResolved { .. }));
        }

        #[tokio::test]
        async fn test_driver_failure_is_wrapped() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("save", "button").test_id("save"));
            driver.fail_on("click", DriverError::Detached);
            let err = actions.click(&by_id("save")).await.unwrap_err();
            let PagewrightError::DriverOperationFailed { operation, message, .. } = &err else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(operation, "click");
            assert!(message.contains("detached"));
        }

        #[tokio::test]
        async fn test_handle_target_skips_locate() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("save", "button").test_id("save"));
            let handle = driver.locate(&Selector::test_id("save"), None);
            actions.click(&handle).await.unwrap();
            assert!(!driver.was_called("count"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_slow_mo_settles_after_action() {
            let (driver, actions) = actions_with(ConfigOverrides::new().slow_mo_ms(250));
            driver.insert(MockElement::new("save", "button").test_id("save"));
            let start = Instant::now();
            actions.click(&by_id("save")).await.unwrap();
            assert_eq!(start.elapsed(), Duration::from_millis(250));
        }
    }

    mod fill_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_by_label_with_clear() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("email", "input").label("Email").value("old@x.com"));

            actions
                .fill_by_label("Email", "a@b.com", &FillOptions::new().clear())
                .await
                .unwrap();
            assert_eq!(driver.element("email").unwrap().value, "a@b.com");
            assert!(driver.was_called("clear"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_typed_fill_with_clear_replaces() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("q", "input").test_id("q").value("stale"));

            let start = Instant::now();
            actions
                .fill(&by_id("q"), "abc", &FillOptions::new().clear().typed(50))
                .await
                .unwrap();
            assert_eq!(driver.element("q").unwrap().value, "abc");
            assert!(driver.was_called("clear"));
            assert!(driver.was_called("type_text"));
            assert!(!driver.was_called("fill"));
            assert!(start.elapsed() >= Duration::from_millis(150));
        }

        #[tokio::test(start_paused = true)]
        async fn test_typed_fill_without_clear_appends() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("q", "input").test_id("q").value("follow"));

            actions
                .fill(&by_id("q"), " up", &FillOptions::new().typed(20))
                .await
                .unwrap();
            assert_eq!(driver.element("q").unwrap().value, "follow up");
            assert!(!driver.was_called("clear"));
        }

        #[tokio::test]
        async fn test_value_and_text_readback() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("q", "input").test_id("q").value("v1"));
            driver.insert(MockElement::new("h", "h1").test_id("h").text("  Cases \n"));
            assert_eq!(actions.value_of(&by_id("q")).await.unwrap(), "v1");
            assert_eq!(actions.text_of(&by_id("h")).await.unwrap(), "Cases");
        }
    }

    mod checkbox_tests {
        use super::*;

        #[tokio::test]
        async fn test_check_is_idempotent() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("cb", "input").test_id("cb").checked());

            let outcome = actions.check(&by_id("cb")).await.unwrap();
            assert_eq!(outcome, ActionOutcome::AlreadySatisfied);
            assert_eq!(driver.call_count("set_checked"), 0);
            assert!(driver.element("cb").unwrap().checked);
        }

        #[tokio::test]
        async fn test_check_unchecked_issues_one_call() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("cb", "input").test_id("cb"));

            assert_eq!(
                actions.check(&by_id("cb")).await.unwrap(),
                ActionOutcome::Performed
            );
            assert_eq!(driver.call_count("set_checked"), 1);
            assert!(driver.element("cb").unwrap().checked);
        }

        #[tokio::test]
        async fn test_uncheck_already_unchecked() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("cb", "input").test_id("cb"));
            assert_eq!(
                actions.uncheck(&by_id("cb")).await.unwrap(),
                ActionOutcome::AlreadySatisfied
            );
            assert!(!driver.was_called("set_checked"));
        }

        #[tokio::test]
        async fn test_toggle_always_flips() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("cb", "input").test_id("cb").checked());

            actions.toggle(&by_id("cb")).await.unwrap();
            assert!(!driver.element("cb").unwrap().checked);
            actions.toggle(&by_id("cb")).await.unwrap();
            assert!(driver.element("cb").unwrap().checked);
            assert_eq!(driver.call_count("set_checked"), 2);
        }
    }

    mod select_tests {
        use super::*;

        #[tokio::test]
        async fn test_native_select_reads_back_value() {
            let (driver, actions) = actions();
            driver.insert(
                MockElement::new("status", "select")
                    .test_id("status")
                    .option("open", "Open")
                    .option("closed", "Closed"),
            );
            let outcome = actions
                .select_option(&by_id("status"), &SelectOption::Label("Closed".into()))
                .await
                .unwrap();
            assert_eq!(outcome, ActionOutcome::ReadBack("closed".into()));
        }

        #[tokio::test(start_paused = true)]
        async fn test_custom_dropdown_two_cycles() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("trigger", "div").test_id("status-dropdown"));
            driver.on_click("trigger", |dom| {
                dom.after(Duration::from_millis(150), |dom| {
                    dom.insert(MockElement::new("panel", "ul").test_id("status-options"));
                    dom.insert(
                        MockElement::new("closed", "li")
                            .role("option")
                            .text("Closed")
                            .inside("panel"),
                    );
                });
            });
            let picked = Arc::new(std::sync::atomic::AtomicBool::new(false));
            let flag = Arc::clone(&picked);
            driver.on_click("closed", move |_| {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
            });

            let panel = Locator::from(Selector::test_id("status-options"));
            actions
                .select_custom(&by_id("status-dropdown"), "Closed", Some(&panel))
                .await
                .unwrap();
            assert!(picked.load(std::sync::atomic::Ordering::SeqCst));
            assert_eq!(driver.call_count("click"), 2);
        }
    }

    mod other_action_tests {
        use super::*;

        #[tokio::test]
        async fn test_upload_accepts_hidden_input() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("file", "input").test_id("file").hidden());
            let files = vec![PathBuf::from("fixtures/report.pdf")];
            actions.upload(&by_id("file"), &files).await.unwrap();
            assert_eq!(driver.element("file").unwrap().files, files);
        }

        #[tokio::test]
        async fn test_drag_and_drop() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("card", "div").test_id("card"));
            driver.insert(MockElement::new("done", "div").test_id("done-column"));
            actions
                .drag_and_drop(&by_id("card"), &by_id("done-column"))
                .await
                .unwrap();
            assert_eq!(driver.element("card").unwrap().parent.as_deref(), Some("done"));
        }

        #[tokio::test]
        async fn test_hover_and_press() {
            let (driver, actions) = actions();
            driver.insert(MockElement::new("q", "input").test_id("q"));
            actions.hover(&by_id("q")).await.unwrap();
            actions.press(&by_id("q"), "Enter").await.unwrap();
            assert!(driver.was_called("hover"));
            assert!(driver.was_called("press:test-id(\"q\"):Enter"));
        }
    }
}
