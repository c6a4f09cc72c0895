//! In-memory [`BrowserDriver`] for unit and integration tests.
//!
//! [`MockDriver`] keeps a tiny DOM of [`MockElement`]s and answers every
//! driver call from it. Changes can be scheduled on the tokio clock, so tests
//! running with `start_paused = true` see late-rendering elements, spinners
//! and URL changes deterministically.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pagewright::mock::{MockDriver, MockElement};
//!
//! let driver = Arc::new(MockDriver::new());
//! driver.insert(MockElement::new("save", "button").test_id("save").hidden());
//! driver.after(Duration::from_millis(200), |dom| dom.show("save"));
//! assert!(!driver.element("save").map_or(true, |e| e.visible));
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::{
    BrowserDriver, ClickOptions, DriverError, DriverResult, ElementHandle, ElementState, Pick,
    SelectOption, StringPredicate,
};
use crate::locator::Selector;

/// Interval between checks inside the mock's wait primitives
pub const MOCK_POLL_INTERVAL_MS: u64 = 10;

/// Minimal PNG signature returned by [`MockDriver::screenshot`]
pub const MOCK_PNG: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10];

/// One element of the mock DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Unique id used by tests to address the element
    pub id: String,
    /// Tag name
    pub tag: String,
    /// ARIA role
    pub role: Option<String>,
    /// Accessible name (falls back to text for role matching)
    pub name: Option<String>,
    /// Associated label text
    pub label: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// data-testid
    pub test_id: Option<String>,
    /// Text content
    pub text: String,
    /// Input value
    pub value: String,
    /// Raw CSS/XPath queries this element answers to
    pub queries: Vec<String>,
    /// Parent element id
    pub parent: Option<String>,
    /// Rendered with a box
    pub visible: bool,
    /// Accepts interaction
    pub enabled: bool,
    /// Checkbox state
    pub checked: bool,
    /// Present in the document
    pub attached: bool,
    /// Native select options as (value, label)
    pub options: Vec<(String, String)>,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Files attached to a file input
    pub files: Vec<PathBuf>,
}

impl MockElement {
    /// Visible, enabled, attached element
    #[must_use]
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            role: None,
            name: None,
            label: None,
            placeholder: None,
            test_id: None,
            text: String::new(),
            value: String::new(),
            queries: Vec::new(),
            parent: None,
            visible: true,
            enabled: true,
            checked: false,
            attached: true,
            options: Vec::new(),
            attributes: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    /// Set the ARIA role
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the accessible name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the placeholder
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set data-testid
    #[must_use]
    pub fn test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    /// Set text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the input value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Answer to a raw CSS or XPath query
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    /// Nest inside another element
    #[must_use]
    pub fn inside(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Start checked
    #[must_use]
    pub const fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Start detached
    #[must_use]
    pub const fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Add a native select option
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push((value.into(), label.into()));
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }
}

type Change = Box<dyn FnOnce(&mut MockDom) + Send>;
type Hook = Box<dyn Fn(&mut MockDom) + Send>;

struct Scheduled {
    at: Instant,
    change: Change,
}

/// The mutable page state behind a [`MockDriver`]
#[derive(Default)]
pub struct MockDom {
    elements: Vec<MockElement>,
    url: String,
    pending: Vec<Scheduled>,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("elements", &self.elements)
            .field("url", &self.url)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl MockDom {
    /// Add an element, replacing any element with the same id
    pub fn insert(&mut self, element: MockElement) {
        self.elements.retain(|e| e.id != element.id);
        self.elements.push(element);
    }

    /// Remove an element and its descendants from the document
    pub fn remove(&mut self, id: &str) {
        let doomed: Vec<usize> = (0..self.elements.len())
            .filter(|&i| self.is_within(i, id))
            .collect();
        for i in doomed {
            self.elements[i].attached = false;
        }
    }

    /// Mutable access to an element
    pub fn element_mut(&mut self, id: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Snapshot of an element
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Make an element visible
    pub fn show(&mut self, id: &str) {
        if let Some(e) = self.element_mut(id) {
            e.visible = true;
        }
    }

    /// Hide an element
    pub fn hide(&mut self, id: &str) {
        if let Some(e) = self.element_mut(id) {
            e.visible = false;
        }
    }

    /// Replace an element's text
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        if let Some(e) = self.element_mut(id) {
            e.text = text.into();
        }
    }

    /// Enable or disable an element
    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if let Some(e) = self.element_mut(id) {
            e.enabled = enabled;
        }
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Change the URL
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Apply `change` once `delay` has elapsed on the tokio clock
    pub fn after(&mut self, delay: Duration, change: impl FnOnce(&mut MockDom) + Send + 'static) {
        self.pending.push(Scheduled {
            at: Instant::now() + delay,
            change: Box::new(change),
        });
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        while let Some(next) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.at <= now)
            .min_by_key(|(_, s)| s.at)
            .map(|(i, _)| i)
        {
            let scheduled = self.pending.remove(next);
            (scheduled.change)(self);
        }
    }

    /// Whether element `index` is `ancestor_id` or nested inside it
    fn is_within(&self, index: usize, ancestor_id: &str) -> bool {
        let mut current = Some(&self.elements[index]);
        let mut hops = 0;
        while let Some(e) = current {
            if e.id == ancestor_id {
                return true;
            }
            hops += 1;
            if hops > self.elements.len() {
                return false;
            }
            current = e.parent.as_deref().and_then(|p| self.element(p));
        }
        false
    }

    fn has_ancestor_in(&self, index: usize, ancestors: &[usize]) -> bool {
        let Some(parent) = self.elements[index].parent.as_deref() else {
            return false;
        };
        let Some(parent_index) = self.elements.iter().position(|e| e.id == parent) else {
            return false;
        };
        ancestors.contains(&parent_index) || self.has_ancestor_in(parent_index, ancestors)
    }

    fn select(&self, selector: &Selector) -> Vec<usize> {
        match selector {
            Selector::Within { scope, inner } => {
                let scopes = self.select(scope);
                self.select(inner)
                    .into_iter()
                    .filter(|&i| self.has_ancestor_in(i, &scopes))
                    .collect()
            }
            _ => (0..self.elements.len())
                .filter(|&i| self.elements[i].attached && matches_simple(&self.elements[i], selector))
                .collect(),
        }
    }
}

fn matches_simple(e: &MockElement, selector: &Selector) -> bool {
    match selector {
        Selector::Role { role, name } => {
            e.role.as_deref() == Some(role.as_str())
                && name
                    .as_ref()
                    .map_or(true, |n| n.matches(e.name.as_deref().unwrap_or(&e.text)))
        }
        Selector::Label(t) => e.label.as_deref().is_some_and(|l| t.matches(l)),
        Selector::Placeholder(t) => e.placeholder.as_deref().is_some_and(|p| t.matches(p)),
        Selector::TestId(id) => e.test_id.as_deref() == Some(id.as_str()),
        Selector::Text(t) => !e.text.is_empty() && t.matches(&e.text),
        Selector::Css(q) | Selector::XPath(q) => e.queries.iter().any(|known| known == q),
        Selector::Within { .. } => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Query {
    selector: Selector,
    scope: Option<ElementHandle>,
}

#[derive(Default)]
struct MockState {
    dom: MockDom,
    handles: HashMap<String, Query>,
    interned: HashMap<Query, String>,
    hooks: HashMap<String, Vec<Hook>>,
    failing_probes: Vec<(Selector, DriverError)>,
    failing_operations: HashMap<String, DriverError>,
    probe_latency: Duration,
    call_history: Vec<String>,
}

impl MockState {
    fn resolve(&self, handle: &ElementHandle) -> Vec<usize> {
        let Some(query) = self.handles.get(handle.driver_ref()) else {
            return Vec::new();
        };
        let mut matched = self.dom.select(&query.selector);
        if let Some(scope) = &query.scope {
            let scopes = self.resolve(scope);
            matched.retain(|&i| self.dom.has_ancestor_in(i, &scopes));
        }
        match handle.pick() {
            Pick::All => matched,
            Pick::First => matched.into_iter().take(1).collect(),
            Pick::Last => matched.pop().into_iter().collect(),
            Pick::Nth(n) => matched.get(n).copied().into_iter().collect(),
        }
    }

    fn first(&self, handle: &ElementHandle) -> Option<&MockElement> {
        self.resolve(handle).first().map(|&i| &self.dom.elements[i])
    }

    /// The single element an interaction targets
    fn single(&self, handle: &ElementHandle) -> DriverResult<usize> {
        let matched = self.resolve(handle);
        match matched.as_slice() {
            [] => Err(DriverError::NotFound),
            [only] => Ok(*only),
            many => Err(DriverError::StrictModeViolation { count: many.len() }),
        }
    }

    fn interactable(&self, handle: &ElementHandle, force: bool) -> DriverResult<usize> {
        let index = self.single(handle)?;
        let e = &self.dom.elements[index];
        if !e.visible {
            return Err(DriverError::NotInteractable("element is not visible".into()));
        }
        if !force && !e.enabled {
            return Err(DriverError::NotInteractable("element is disabled".into()));
        }
        Ok(index)
    }

    fn check_state(&self, handle: &ElementHandle, state: ElementState) -> bool {
        let first = self.first(handle);
        match state {
            ElementState::Visible => first.is_some_and(|e| e.visible),
            ElementState::Hidden => first.map_or(true, |e| !e.visible),
            ElementState::Attached => first.is_some(),
            ElementState::Detached => first.is_none(),
            ElementState::Enabled => first.is_some_and(|e| e.enabled),
            ElementState::Disabled => first.is_some_and(|e| !e.enabled),
            ElementState::Checked => first.is_some_and(|e| e.checked),
            ElementState::Unchecked => first.is_some_and(|e| !e.checked),
        }
    }

    fn fire_hooks(&mut self, index: usize) {
        let id = self.dom.elements[index].id.clone();
        if let Some(hooks) = self.hooks.get(&id) {
            for hook in hooks {
                hook(&mut self.dom);
            }
        }
    }
}

/// Scripted in-memory browser driver
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
    next_handle: std::sync::atomic::AtomicUsize,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MockDriver")
            .field("dom", &state.dom)
            .field("call_history", &state.call_history)
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Empty page at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.lock().dom.url = "about:blank".to_string();
        driver
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the state after applying due changes
    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.lock();
        state.dom.apply_due();
        f(&mut state)
    }

    fn record(&self, operation: &str, target: &str) -> DriverResult<()> {
        let mut state = self.lock();
        state.call_history.push(format!("{operation}:{target}"));
        match state.failing_operations.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Add an element
    pub fn insert(&self, element: MockElement) {
        self.lock().dom.insert(element);
    }

    /// Mutate the page right now
    pub fn update(&self, change: impl FnOnce(&mut MockDom)) {
        self.with_state(|s| change(&mut s.dom));
    }

    /// Mutate the page once `delay` has elapsed
    pub fn after(&self, delay: Duration, change: impl FnOnce(&mut MockDom) + Send + 'static) {
        self.lock().dom.after(delay, change);
    }

    /// Run `hook` every time element `id` is clicked
    pub fn on_click(&self, id: impl Into<String>, hook: impl Fn(&mut MockDom) + Send + 'static) {
        self.lock()
            .hooks
            .entry(id.into())
            .or_default()
            .push(Box::new(hook));
    }

    /// Make existence probes for `selector` fail with `error`
    pub fn fail_probe(&self, selector: Selector, error: DriverError) {
        self.lock().failing_probes.push((selector, error));
    }

    /// Make every existence probe take `latency` on the tokio clock
    pub fn set_probe_latency(&self, latency: Duration) {
        self.lock().probe_latency = latency;
    }

    /// Make every call of `operation` fail with `error`
    pub fn fail_on(&self, operation: impl Into<String>, error: DriverError) {
        let _ = self.lock().failing_operations.insert(operation.into(), error);
    }

    /// Copy of an element's current state
    #[must_use]
    pub fn element(&self, id: &str) -> Option<MockElement> {
        self.with_state(|s| s.dom.element(id).cloned())
    }

    /// Set the current URL
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().dom.url = url.into();
    }

    /// Every call as `operation:target`, in order
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().call_history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.lock()
            .call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.lock().call_history.clear();
    }

    async fn poll(
        &self,
        timeout: Duration,
        mut check: impl FnMut(&MockState) -> bool + Send,
    ) -> DriverResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.with_state(|s| check(s)) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let step = Duration::from_millis(MOCK_POLL_INTERVAL_MS).min(deadline - now);
            tokio::time::sleep(step).await;
        }
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.record("navigate", url)?;
        self.with_state(|s| s.dom.url = url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.with_state(|s| s.dom.url.clone()))
    }

    fn locate(&self, selector: &Selector, scope: Option<&ElementHandle>) -> ElementHandle {
        let description = match scope {
            Some(scope) => format!("{scope} >> {selector}"),
            None => selector.to_string(),
        };
        let query = Query {
            selector: selector.clone(),
            scope: scope.cloned(),
        };
        let mut state = self.lock();
        // Same query, same handle: repeated probes must not grow the table.
        if let Some(driver_ref) = state.interned.get(&query) {
            return ElementHandle::new(driver_ref.clone(), description);
        }
        let n = self
            .next_handle
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let driver_ref = format!("mock-{n}");
        let _ = state.interned.insert(query.clone(), driver_ref.clone());
        let _ = state.handles.insert(driver_ref.clone(), query);
        ElementHandle::new(driver_ref, description)
    }

    async fn count(&self, element: &ElementHandle) -> DriverResult<usize> {
        self.record("count", element.description())?;
        let latency = self.lock().probe_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.with_state(|s| {
            let query = s.handles.get(element.driver_ref());
            if let Some((_, err)) = query.and_then(|q| {
                s.failing_probes
                    .iter()
                    .find(|(selector, _)| *selector == q.selector)
            }) {
                return Err(err.clone());
            }
            Ok(s.resolve(element).len())
        })
    }

    async fn click(&self, element: &ElementHandle, options: &ClickOptions) -> DriverResult<()> {
        self.record("click", element.description())?;
        self.with_state(|s| {
            let index = s.interactable(element, options.force)?;
            for _ in 0..options.click_count.max(1) {
                s.fire_hooks(index);
            }
            Ok(())
        })
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> DriverResult<()> {
        self.record("fill", element.description())?;
        self.with_state(|s| {
            let index = s.interactable(element, false)?;
            s.dom.elements[index].value = value.to_string();
            Ok(())
        })
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        self.record("clear", element.description())?;
        self.with_state(|s| {
            let index = s.interactable(element, false)?;
            s.dom.elements[index].value.clear();
            Ok(())
        })
    }

    async fn type_text(
        &self,
        element: &ElementHandle,
        text: &str,
        delay: Duration,
    ) -> DriverResult<()> {
        self.record("type_text", element.description())?;
        let keystrokes = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        if !delay.is_zero() {
            tokio::time::sleep(delay.saturating_mul(keystrokes)).await;
        }
        self.with_state(|s| {
            let index = s.interactable(element, false)?;
            s.dom.elements[index].value.push_str(text);
            Ok(())
        })
    }

    async fn select_option(
        &self,
        element: &ElementHandle,
        option: &SelectOption,
    ) -> DriverResult<Vec<String>> {
        self.record("select_option", element.description())?;
        self.with_state(|s| {
            let index = s.interactable(element, false)?;
            let e = &mut s.dom.elements[index];
            let chosen = match option {
                SelectOption::Value(v) => e.options.iter().find(|(value, _)| value == v),
                SelectOption::Label(l) => e.options.iter().find(|(_, label)| label == l),
                SelectOption::Index(i) => e.options.get(*i),
            }
            .map(|(value, _)| value.clone())
            .ok_or_else(|| DriverError::NotInteractable(format!("no option with {option}")))?;
            e.value.clone_from(&chosen);
            Ok(vec![chosen])
        })
    }

    async fn set_checked(&self, element: &ElementHandle, checked: bool) -> DriverResult<()> {
        self.record("set_checked", element.description())?;
        self.with_state(|s| {
            let index = s.interactable(element, false)?;
            s.dom.elements[index].checked = checked;
            s.fire_hooks(index);
            Ok(())
        })
    }

    async fn hover(&self, element: &ElementHandle) -> DriverResult<()> {
        self.record("hover", element.description())?;
        self.with_state(|s| s.interactable(element, true).map(|_| ()))
    }

    async fn drag_to(&self, source: &ElementHandle, target: &ElementHandle) -> DriverResult<()> {
        self.record("drag_to", source.description())?;
        self.with_state(|s| {
            let from = s.interactable(source, false)?;
            let to = s.single(target)?;
            let parent = s.dom.elements[to].id.clone();
            s.dom.elements[from].parent = Some(parent);
            Ok(())
        })
    }

    async fn set_input_files(
        &self,
        element: &ElementHandle,
        files: &[PathBuf],
    ) -> DriverResult<()> {
        self.record("set_input_files", element.description())?;
        self.with_state(|s| {
            let index = s.single(element)?;
            s.dom.elements[index].files = files.to_vec();
            Ok(())
        })
    }

    async fn press(&self, element: &ElementHandle, key: &str) -> DriverResult<()> {
        self.record("press", &format!("{}:{key}", element.description()))?;
        self.with_state(|s| s.interactable(element, false).map(|_| ()))
    }

    async fn text_content(&self, element: &ElementHandle) -> DriverResult<Option<String>> {
        self.with_state(|s| {
            s.first(element)
                .map(|e| Some(e.text.clone()))
                .ok_or(DriverError::NotFound)
        })
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.with_state(|s| {
            s.first(element)
                .map(|e| e.attributes.get(name).cloned())
                .ok_or(DriverError::NotFound)
        })
    }

    async fn input_value(&self, element: &ElementHandle) -> DriverResult<String> {
        self.with_state(|s| {
            s.first(element)
                .map(|e| e.value.clone())
                .ok_or(DriverError::NotFound)
        })
    }

    async fn is_visible(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.with_state(|s| s.first(element).is_some_and(|e| e.visible)))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_state(|s| s.first(element).map(|e| e.enabled).ok_or(DriverError::NotFound))
    }

    async fn is_checked(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_state(|s| s.first(element).map(|e| e.checked).ok_or(DriverError::NotFound))
    }

    async fn wait_for_state(
        &self,
        element: &ElementHandle,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<bool> {
        self.poll(timeout, |s| s.check_state(element, state)).await
    }

    async fn wait_for_text(
        &self,
        element: &ElementHandle,
        predicate: &StringPredicate<'_>,
        timeout: Duration,
    ) -> DriverResult<bool> {
        self.poll(timeout, |s| s.first(element).is_some_and(|e| predicate(&e.text)))
            .await
    }

    async fn wait_for_count(
        &self,
        element: &ElementHandle,
        expected: usize,
        timeout: Duration,
    ) -> DriverResult<bool> {
        self.poll(timeout, |s| s.resolve(element).len() == expected)
            .await
    }

    async fn wait_for_url(
        &self,
        predicate: &StringPredicate<'_>,
        timeout: Duration,
    ) -> DriverResult<bool> {
        self.poll(timeout, |s| predicate(&s.dom.url)).await
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.record("screenshot", "page")?;
        Ok(MOCK_PNG.to_vec())
    }
}
