//! BrowserDriver - the injected browser automation seam.
//!
//! Pagewright never drives a browser itself. Everything it does goes
//! through [`BrowserDriver`], which a harness implements on top of its
//! automation backend (CDP, WebDriver, a Playwright bridge, or the
//! in-memory [`MockDriver`](crate::mock::MockDriver) in tests).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Page objects                                                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FallbackChain · WaitEngine · Actions · Assertions           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  BrowserDriver (trait object, Arc<dyn BrowserDriver>)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wait primitives are the driver's own: the engine only chooses which
//! primitive to call and with what timeout. They resolve to `Ok(true)` once
//! satisfied and `Ok(false)` when their timeout elapses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::locator::Selector;

/// Result type for driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Predicate over a string (element text or page URL) polled by a driver
pub type StringPredicate<'a> = dyn Fn(&str) -> bool + Send + Sync + 'a;

/// Errors reported by a driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The element left the document mid-operation
    #[error("element is detached from the document")]
    Detached,
    /// An operation needing one element matched several
    #[error("strict mode violation: {count} elements matched")]
    StrictModeViolation {
        /// Number of matches
        count: usize,
    },
    /// Nothing matches the handle
    #[error("no element matches")]
    NotFound,
    /// The element refused the interaction
    #[error("element is not interactable: {0}")]
    NotInteractable(String),
    /// Navigation was interrupted or failed
    #[error("navigation failed: {0}")]
    Navigation(String),
    /// Backend protocol error
    #[error("{0}")]
    Protocol(String),
    /// The driver does not implement this capability
    #[error("unsupported by this driver: {0}")]
    Unsupported(String),
}

/// Which of a handle's matches an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pick {
    /// Every match; single-element operations require exactly one
    #[default]
    All,
    /// First match
    First,
    /// Last match
    Last,
    /// Zero-based match index
    Nth(usize),
}

/// Opaque reference to zero or more elements, minted by the driver.
///
/// The core never looks inside `driver_ref`; it only hands the handle back
/// to driver methods. Handles are lazy: whether they match anything is
/// decided when they are used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    driver_ref: String,
    description: String,
    pick: Pick,
}

impl ElementHandle {
    /// Create a handle (for driver implementations)
    #[must_use]
    pub fn new(driver_ref: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            driver_ref: driver_ref.into(),
            description: description.into(),
            pick: Pick::All,
        }
    }

    /// Driver-private reference
    #[must_use]
    pub fn driver_ref(&self) -> &str {
        &self.driver_ref
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Which match this handle targets
    #[must_use]
    pub const fn pick(&self) -> Pick {
        self.pick
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.with_pick(Pick::First)
    }

    /// Narrow to the last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.with_pick(Pick::Last)
    }

    /// Narrow to the zero-based `index`th match
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_pick(Pick::Nth(index))
    }

    fn with_pick(&self, pick: Pick) -> Self {
        Self {
            driver_ref: self.driver_ref.clone(),
            description: self.description.clone(),
            pick,
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pick {
            Pick::All => write!(f, "{}", self.description),
            Pick::First => write!(f, "{} (first)", self.description),
            Pick::Last => write!(f, "{} (last)", self.description),
            Pick::Nth(n) => write!(f, "{} (nth={n})", self.description),
        }
    }
}

/// Element states a driver can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// Attached with a non-empty box
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
    /// Checkbox/radio is on
    Checked,
    /// Checkbox/radio is off
    Unchecked,
}

impl ElementState {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mouse button for clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button
    #[default]
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// Per-call click options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOptions {
    /// Mouse button
    pub button: MouseButton,
    /// Number of clicks (2 = double click)
    pub click_count: u32,
    /// Delay between mousedown and mouseup
    pub delay_ms: u64,
    /// Skip the enabled check before clicking
    pub force: bool,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            delay_ms: 0,
            force: false,
        }
    }
}

impl ClickOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the button
    #[must_use]
    pub const fn button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Set the click count
    #[must_use]
    pub const fn click_count(mut self, count: u32) -> Self {
        self.click_count = count;
        self
    }

    /// Set mousedown/mouseup delay
    #[must_use]
    pub const fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the force flag
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Option to pick in a native `<select>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOption {
    /// By `value` attribute
    Value(String),
    /// By visible label
    Label(String),
    /// By zero-based index
    Index(usize),
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "value={v:?}"),
            Self::Label(l) => write!(f, "label={l:?}"),
            Self::Index(i) => write!(f, "index={i}"),
        }
    }
}

/// Abstract browser automation driver.
///
/// Implementations must be shareable across tasks: the wait engine runs
/// `all`/`any` members concurrently against the same driver.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Current page URL
    async fn current_url(&self) -> DriverResult<String>;

    /// Materialize a lazy reference for `selector`, optionally inside
    /// `scope`. Must not touch the page.
    fn locate(&self, selector: &Selector, scope: Option<&ElementHandle>) -> ElementHandle;

    /// Number of elements currently matching (the existence probe)
    async fn count(&self, element: &ElementHandle) -> DriverResult<usize>;

    /// Click
    async fn click(&self, element: &ElementHandle, options: &ClickOptions) -> DriverResult<()>;

    /// Replace the input value
    async fn fill(&self, element: &ElementHandle, value: &str) -> DriverResult<()>;

    /// Empty the input value
    async fn clear(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Type keystroke by keystroke, appending to the current value
    async fn type_text(
        &self,
        element: &ElementHandle,
        text: &str,
        delay: Duration,
    ) -> DriverResult<()>;

    /// Choose an option of a native select; returns the selected values
    async fn select_option(
        &self,
        element: &ElementHandle,
        option: &SelectOption,
    ) -> DriverResult<Vec<String>>;

    /// Set a checkbox or radio
    async fn set_checked(&self, element: &ElementHandle, checked: bool) -> DriverResult<()>;

    /// Move the pointer over the element
    async fn hover(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Drag `source` onto `target`
    async fn drag_to(&self, source: &ElementHandle, target: &ElementHandle) -> DriverResult<()>;

    /// Attach files to a file input
    async fn set_input_files(&self, element: &ElementHandle, files: &[PathBuf])
        -> DriverResult<()>;

    /// Press a key (e.g. "Enter", "Control+A") with the element focused
    async fn press(&self, element: &ElementHandle, key: &str) -> DriverResult<()>;

    /// Text content
    async fn text_content(&self, element: &ElementHandle) -> DriverResult<Option<String>>;

    /// Attribute value
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> DriverResult<Option<String>>;

    /// Current input value
    async fn input_value(&self, element: &ElementHandle) -> DriverResult<String>;

    /// Visibility right now
    async fn is_visible(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Enabled right now
    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Checked right now
    async fn is_checked(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Wait for an element state
    async fn wait_for_state(
        &self,
        element: &ElementHandle,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<bool>;

    /// Wait until the element's text satisfies `predicate`
    async fn wait_for_text(
        &self,
        element: &ElementHandle,
        predicate: &StringPredicate<'_>,
        timeout: Duration,
    ) -> DriverResult<bool>;

    /// Wait until exactly `expected` elements match
    async fn wait_for_count(
        &self,
        element: &ElementHandle,
        expected: usize,
        timeout: Duration,
    ) -> DriverResult<bool>;

    /// Wait until the page URL satisfies `predicate`
    async fn wait_for_url(
        &self,
        predicate: &StringPredicate<'_>,
        timeout: Duration,
    ) -> DriverResult<bool>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;
}
