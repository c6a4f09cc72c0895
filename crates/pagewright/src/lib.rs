//! Pagewright: resilient UI test automation core
//!
//! Page objects describe elements as ordered lists of selector candidates and
//! compose a small set of engines into business-named operations. The
//! engines own everything that makes browser tests flaky when done ad hoc:
//! fallback resolution, condition waits, actionability checks and
//! assertion reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     PAGEWRIGHT Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌────────────────────────────────────────┐   │
//! │  │ConfigResolver│──►│ PageContext (Arc<RuntimeConfig>)       │   │
//! │  └──────────────┘   │  ┌─────────────┐  ┌────────────────┐   │   │
//! │                     │  │FallbackChain│◄─│ Actions        │   │   │
//! │  ┌──────────────┐   │  └─────────────┘  │ Assertions     │   │   │
//! │  │ Page objects │──►│  ┌─────────────┐  │                │   │   │
//! │  └──────────────┘   │  │ WaitEngine  │◄─│                │   │   │
//! │                     │  └─────────────┘  └────────────────┘   │   │
//! │                     └───────────────────┬────────────────────┘   │
//! │                                         ▼                        │
//! │                          Arc<dyn BrowserDriver>                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod action;
mod assertion;
mod chain;
mod config;
mod driver;
mod locator;
pub mod logging;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod page_object;
mod result;
mod wait;

pub use action::{ActionOutcome, Actions, FillOptions, Target};
pub use assertion::{
    AssertionFailure, AssertionMode, AssertionSummary, Assertions, Expect, PageExpect,
    SoftAssertions,
};
pub use chain::{Attempt, FallbackChain, ProbeOutcome, Resolution};
pub use config::{
    BrowserKind, ConfigOverrides, ConfigResolver, Credentials, Environment, FeatureFlags, Profile,
    RuntimeConfig, DEFAULT_SEARCH_DIRS, ENVIRONMENT_VARS, KNOWN_KEYS, MIN_TIMEOUT_MS,
};
pub use driver::{
    BrowserDriver, ClickOptions, DriverError, DriverResult, ElementHandle, ElementState,
    MouseButton, Pick, SelectOption, StringPredicate,
};
pub use locator::{Locator, Selector, TextMatch};
pub use page_object::{PageContext, PageObject, Table};
pub use result::{PagewrightError, PagewrightResult};
pub use wait::{
    Condition, Presence, UrlPattern, UrlRegex, Wait, WaitEngine, WaitResult, WaitTarget,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::action::*;
    pub use super::assertion::*;
    pub use super::chain::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::wait::*;
}
