//! Page Object Model support.
//!
//! Page objects declare their elements as [`Locator`]s and compose the
//! engines on a [`PageContext`] into business-named operations. The
//! context owns one instance of every engine, all sharing the same driver
//! and configuration.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use pagewright::{
//!     Locator, PageContext, PageObject, PagewrightResult, Selector,
//! };
//!
//! struct ActivitiesPage {
//!     title: Locator,
//!     search: Locator,
//! }
//!
//! impl ActivitiesPage {
//!     fn new() -> Self {
//!         Self {
//!             title: Locator::new("page title", Selector::test_id("page-title"))
//!                 .or(Selector::role_named("heading", "Activities")),
//!             search: Locator::new("search", Selector::test_id("search-input"))
//!                 .or(Selector::placeholder("Search activities...")),
//!         }
//!     }
//!
//!     async fn search(&self, ctx: &PageContext, term: &str) -> PagewrightResult<()> {
//!         ctx.actions().fill(&self.search, term, &Default::default()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl PageObject for ActivitiesPage {
//!     fn path(&self) -> &str {
//!         "/activities"
//!     }
//!
//!     fn ready_locator(&self) -> &Locator {
//!         &self.title
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::action::Actions;
use crate::assertion::Assertions;
use crate::chain::FallbackChain;
use crate::config::RuntimeConfig;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::{Locator, Selector};
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{Condition, Wait, WaitEngine};

/// Trait for page objects representing a page or component in the UI.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Path of the page relative to the configured base URL
    fn path(&self) -> &str;

    /// Element whose visibility means the page is ready
    fn ready_locator(&self) -> &Locator;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate to the page and wait until it is ready
    ///
    /// # Errors
    ///
    /// Navigation failures, or `WaitTimeoutExpired` when the ready element
    /// never shows
    async fn open(&self, ctx: &PageContext) -> PagewrightResult<()> {
        tracing::debug!(page = self.page_name(), path = self.path(), "opening page");
        ctx.goto(self.path()).await?;
        self.wait_until_ready(ctx).await
    }

    /// Wait for the ready element to become visible
    ///
    /// # Errors
    ///
    /// `WaitTimeoutExpired` when it does not within the configured timeout
    async fn wait_until_ready(&self, ctx: &PageContext) -> PagewrightResult<()> {
        let wait = Wait::locator(self.ready_locator(), Condition::Visible);
        ctx.waits().wait(&wait).await.map(|_| ())
    }
}

/// Engines shared by every page object in one test
#[derive(Clone)]
pub struct PageContext {
    driver: Arc<dyn BrowserDriver>,
    config: Arc<RuntimeConfig>,
    chain: FallbackChain,
    waits: WaitEngine,
    actions: Actions,
    assertions: Assertions,
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PageContext {
    /// Build every engine over `driver` and `config`
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: Arc<RuntimeConfig>) -> Self {
        Self {
            chain: FallbackChain::new(driver.clone()),
            waits: WaitEngine::new(driver.clone(), config.clone()),
            actions: Actions::new(driver.clone(), config.clone()),
            assertions: Assertions::new(driver.clone(), config.clone()),
            driver,
            config,
        }
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// The resolved configuration
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Selector resolution
    #[must_use]
    pub const fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Waits
    #[must_use]
    pub const fn waits(&self) -> &WaitEngine {
        &self.waits
    }

    /// Interactions
    #[must_use]
    pub const fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Assertions
    #[must_use]
    pub const fn assertions(&self) -> &Assertions {
        &self.assertions
    }

    /// Navigate to `path`, relative to the base URL unless absolute.
    ///
    /// # Errors
    ///
    /// `DriverOperationFailed` when navigation fails
    pub async fn goto(&self, path: &str) -> PagewrightResult<()> {
        let url = self.config.url_for(path);
        self.driver
            .navigate(&url)
            .await
            .map_err(|e| PagewrightError::driver("navigate", &url, e))
    }

    /// Save a screenshot as `<dir>/<name>.png` when screenshots are enabled.
    ///
    /// Returns the written path, or `None` when the feature is off.
    ///
    /// # Errors
    ///
    /// Driver or I/O failures
    pub async fn capture_failure_screenshot(
        &self,
        name: &str,
        dir: &Path,
    ) -> PagewrightResult<Option<PathBuf>> {
        if !self.config.features().screenshots {
            return Ok(None);
        }
        let png = self
            .driver
            .screenshot()
            .await
            .map_err(|e| PagewrightError::driver("screenshot", "page", e))?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.png", file_stem(name)));
        std::fs::write(&path, png)?;
        tracing::info!(path = %path.display(), "saved failure screenshot");
        Ok(Some(path))
    }

    /// A table addressed by header name
    #[must_use]
    pub fn table(&self, root: Locator) -> Table<'_> {
        Table { ctx: self, root }
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "screenshot".to_string()
    } else {
        stem
    }
}

/// Data table whose columns are looked up by header text
#[derive(Debug)]
pub struct Table<'a> {
    ctx: &'a PageContext,
    root: Locator,
}

impl Table<'_> {
    /// The table root locator
    #[must_use]
    pub const fn root(&self) -> &Locator {
        &self.root
    }

    async fn root_handle(&self) -> PagewrightResult<ElementHandle> {
        let result = self
            .ctx
            .waits()
            .wait(&Wait::locator(&self.root, Condition::Visible))
            .await?;
        match result.handle {
            Some(handle) => Ok(handle),
            None => Ok(self.ctx.chain().resolve(&self.root).await?.handle),
        }
    }

    async fn texts(&self, handle: &ElementHandle) -> PagewrightResult<Vec<String>> {
        let driver = self.ctx.driver();
        let count = driver
            .count(handle)
            .await
            .map_err(|e| PagewrightError::driver("count", handle, e))?;
        let mut texts = Vec::with_capacity(count);
        for i in 0..count {
            let nth = handle.nth(i);
            let text = driver
                .text_content(&nth)
                .await
                .map_err(|e| PagewrightError::driver("text_content", &nth, e))?;
            texts.push(text.unwrap_or_default().trim().to_string());
        }
        Ok(texts)
    }

    fn rows(&self, root: &ElementHandle) -> ElementHandle {
        self.ctx
            .driver()
            .locate(&Selector::css("tbody tr"), Some(root))
    }

    /// Header texts, trimmed, in column order
    ///
    /// # Errors
    ///
    /// When the table never shows or the driver fails
    pub async fn headers(&self) -> PagewrightResult<Vec<String>> {
        let root = self.root_handle().await?;
        let headers = self.ctx.driver().locate(&Selector::css("th"), Some(&root));
        self.texts(&headers).await
    }

    /// Column position of `header`, compared trimmed and case-insensitively
    ///
    /// # Errors
    ///
    /// `NoCandidateResolved` listing the headers seen when none matches
    pub async fn column_index(&self, header: &str) -> PagewrightResult<usize> {
        let headers = self.headers().await?;
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(header.trim()))
            .ok_or_else(|| PagewrightError::NoCandidateResolved {
                element: format!("column '{header}' of '{}'", self.root.name()),
                attempted: headers.iter().map(|h| format!("header {h:?}")).collect(),
            })
    }

    /// Number of body rows
    ///
    /// # Errors
    ///
    /// When the table never shows or the driver fails
    pub async fn row_count(&self) -> PagewrightResult<usize> {
        let root = self.root_handle().await?;
        let rows = self.rows(&root);
        self.ctx
            .driver()
            .count(&rows)
            .await
            .map_err(|e| PagewrightError::driver("count", &rows, e))
    }

    /// Trimmed text of the cell in body row `row` under `header`
    ///
    /// # Errors
    ///
    /// `NoCandidateResolved` for an unknown header, `InvalidArgument` when
    /// the row or the cell does not exist
    pub async fn cell_text(&self, row: usize, header: &str) -> PagewrightResult<String> {
        let column = self.column_index(header).await?;
        let root = self.root_handle().await?;
        let rows = self.rows(&root);
        let row_count = self
            .ctx
            .driver()
            .count(&rows)
            .await
            .map_err(|e| PagewrightError::driver("count", &rows, e))?;
        if row >= row_count {
            return Err(PagewrightError::invalid_argument(format!(
                "row {row} out of range for '{}' ({row_count} rows)",
                self.root.name()
            )));
        }
        let cells = self
            .ctx
            .driver()
            .locate(&Selector::css("td"), Some(&rows.nth(row)));
        let texts = self.texts(&cells).await?;
        texts.into_iter().nth(column).ok_or_else(|| {
            PagewrightError::invalid_argument(format!(
                "row {row} of '{}' has no cell under '{header}'",
                self.root.name()
            ))
        })
    }

    /// First body row whose cell under `header` equals `value` (trimmed)
    ///
    /// # Errors
    ///
    /// `NoCandidateResolved` for an unknown header, or driver failures
    pub async fn find_row(&self, header: &str, value: &str) -> PagewrightResult<Option<usize>> {
        let column = self.column_index(header).await?;
        let root = self.root_handle().await?;
        let rows = self.rows(&root);
        let row_count = self
            .ctx
            .driver()
            .count(&rows)
            .await
            .map_err(|e| PagewrightError::driver("count", &rows, e))?;
        for row in 0..row_count {
            let cells = self
                .ctx
                .driver()
                .locate(&Selector::css("td"), Some(&rows.nth(row)));
            let texts = self.texts(&cells).await?;
            if texts.get(column).is_some_and(|t| t == value.trim()) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
