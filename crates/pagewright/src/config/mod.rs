//! Runtime configuration.
//!
//! A [`RuntimeConfig`] is resolved once per test run by
//! [`ConfigResolver`] and handed to every engine through an `Arc`. It is a
//! read-only snapshot; [`RuntimeConfig::update`] is the only mutation path
//! and re-validates the merged result.
//!
//! Resolution layers, lowest precedence first:
//!
//! 1. per-environment defaults ([`Environment::defaults`])
//! 2. generic `.env` profile file
//! 3. environment profile file (`.env.qa`, ...)
//! 4. process environment variables
//! 5. explicit [`ConfigOverrides`]

mod profile;
mod resolver;

pub use profile::{Profile, KNOWN_KEYS};
pub use resolver::{ConfigResolver, DEFAULT_SEARCH_DIRS, ENVIRONMENT_VARS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::result::{PagewrightError, PagewrightResult};

/// Lowest accepted default timeout
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Target environment of a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development stack
    Development,
    /// Shared QA environment
    #[default]
    Qa,
    /// Production
    Production,
}

impl Environment {
    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Qa => "qa",
            Self::Production => "production",
        }
    }

    /// File name of this environment's profile
    #[must_use]
    pub fn profile_file_name(&self) -> String {
        format!(".env.{}", self.as_str())
    }

    /// Hard-coded defaults for this environment
    #[must_use]
    pub fn defaults(self) -> RuntimeConfig {
        let (base_url, timeout_ms, headless, slow_mo_ms, retries, workers, features) = match self
        {
            Self::Development => (
                "http://localhost:3000",
                30_000,
                false,
                100,
                0,
                1,
                FeatureFlags {
                    screenshots: true,
                    video: true,
                    trace: true,
                },
            ),
            Self::Qa => (
                "https://qa.example.com",
                45_000,
                false,
                0,
                1,
                2,
                FeatureFlags {
                    screenshots: true,
                    video: false,
                    trace: true,
                },
            ),
            Self::Production => (
                "https://app.example.com",
                60_000,
                true,
                0,
                2,
                4,
                FeatureFlags {
                    screenshots: true,
                    video: false,
                    trace: false,
                },
            ),
        };
        RuntimeConfig {
            environment: self,
            base_url: base_url.to_string(),
            api_url: None,
            timeout_ms,
            headless,
            browser: BrowserKind::default(),
            slow_mo_ms,
            retries,
            workers,
            credentials: Credentials::default(),
            features,
        }
    }
}

impl FromStr for Environment {
    type Err = PagewrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "qa" | "test" | "staging" => Ok(Self::Qa),
            "production" | "prod" => Ok(Self::Production),
            other => Err(PagewrightError::config(
                "environment",
                format!("unknown environment '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser engine the harness should launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chromium / Chrome
    #[default]
    Chromium,
    /// Firefox
    Firefox,
    /// WebKit / Safari
    Webkit,
}

impl BrowserKind {
    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }

    /// Parse leniently: unsupported names fall back to the default kind.
    ///
    /// CI runners regularly pass slightly malformed values here, so this is
    /// a warning rather than a validation failure.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            let fallback = Self::default();
            tracing::warn!(
                browser = value,
                fallback = fallback.as_str(),
                "unsupported browser, using default"
            );
            fallback
        })
    }
}

impl FromStr for BrowserKind {
    type Err = PagewrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "webkit" | "safari" => Ok(Self::Webkit),
            other => Err(PagewrightError::config(
                "BROWSER",
                format!("unsupported browser '{other}'"),
            )),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login used by page objects that sign in
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password (never serialized or printed)
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Optional artifact capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Capture screenshots on failure
    pub screenshots: bool,
    /// Record video
    pub video: bool,
    /// Record a trace
    pub trace: bool,
}

/// Resolved configuration for a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    environment: Environment,
    base_url: String,
    api_url: Option<String>,
    timeout_ms: u64,
    headless: bool,
    browser: BrowserKind,
    slow_mo_ms: u64,
    retries: u32,
    workers: u32,
    credentials: Credentials,
    features: FeatureFlags,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Environment::default().defaults()
    }
}

impl RuntimeConfig {
    /// Defaults for `environment` with `overrides` applied
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationFailed` if the merged result is invalid
    pub fn with_overrides(
        environment: Environment,
        overrides: ConfigOverrides,
    ) -> PagewrightResult<Self> {
        let mut config = environment.defaults();
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Environment this config was resolved for
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Application base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Backend API URL, if configured
    #[must_use]
    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// Default timeout for waits, actions and assertions
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Default timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether the browser runs headless
    #[must_use]
    pub const fn headless(&self) -> bool {
        self.headless
    }

    /// Browser engine
    #[must_use]
    pub const fn browser(&self) -> BrowserKind {
        self.browser
    }

    /// Post-action settle delay in milliseconds
    #[must_use]
    pub const fn slow_mo_ms(&self) -> u64 {
        self.slow_mo_ms
    }

    /// Post-action settle delay
    #[must_use]
    pub const fn slow_mo(&self) -> Duration {
        Duration::from_millis(self.slow_mo_ms)
    }

    /// Retries the harness may apply per test
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Parallel worker processes
    #[must_use]
    pub const fn workers(&self) -> u32 {
        self.workers
    }

    /// Login credentials
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Artifact capture flags
    #[must_use]
    pub const fn features(&self) -> FeatureFlags {
        self.features
    }

    /// Join `path` onto the base URL. Absolute URLs pass through.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Merge partial overrides and re-validate.
    ///
    /// On error the config is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationFailed` if the merged result is invalid
    pub fn update(&mut self, overrides: ConfigOverrides) -> PagewrightResult<()> {
        let mut next = self.clone();
        next.apply(overrides);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check the invariants every resolved config must hold
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationFailed` naming the first bad field
    pub fn validate(&self) -> PagewrightResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(PagewrightError::config("BASE_URL", "must not be empty"));
        }
        if self.timeout_ms < MIN_TIMEOUT_MS {
            return Err(PagewrightError::config(
                "TIMEOUT",
                format!(
                    "must be at least {MIN_TIMEOUT_MS}ms, got {}ms",
                    self.timeout_ms
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, o: ConfigOverrides) {
        if let Some(v) = o.base_url {
            self.base_url = v;
        }
        if let Some(v) = o.api_url {
            self.api_url = Some(v);
        }
        if let Some(v) = o.timeout_ms {
            self.timeout_ms = v;
        }
        if let Some(v) = o.headless {
            self.headless = v;
        }
        if let Some(v) = o.browser {
            self.browser = v;
        }
        if let Some(v) = o.slow_mo_ms {
            self.slow_mo_ms = v;
        }
        if let Some(v) = o.retries {
            self.retries = v;
        }
        if let Some(v) = o.workers {
            self.workers = v;
        }
        if let Some(v) = o.username {
            self.credentials.username = v;
        }
        if let Some(v) = o.password {
            self.credentials.password = v;
        }
        if let Some(v) = o.screenshots {
            self.features.screenshots = v;
        }
        if let Some(v) = o.video {
            self.features.video = v;
        }
        if let Some(v) = o.trace {
            self.features.trace = v;
        }
    }
}

/// Partial configuration; `None` fields leave the lower layer untouched.
///
/// Deserializable so overrides can come from JSON fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Base URL
    pub base_url: Option<String>,
    /// API URL
    pub api_url: Option<String>,
    /// Default timeout (ms)
    pub timeout_ms: Option<u64>,
    /// Headless mode
    pub headless: Option<bool>,
    /// Browser engine
    pub browser: Option<BrowserKind>,
    /// Settle delay (ms)
    pub slow_mo_ms: Option<u64>,
    /// Harness retries
    pub retries: Option<u32>,
    /// Worker count
    pub workers: Option<u32>,
    /// Login username
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Screenshot capture
    pub screenshots: Option<bool>,
    /// Video capture
    pub video: Option<bool>,
    /// Trace capture
    pub trace: Option<bool>,
}

impl ConfigOverrides {
    /// Empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from JSON
    ///
    /// # Errors
    ///
    /// Returns `Json` on malformed input or unknown fields
    pub fn from_json(json: &str) -> PagewrightResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set API URL
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set default timeout
    #[must_use]
    pub const fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Set browser engine
    #[must_use]
    pub const fn browser(mut self, browser: BrowserKind) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Set settle delay
    #[must_use]
    pub const fn slow_mo_ms(mut self, ms: u64) -> Self {
        self.slow_mo_ms = Some(ms);
        self
    }

    /// Set harness retries
    #[must_use]
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set worker count
    #[must_use]
    pub const fn workers(mut self, workers: u32) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set login credentials
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set artifact flags
    #[must_use]
    pub const fn features(mut self, flags: FeatureFlags) -> Self {
        self.screenshots = Some(flags.screenshots);
        self.video = Some(flags.video);
        self.trace = Some(flags.trace);
        self
    }
}
