//! Layered configuration resolution.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::profile::{Profile, KNOWN_KEYS};
use super::{BrowserKind, ConfigOverrides, Environment, RuntimeConfig};
use crate::result::{PagewrightError, PagewrightResult};

/// Variables consulted, in order, to pick the environment
pub const ENVIRONMENT_VARS: &[&str] = &["TEST_ENV", "APP_ENV"];

/// Directories searched for profile files, relative to the resolver root
pub const DEFAULT_SEARCH_DIRS: &[&str] = &[".", "config", "env"];

const GENERIC_PROFILE: &str = ".env";

/// Resolves a [`RuntimeConfig`] from defaults, profile files, environment
/// variables and explicit overrides.
///
/// ```no_run
/// use pagewright::{ConfigOverrides, ConfigResolver};
///
/// let config = ConfigResolver::new()
///     .resolve(Some(ConfigOverrides::new().headless(true)))
///     .expect("valid configuration");
/// assert!(config.headless());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    root: PathBuf,
    search_dirs: Vec<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Resolver rooted at the current directory, reading the process
    /// environment
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            env: None,
        }
    }

    /// Set the directory relative search dirs are joined onto
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Replace the ordered profile search directories
    #[must_use]
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Read variables from `vars` instead of the process environment
    #[must_use]
    pub fn with_env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Ordered directories that will be searched for profile files
    #[must_use]
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.root.join(dir)
                }
            })
            .collect()
    }

    /// Pick the environment from `TEST_ENV` / `APP_ENV`, defaulting to QA
    #[must_use]
    pub fn resolve_environment(&self) -> Environment {
        let Some((var, value)) = ENVIRONMENT_VARS
            .iter()
            .find_map(|var| self.var(var).map(|value| (*var, value)))
        else {
            return Environment::default();
        };
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(
                var,
                value = value.as_str(),
                "unrecognized environment, using qa"
            );
            Environment::default()
        })
    }

    /// Resolve the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationFailed` for unparsable values or a config
    /// that fails validation, and `Io` for profile files that exist but
    /// cannot be read
    pub fn resolve(&self, overrides: Option<ConfigOverrides>) -> PagewrightResult<RuntimeConfig> {
        let environment = self.resolve_environment();
        let mut config = environment.defaults();
        let dirs = self.search_paths();

        if let Some(generic) = Profile::find_first(&dirs, GENERIC_PROFILE)? {
            let source = generic.path.display().to_string();
            config.apply(overrides_from_raw(&generic.values, &source)?);
        }

        let file_name = environment.profile_file_name();
        match Profile::find_first(&dirs, &file_name)? {
            Some(profile) => {
                let source = profile.path.display().to_string();
                config.apply(overrides_from_raw(&profile.values, &source)?);
            }
            None => tracing::debug!(file = file_name.as_str(), "no environment profile found"),
        }

        config.apply(overrides_from_raw(&self.env_layer(), "environment")?);

        if let Some(overrides) = overrides {
            config.apply(overrides);
        }

        config.validate()?;
        tracing::info!(
            environment = config.environment().as_str(),
            base_url = config.base_url(),
            timeout_ms = config.timeout_ms(),
            headless = config.headless(),
            browser = config.browser().as_str(),
            "resolved runtime config"
        );
        Ok(config)
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.env {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        }?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn env_layer(&self) -> BTreeMap<String, String> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.var(key).map(|v| ((*key).to_string(), v)))
            .collect()
    }
}

/// Convert raw profile/env values into typed overrides.
fn overrides_from_raw(
    values: &BTreeMap<String, String>,
    source: &str,
) -> PagewrightResult<ConfigOverrides> {
    let mut o = ConfigOverrides::default();
    for (key, value) in values {
        match key.as_str() {
            "BASE_URL" => o.base_url = Some(value.clone()),
            "API_URL" => o.api_url = Some(value.clone()),
            "TIMEOUT" => o.timeout_ms = Some(parse_u64(key, value, source)?),
            "HEADLESS" => o.headless = Some(parse_bool(key, value, source)?),
            "BROWSER" => o.browser = Some(BrowserKind::parse_lenient(value)),
            "SLOW_MO" => o.slow_mo_ms = Some(parse_u64(key, value, source)?),
            "TEST_USERNAME" => o.username = Some(value.clone()),
            "TEST_PASSWORD" => o.password = Some(value.clone()),
            "ENABLE_SCREENSHOTS" => o.screenshots = Some(parse_bool(key, value, source)?),
            "ENABLE_VIDEO" => o.video = Some(parse_bool(key, value, source)?),
            "ENABLE_TRACE" => o.trace = Some(parse_bool(key, value, source)?),
            "RETRIES" => o.retries = Some(parse_u32(key, value, source)?),
            "WORKERS" => o.workers = Some(parse_u32(key, value, source)?),
            other => tracing::debug!(key = other, source, "ignoring unknown config key"),
        }
    }
    Ok(o)
}

fn parse_u64(key: &str, value: &str, source: &str) -> PagewrightResult<u64> {
    if value.starts_with('-') {
        return Err(PagewrightError::config(
            key,
            format!("must be non-negative, got '{value}' (from {source})"),
        ));
    }
    value.parse().map_err(|_| {
        PagewrightError::config(
            key,
            format!("expected a non-negative integer, got '{value}' (from {source})"),
        )
    })
}

fn parse_u32(key: &str, value: &str, source: &str) -> PagewrightResult<u32> {
    let wide = parse_u64(key, value, source)?;
    u32::try_from(wide).map_err(|_| {
        PagewrightError::config(key, format!("value {wide} is too large (from {source})"))
    })
}

fn parse_bool(key: &str, value: &str, source: &str) -> PagewrightResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(PagewrightError::config(
            key,
            format!("expected a boolean, got '{value}' (from {source})"),
        )),
    }
}
