//! Flat `KEY=VALUE` profile files, read with `dotenvy` without touching the
//! process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::result::{PagewrightError, PagewrightResult};

/// Keys the resolver understands. Anything else in a profile is ignored.
pub const KNOWN_KEYS: &[&str] = &[
    "BASE_URL",
    "API_URL",
    "TIMEOUT",
    "HEADLESS",
    "BROWSER",
    "SLOW_MO",
    "TEST_USERNAME",
    "TEST_PASSWORD",
    "ENABLE_SCREENSHOTS",
    "ENABLE_VIDEO",
    "ENABLE_TRACE",
    "RETRIES",
    "WORKERS",
];

/// A loaded profile file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Where the values came from
    pub path: PathBuf,
    /// Raw values by key
    pub values: BTreeMap<String, String>,
}

impl Profile {
    /// Parse profile text.
    ///
    /// Follows dotenv syntax: comments, `export ` prefixes, quoting and
    /// escapes, `${VAR}` substitution. Empty values are treated as absent
    /// and later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationFailed` for a line that does not parse
    pub fn parse(text: &str) -> PagewrightResult<BTreeMap<String, String>> {
        collect(dotenvy::from_read_iter(text.as_bytes()), Path::new("<inline>"))
    }

    /// Load a profile file; a missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read and
    /// `ConfigValidationFailed` naming the file for a malformed line
    pub fn load(path: &Path) -> PagewrightResult<Option<Self>> {
        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => return Ok(None),
            Err(e) => return Err(profile_error(path, e)),
        };
        Ok(Some(Self {
            path: path.to_path_buf(),
            values: collect(entries, path)?,
        }))
    }

    /// Load `file_name` from the first directory that has it.
    ///
    /// Later directories are not consulted once a file loads.
    ///
    /// # Errors
    ///
    /// Returns `Io` if a found file cannot be read
    pub fn find_first(dirs: &[PathBuf], file_name: &str) -> PagewrightResult<Option<Self>> {
        for dir in dirs {
            let path = dir.join(file_name);
            if let Some(profile) = Self::load(&path)? {
                tracing::debug!(path = %path.display(), keys = profile.values.len(), "loaded profile");
                return Ok(Some(profile));
            }
            tracing::debug!(path = %path.display(), "no profile file");
        }
        Ok(None)
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn collect(
    entries: impl Iterator<Item = dotenvy::Result<(String, String)>>,
    path: &Path,
) -> PagewrightResult<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(|e| profile_error(path, e))?;
        if !value.is_empty() {
            let _ = values.insert(key, value);
        }
    }
    Ok(values)
}

fn profile_error(path: &Path, err: dotenvy::Error) -> PagewrightError {
    match err {
        dotenvy::Error::Io(e) => e.into(),
        dotenvy::Error::LineParse(line, index) => PagewrightError::config(
            "profile",
            format!("{}: cannot parse {line:?} at offset {index}", path.display()),
        ),
        other => PagewrightError::config("profile", format!("{}: {other}", path.display())),
    }
}
