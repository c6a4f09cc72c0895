//! Selector candidates and candidate lists.
//!
//! A [`Selector`] describes one way to find an element. A [`Locator`] is the
//! ordered, non-empty list of selectors for one logical element: the first
//! candidate that currently exists wins, so order encodes author preference
//! ("prefer test-id, fall back to visible text, fall back to raw CSS").
//!
//! ```
//! use pagewright::{Locator, Selector};
//!
//! let search = Locator::new("search box", Selector::test_id("search-input"))
//!     .or(Selector::placeholder("Search activities..."))
//!     .or(Selector::css("input[type=search]"));
//! assert_eq!(search.len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{PagewrightError, PagewrightResult};

/// Text to match against a label, placeholder, accessible name or content.
///
/// Exact by default; [`TextMatch::partial`] switches to substring matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextMatch {
    /// Text to look for
    pub value: String,
    /// Whole-string match when true, substring match otherwise
    pub exact: bool,
}

impl TextMatch {
    /// Exact text match
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: true,
        }
    }

    /// Substring text match
    #[must_use]
    pub fn partial(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: false,
        }
    }

    /// Check a candidate string.
    ///
    /// Exact matching compares trimmed text; substring matching is
    /// case-insensitive.
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        if self.exact {
            actual.trim() == self.value.trim()
        } else {
            actual
                .to_lowercase()
                .contains(&self.value.to_lowercase())
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "{:?}", self.value)
        } else {
            write!(f, "~{:?}", self.value)
        }
    }
}

/// One selector candidate: a strategy plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// ARIA role with optional accessible name
    Role {
        /// Role name (e.g. "button", "option")
        role: String,
        /// Accessible name filter
        name: Option<TextMatch>,
    },
    /// Associated form label
    Label(TextMatch),
    /// Input placeholder
    Placeholder(TextMatch),
    /// Test ID attribute (data-testid)
    TestId(String),
    /// Visible text content
    Text(TextMatch),
    /// Raw CSS query
    Css(String),
    /// Raw XPath query
    XPath(String),
    /// Inner candidate evaluated inside the matches of an outer one
    Within {
        /// Outer scope
        scope: Box<Selector>,
        /// Candidate resolved inside the scope
        inner: Box<Selector>,
    },
}

impl Selector {
    /// Role selector without a name filter
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Role selector filtered by exact accessible name
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(TextMatch::exact(name)),
        }
    }

    /// Label selector (exact)
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(TextMatch::exact(text))
    }

    /// Placeholder selector (exact)
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(TextMatch::exact(text))
    }

    /// Test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Visible text selector (exact)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextMatch::exact(text))
    }

    /// CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Scope this selector inside `scope`
    #[must_use]
    pub fn within(self, scope: Selector) -> Self {
        Self::Within {
            scope: Box::new(scope),
            inner: Box::new(self),
        }
    }

    /// Switch any text parameter of this candidate to substring matching.
    ///
    /// Test IDs and raw queries are unaffected.
    #[must_use]
    pub fn partial(self) -> Self {
        match self {
            Self::Role { role, name } => Self::Role {
                role,
                name: name.map(|n| TextMatch::partial(n.value)),
            },
            Self::Label(t) => Self::Label(TextMatch::partial(t.value)),
            Self::Placeholder(t) => Self::Placeholder(TextMatch::partial(t.value)),
            Self::Text(t) => Self::Text(TextMatch::partial(t.value)),
            Self::Within { scope, inner } => Self::Within {
                scope,
                inner: Box::new(inner.partial()),
            },
            other => other,
        }
    }

    /// Strategy tag, for logs and error messages
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Role { .. } => "role",
            Self::Label(_) => "label",
            Self::Placeholder(_) => "placeholder",
            Self::TestId(_) => "test-id",
            Self::Text(_) => "text",
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Within { .. } => "within",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role { role, name: None } => write!(f, "role({role:?})"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role({role:?}, name={name})"),
            Self::Label(t) => write!(f, "label({t})"),
            Self::Placeholder(t) => write!(f, "placeholder({t})"),
            Self::TestId(id) => write!(f, "test-id({id:?})"),
            Self::Text(t) => write!(f, "text({t})"),
            Self::Css(s) => write!(f, "css({s:?})"),
            Self::XPath(s) => write!(f, "xpath({s:?})"),
            Self::Within { scope, inner } => write!(f, "{scope} >> {inner}"),
        }
    }
}

/// Ordered, non-empty list of selector candidates for one logical element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    name: String,
    candidates: Vec<Selector>,
}

impl Locator {
    /// Create a locator with its preferred candidate
    #[must_use]
    pub fn new(name: impl Into<String>, first: Selector) -> Self {
        Self {
            name: name.into(),
            candidates: vec![first],
        }
    }

    /// Create a locator from a list of candidates
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `candidates` is empty
    pub fn from_candidates(
        name: impl Into<String>,
        candidates: Vec<Selector>,
    ) -> PagewrightResult<Self> {
        let name = name.into();
        if candidates.is_empty() {
            return Err(PagewrightError::invalid_argument(format!(
                "locator '{name}' needs at least one selector candidate"
            )));
        }
        Ok(Self { name, candidates })
    }

    /// Append a lower-preference fallback candidate
    #[must_use]
    pub fn or(mut self, fallback: Selector) -> Self {
        self.candidates.push(fallback);
        self
    }

    /// Append every candidate of another locator, keeping this name
    #[must_use]
    pub fn or_locator(mut self, fallback: Locator) -> Self {
        self.candidates.extend(fallback.candidates);
        self
    }

    /// Scope every candidate inside `scope`
    #[must_use]
    pub fn within(self, scope: &Selector) -> Self {
        Self {
            name: self.name,
            candidates: self
                .candidates
                .into_iter()
                .map(|c| c.within(scope.clone()))
                .collect(),
        }
    }

    /// Logical element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidates in preference order
    #[must_use]
    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    /// Preferred candidate
    #[must_use]
    pub fn primary(&self) -> &Selector {
        &self.candidates[0]
    }

    /// Number of candidates (never zero)
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::new(selector.to_string(), selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' [", self.name)?;
        for (i, c) in self.candidates.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
