//! Locating strategies and matchers.
//!
//! A [`Selector`] describes *how* to find an element; it is evaluated lazily
//! against whatever page the session currently shows. Selectors render to a
//! JavaScript expression that yields the element or `null`, which is how the
//! CDP adapter resolves them.

use regex::Regex;
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    XPath(String),
    /// First XPath of several alternatives that matches (XPath union)
    AnyXPath(Vec<String>),
    /// Element whose own trimmed text equals the given string
    ExactText(String),
    /// ARIA role with accessible name (e.g., button "Submit")
    Role {
        /// Role name (button, link, heading, textbox)
        role: String,
        /// Accessible name
        name: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an exact-text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::ExactText(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Convert to a JavaScript expression evaluating to the element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({})", js_str(s)),
            Self::XPath(s) => xpath_query(s),
            Self::AnyXPath(exprs) => {
                let parts: Vec<String> = exprs.iter().map(|e| xpath_query(e)).collect();
                format!("({})", parts.join(" || "))
            }
            Self::ExactText(t) => format!(
                "Array.from(document.querySelectorAll('body *')).find(el => \
                 el.textContent.trim() === {t} && \
                 !Array.from(el.children).some(c => c.textContent.trim() === {t})) || null",
                t = js_str(t)
            ),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll({css})).find(el => \
                 (el.getAttribute('aria-label') || el.textContent || el.value || '').trim() === {name}) || null",
                css = js_str(role_css(role)),
                name = js_str(name)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::AnyXPath(exprs) => write!(f, "xpath={}", exprs.join(" | ")),
            Self::ExactText(t) => write!(f, "text=\"{t}\""),
            Self::Role { role, name } => write!(f, "role={role}[name=\"{name}\"]"),
        }
    }
}

/// Quote a Rust string as a JavaScript string literal
fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn xpath_query(expr: &str) -> String {
    format!(
        "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
        js_str(expr)
    )
}

/// CSS approximation of the implicit ARIA roles the suite relies on
fn role_css(role: &str) -> &'static str {
    match role {
        "button" => "button, [role=\"button\"], input[type=\"submit\"], input[type=\"button\"]",
        "link" => "a[href], [role=\"link\"]",
        "heading" => "h1, h2, h3, h4, h5, h6, [role=\"heading\"]",
        "textbox" => "input:not([type]), input[type=\"text\"], input[type=\"email\"], input[type=\"tel\"], textarea, [role=\"textbox\"]",
        _ => "[role]",
    }
}

/// Collapse runs of whitespace and trim, the way rendered text compares
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expected text: an exact string or a regular expression
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Whole-text equality after whitespace normalization
    Exact(String),
    /// Regular expression searched within the text
    Pattern(Regex),
}

impl TextMatcher {
    /// Exact matcher
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Check a candidate text
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Exact(expected) => normalize_whitespace(actual) == normalize_whitespace(expected),
            Self::Pattern(re) => re.is_match(actual),
        }
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "'{s}'"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for TextMatcher {
    fn from(s: &str) -> Self {
        Self::Exact(s.to_string())
    }
}

impl From<String> for TextMatcher {
    fn from(s: String) -> Self {
        Self::Exact(s)
    }
}

impl From<Regex> for TextMatcher {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// Pattern for matching the active location
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(Regex),
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(re) => re.is_match(url),
        }
    }

    /// Regex matching a literal URL fragment anywhere in the location
    #[must_use]
    pub fn fragment(fragment: &str) -> Self {
        // an escaped literal always compiles
        Regex::new(&regex::escape(fragment))
            .map_or_else(|_| Self::Contains(fragment.to_string()), Self::Regex)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "'{s}'"),
            Self::Contains(s) => write!(f, "*{s}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}
