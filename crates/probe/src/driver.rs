//! Browser abstraction traits.
//!
//! Page objects never talk to an automation library directly. They hold
//! [`ElementHandle`]s obtained from a [`BrowserSession`], and the runner gets
//! sessions from a [`SessionFactory`]. Two adapters implement these traits:
//!
//! - `CdpSession` (feature `browser`): chromiumoxide over the Chrome DevTools Protocol
//! - [`MockSession`](crate::mock::MockSession): scripted in-memory pages for tests

use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Point-in-time view of a located element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Whether the selector resolved to an element
    pub found: bool,
    /// Whether the element is rendered with a non-empty box
    pub visible: bool,
    /// `textContent`, if found
    pub text: Option<String>,
    /// Current `value` for form controls
    pub value: Option<String>,
}

impl ElementSnapshot {
    /// Snapshot of an element that is not in the page
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Capability interface for a located UI element.
///
/// Handles are lazy: each call re-resolves the selector against the page the
/// session currently shows.
#[async_trait]
pub trait ElementHandle: Send + Sync + fmt::Debug {
    /// Label used in logs and errors (e.g. `home.check_in`)
    fn name(&self) -> &str;

    /// Locating strategy
    fn selector(&self) -> &Selector;

    /// Read the element's current state
    async fn snapshot(&self) -> ProbeResult<ElementSnapshot>;

    /// Replace the value of an input
    async fn fill(&self, text: &str) -> ProbeResult<()>;

    /// Click the element
    async fn click(&self) -> ProbeResult<()>;

    /// Scroll the element into the viewport
    async fn scroll_into_view(&self) -> ProbeResult<()>;

    /// Whether the element is currently visible
    async fn is_visible(&self) -> ProbeResult<bool> {
        Ok(self.snapshot().await?.visible)
    }

    /// Current text content, `None` when the element is absent
    async fn text_content(&self) -> ProbeResult<Option<String>> {
        Ok(self.snapshot().await?.text)
    }

    /// Current input value, `None` when the element is absent
    async fn input_value(&self) -> ProbeResult<Option<String>> {
        Ok(self.snapshot().await?.value)
    }
}

/// Which edge of the document to scroll to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEdge {
    /// Top of the document
    Top,
    /// Bottom of the document
    Bottom,
}

/// One exclusive browser session (a single page)
#[async_trait]
pub trait BrowserSession: Send + Sync + fmt::Debug {
    /// Bind a named handle to a selector. Nothing is resolved until used.
    fn locate(&self, name: &str, selector: &Selector) -> Arc<dyn ElementHandle>;

    /// Navigate to an absolute URL and wait for the given load state
    async fn goto(&self, url: &str, wait_until: LoadState, timeout: Duration) -> ProbeResult<()>;

    /// Current location
    async fn current_url(&self) -> ProbeResult<String>;

    /// Current document title
    async fn title(&self) -> ProbeResult<String>;

    /// Press and release a key on the focused element (e.g. "Tab")
    async fn press_key(&self, key: &str) -> ProbeResult<()>;

    /// Scroll the window to the top or bottom
    async fn scroll_page(&self, edge: PageEdge) -> ProbeResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Release the session. Called exactly once by the runner.
    async fn close(&self) -> ProbeResult<()>;
}

/// Produces fresh, isolated sessions for scenarios
#[async_trait]
pub trait SessionFactory: Send + Sync + fmt::Debug {
    /// Project label for reporting (e.g. "Chromium")
    fn project(&self) -> &str;

    /// Open a new session
    async fn open(&self) -> ProbeResult<Arc<dyn BrowserSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_snapshot() {
        let snap = ElementSnapshot::missing();
        assert!(!snap.found);
        assert!(!snap.visible);
        assert!(snap.text.is_none());
        assert!(snap.value.is_none());
    }

    #[test]
    fn test_snapshot_deserializes_from_probe_json() {
        let json = r#"{"found":true,"visible":true,"text":"Book Now","value":null}"#;
        let snap: ElementSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.visible);
        assert_eq!(snap.text.as_deref(), Some("Book Now"));
        assert_eq!(snap.value, None);
    }
}
