//! Page Object base contract.
//!
//! Concrete pages declare their locators once as a `(name, Selector)` table,
//! bind it to a session with [`LocatorMap::bind`], and express every step
//! through [`BasePage`] helpers. All waits and expectations re-poll until the
//! condition holds or the timeout (the profile's default unless overridden)
//! elapses.

use crate::config::SuiteConfig;
use crate::driver::{BrowserSession, ElementHandle, PageEdge};
use crate::locator::{Selector, TextMatcher, UrlPattern};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, ElementState, LoadState};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Trait for page objects representing a page of the site
pub trait PageObject {
    /// Path fragment that identifies this page (e.g. "/reservation/")
    fn url_pattern(&self) -> &str;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Location matcher built from [`PageObject::url_pattern`]
    fn url_matcher(&self) -> UrlPattern {
        UrlPattern::fragment(self.url_pattern())
    }

    /// Shared helpers bound to the page's session
    fn base(&self) -> &BasePage;

    /// Named handles of this page
    fn locators(&self) -> &LocatorMap;
}

/// Fixed name → handle map, bound once at page construction
pub struct LocatorMap {
    handles: BTreeMap<&'static str, Arc<dyn ElementHandle>>,
}

impl LocatorMap {
    /// Bind every `(name, selector)` pair to `session`
    #[must_use]
    pub fn bind(session: &dyn BrowserSession, table: Vec<(&'static str, Selector)>) -> Self {
        let handles = table
            .into_iter()
            .map(|(name, selector)| (name, session.locate(name, &selector)))
            .collect();
        Self { handles }
    }

    /// Handle by name
    pub fn get(&self, name: &str) -> ProbeResult<&dyn ElementHandle> {
        self.handles
            .get(name)
            .map(|handle| handle.as_ref())
            .ok_or_else(|| ProbeError::ElementNotFound {
                handle: format!("{name} (no such locator)"),
            })
    }

    /// Bound names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.handles.keys().copied().collect()
    }

    /// Number of handles
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handles are bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl fmt::Debug for LocatorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorMap")
            .field("names", &self.names())
            .finish()
    }
}

/// `name (selector)` label used in errors
#[must_use]
pub fn describe(handle: &dyn ElementHandle) -> String {
    format!("{} ({})", handle.name(), handle.selector())
}

/// Session-bound helpers every page object is built on
#[derive(Debug, Clone)]
pub struct BasePage {
    session: Arc<dyn BrowserSession>,
    config: Arc<SuiteConfig>,
}

impl BasePage {
    /// Bind to a session and configuration
    #[must_use]
    pub fn new(session: Arc<dyn BrowserSession>, config: Arc<SuiteConfig>) -> Self {
        Self { session, config }
    }

    /// Underlying session
    #[must_use]
    pub fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    async fn wait_for_state(
        &self,
        handle: &dyn ElementHandle,
        state: ElementState,
        timeout_ms: Option<u64>,
    ) -> ProbeResult<()> {
        let opts = self.config.wait_options(timeout_ms);
        let want_visible = state == ElementState::Visible;
        let outcome = poll_until(&opts, move || async move {
            let visible = handle.is_visible().await?;
            Ok((visible == want_visible, ()))
        })
        .await?;

        if outcome.satisfied {
            Ok(())
        } else {
            Err(ProbeError::WaitTimeout {
                handle: describe(handle),
                state: state.to_string(),
                timeout_ms: opts.timeout_ms,
            })
        }
    }

    /// Wait until the element is visible
    pub async fn wait_visible(&self, handle: &dyn ElementHandle, timeout_ms: Option<u64>) -> ProbeResult<()> {
        self.wait_for_state(handle, ElementState::Visible, timeout_ms).await
    }

    /// Wait until the element is hidden or detached
    pub async fn wait_hidden(&self, handle: &dyn ElementHandle, timeout_ms: Option<u64>) -> ProbeResult<()> {
        self.wait_for_state(handle, ElementState::Hidden, timeout_ms).await
    }

    /// Assert the element becomes visible
    pub async fn expect_visible(&self, handle: &dyn ElementHandle, timeout_ms: Option<u64>) -> ProbeResult<()> {
        self.wait_visible(handle, timeout_ms)
            .await
            .map_err(into_assertion)
    }

    /// Assert the element becomes hidden
    pub async fn expect_hidden(&self, handle: &dyn ElementHandle, timeout_ms: Option<u64>) -> ProbeResult<()> {
        self.wait_hidden(handle, timeout_ms)
            .await
            .map_err(into_assertion)
    }

    /// Assert the element's text matches, reporting the last observed text
    pub async fn expect_text(
        &self,
        handle: &dyn ElementHandle,
        expected: impl Into<TextMatcher> + Send,
        timeout_ms: Option<u64>,
    ) -> ProbeResult<()> {
        let matcher = expected.into();
        let opts = self.config.wait_options(timeout_ms);
        let m = &matcher;
        let outcome = poll_until(&opts, move || async move {
            let snap = handle.snapshot().await?;
            let text = snap.text.unwrap_or_default();
            Ok((snap.found && m.matches(&text), text))
        })
        .await?;

        if outcome.satisfied {
            tracing::debug!(handle = handle.name(), "text matched {matcher}");
            Ok(())
        } else {
            Err(ProbeError::TextMismatch {
                handle: describe(handle),
                expected: matcher.to_string(),
                actual: outcome.last,
                timeout_ms: opts.timeout_ms,
            })
        }
    }

    /// Assert the input's trimmed value equals `expected`
    pub async fn expect_value(
        &self,
        handle: &dyn ElementHandle,
        expected: &str,
        timeout_ms: Option<u64>,
    ) -> ProbeResult<()> {
        let opts = self.config.wait_options(timeout_ms);
        let outcome = poll_until(&opts, move || async move {
            let value = handle.input_value().await?.unwrap_or_default();
            Ok((value.trim() == expected, value.trim().to_string()))
        })
        .await?;

        if outcome.satisfied {
            Ok(())
        } else {
            Err(ProbeError::ValueMismatch {
                handle: describe(handle),
                expected: expected.to_string(),
                actual: outcome.last,
                timeout_ms: opts.timeout_ms,
            })
        }
    }

    /// Wait for visibility, then replace the value. `None` fills an empty string.
    pub async fn fill_when_visible(
        &self,
        handle: &dyn ElementHandle,
        value: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> ProbeResult<()> {
        self.wait_visible(handle, timeout_ms).await?;
        let text = value.unwrap_or("");
        handle.fill(text).await?;
        tracing::debug!(handle = handle.name(), "filled '{text}'");
        Ok(())
    }

    /// Wait for visibility, then click
    pub async fn click_when_visible(&self, handle: &dyn ElementHandle, timeout_ms: Option<u64>) -> ProbeResult<()> {
        self.wait_visible(handle, timeout_ms).await?;
        handle.click().await?;
        tracing::debug!(handle = handle.name(), "clicked");
        Ok(())
    }

    /// Current text content without waiting
    pub async fn get_text(&self, handle: &dyn ElementHandle) -> ProbeResult<String> {
        let snap = handle.snapshot().await?;
        if !snap.found {
            return Err(ProbeError::ElementNotFound {
                handle: describe(handle),
            });
        }
        Ok(snap.text.unwrap_or_default())
    }

    /// Current text content, trimmed
    pub async fn trim_text(&self, handle: &dyn ElementHandle) -> ProbeResult<String> {
        Ok(self.get_text(handle).await?.trim().to_string())
    }

    /// Navigate to `path` relative to the base location
    pub async fn navigate(&self, path: &str, wait_until: LoadState) -> ProbeResult<()> {
        let url = self.config.resolve_url(path);
        self.session
            .goto(&url, wait_until, Duration::from_millis(self.config.default_timeout_ms))
            .await?;
        tracing::info!("URL launched: {url}");
        Ok(())
    }

    /// Assert the document title matches
    pub async fn expect_title(
        &self,
        expected: impl Into<TextMatcher> + Send,
        timeout_ms: Option<u64>,
    ) -> ProbeResult<()> {
        let matcher = expected.into();
        let opts = self.config.wait_options(timeout_ms);
        let session = self.session.as_ref();
        let m = &matcher;
        let outcome = poll_until(&opts, move || async move {
            let title = session.title().await?;
            Ok((m.matches(&title), title))
        })
        .await?;

        if outcome.satisfied {
            Ok(())
        } else {
            Err(ProbeError::TextMismatch {
                handle: "page title".to_string(),
                expected: matcher.to_string(),
                actual: outcome.last,
                timeout_ms: opts.timeout_ms,
            })
        }
    }

    /// Advance focus with the Tab key
    pub async fn press_tab(&self) -> ProbeResult<()> {
        self.session.press_key("Tab").await
    }

    /// Scroll an element into view. Failures are logged, not raised.
    pub async fn scroll_into_view(&self, handle: &dyn ElementHandle) {
        if let Err(e) = handle.scroll_into_view().await {
            tracing::warn!(handle = handle.name(), "scroll into view failed: {e}");
        }
    }

    /// Scroll the document to the top. Failures are logged, not raised.
    pub async fn scroll_to_top(&self) {
        if let Err(e) = self.session.scroll_page(PageEdge::Top).await {
            tracing::warn!("scroll to top failed: {e}");
        }
    }

    /// Scroll the document to the bottom. Failures are logged, not raised.
    pub async fn scroll_to_bottom(&self) {
        if let Err(e) = self.session.scroll_page(PageEdge::Bottom).await {
            tracing::warn!("scroll to bottom failed: {e}");
        }
    }

    /// Wait until the current location matches `pattern`
    pub async fn wait_for_url(&self, pattern: &UrlPattern, timeout_ms: Option<u64>) -> ProbeResult<()> {
        let opts = self.config.wait_options(timeout_ms);
        let session = self.session.as_ref();
        let outcome = poll_until(&opts, move || async move {
            let url = session.current_url().await?;
            Ok((pattern.matches(&url), url))
        })
        .await?;

        if outcome.satisfied {
            tracing::debug!("URL matched {pattern}: {}", outcome.last);
            Ok(())
        } else {
            Err(ProbeError::NavigationTimeout {
                pattern: pattern.to_string(),
                url: outcome.last,
                timeout_ms: opts.timeout_ms,
            })
        }
    }
}

fn into_assertion(err: ProbeError) -> ProbeError {
    match err {
        ProbeError::WaitTimeout {
            handle,
            state,
            timeout_ms,
        } => ProbeError::assertion(format!(
            "expected {handle} to be {state} within {timeout_ms}ms"
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAction, MockElement, MockPage, MockSession, MockSite};
    use regex::Regex;

    const ORIGIN: &str = "https://mock.test";

    fn site() -> MockSite {
        MockSite::new(ORIGIN)
            .page(
                "/",
                MockPage::new("Demo Title")
                    .with("heading", MockElement::text("  Welcome\n to   the site "))
                    .with("late", MockElement::text("Late").revealed_after(3))
                    .with("ghost", MockElement::hidden("Boo"))
                    .with("name", MockElement::input("  preset  "))
                    .with(
                        "go",
                        MockElement::text("Go").on_click(MockAction::Navigate("/reservation/1".into())),
                    ),
            )
            .page("/reservation/1", MockPage::new("Room"))
    }

    async fn page() -> (BasePage, MockSession) {
        let session = MockSession::new(site());
        let cfg = SuiteConfig::new("QA", ORIGIN)
            .with_default_timeout(300)
            .with_poll_interval(5);
        let base = BasePage::new(Arc::new(session.clone()), Arc::new(cfg));
        base.navigate("/", LoadState::default()).await.unwrap();
        (base, session)
    }

    fn table() -> Vec<(&'static str, Selector)> {
        vec![
            ("heading", Selector::xpath("//h1")),
            ("late", Selector::css("#late")),
            ("ghost", Selector::css("#ghost")),
            ("name", Selector::css("#name")),
            ("go", Selector::text("Go")),
            ("absent", Selector::css("#absent")),
        ]
    }

    mod locator_map_tests {
        use super::*;

        #[tokio::test]
        async fn test_bind_and_lookup() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            assert_eq!(map.len(), 6);
            assert_eq!(map.get("go").unwrap().name(), "go");
            assert!(matches!(
                map.get("nope"),
                Err(ProbeError::ElementNotFound { .. })
            ));
            assert_eq!(map.names()[0], "absent");
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible_after_several_polls() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.wait_visible(map.get("late").unwrap(), None).await.unwrap();
        }

        #[tokio::test]
        async fn test_never_visible_times_out() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            let err = base
                .wait_visible(map.get("ghost").unwrap(), Some(30))
                .await
                .unwrap_err();
            match err {
                ProbeError::WaitTimeout {
                    handle,
                    state,
                    timeout_ms,
                } => {
                    assert!(handle.starts_with("ghost"));
                    assert_eq!(state, "visible");
                    assert_eq!(timeout_ms, 30);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_hidden_and_absent_count_as_hidden() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.wait_hidden(map.get("ghost").unwrap(), None).await.unwrap();
            base.expect_hidden(map.get("absent").unwrap(), None).await.unwrap();
        }

        #[tokio::test]
        async fn test_expect_visible_failure_is_assertion() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            let err = base
                .expect_visible(map.get("absent").unwrap(), Some(20))
                .await
                .unwrap_err();
            assert!(err.is_assertion());
        }
    }

    mod text_tests {
        use super::*;

        #[tokio::test]
        async fn test_expect_text_normalizes_whitespace() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.expect_text(map.get("heading").unwrap(), "Welcome to the site", None)
                .await
                .unwrap();
            base.expect_text(
                map.get("heading").unwrap(),
                Regex::new("(?i)welcome").unwrap(),
                None,
            )
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_expect_text_reports_last_observed() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            let err = base
                .expect_text(map.get("go").unwrap(), "Stop", Some(20))
                .await
                .unwrap_err();
            match err {
                ProbeError::TextMismatch { actual, expected, .. } => {
                    assert_eq!(actual, "Go");
                    assert_eq!(expected, "'Stop'");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_get_text_and_trim() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            assert_eq!(base.trim_text(map.get("go").unwrap()).await.unwrap(), "Go");
            assert!(matches!(
                base.get_text(map.get("absent").unwrap()).await,
                Err(ProbeError::ElementNotFound { .. })
            ));
        }

        #[tokio::test]
        async fn test_expect_value_trims() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.expect_value(map.get("name").unwrap(), "preset", None)
                .await
                .unwrap();
            let err = base
                .expect_value(map.get("name").unwrap(), "other", Some(20))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ValueMismatch { .. }));
        }

        #[tokio::test]
        async fn test_expect_title() {
            let (base, _) = page().await;
            base.expect_title("Demo Title", None).await.unwrap();
            assert!(base.expect_title("Other", Some(20)).await.unwrap_err().is_assertion());
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_none_clears() {
            let (base, session) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.fill_when_visible(map.get("name").unwrap(), None, None)
                .await
                .unwrap();
            assert_eq!(session.value_of("name").as_deref(), Some(""));
            base.fill_when_visible(map.get("name").unwrap(), Some("Jane"), None)
                .await
                .unwrap();
            assert_eq!(session.value_of("name").as_deref(), Some("Jane"));
        }

        #[tokio::test]
        async fn test_click_then_wait_for_url() {
            let (base, _) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.click_when_visible(map.get("go").unwrap(), None)
                .await
                .unwrap();
            base.wait_for_url(&UrlPattern::fragment("/reservation/"), None)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_url_timeout() {
            let (base, _) = page().await;
            let err = base
                .wait_for_url(&UrlPattern::fragment("/reservation/"), Some(20))
                .await
                .unwrap_err();
            match err {
                ProbeError::NavigationTimeout { url, .. } => assert_eq!(url, "https://mock.test/"),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_navigate_records_load_state() {
            let (base, session) = page().await;
            base.navigate("reservation/1", LoadState::Load).await.unwrap();
            assert!(session.was_called("goto https://mock.test/reservation/1 (load)"));
        }

        #[tokio::test]
        async fn test_scrolls_are_best_effort() {
            let (base, session) = page().await;
            let map = LocatorMap::bind(base.session(), table());
            base.scroll_into_view(map.get("absent").unwrap()).await;
            base.scroll_to_top().await;
            base.scroll_to_bottom().await;
            assert!(session.was_called("scroll Top"));
            assert!(session.was_called("scroll Bottom"));
        }
    }
}
