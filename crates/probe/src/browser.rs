//! Browser session parameters and the Chrome `DevTools` Protocol adapter.
//!
//! [`BrowserOptions`] is always available. With the `browser` feature the
//! [`CdpSessionFactory`] launches Chromium through chromiumoxide and hands out
//! one browser per session, so scenarios never share cookies or storage.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Browser engine a project runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Chromium / Chrome
    #[default]
    Chromium,
    /// Firefox (not drivable over CDP)
    Firefox,
}

impl BrowserEngine {
    /// Project label used in result lines
    #[must_use]
    pub const fn project(&self) -> &'static str {
        match self {
            Self::Chromium => "Chromium",
            Self::Firefox => "Firefox",
        }
    }
}

impl fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.project())
    }
}

impl FromStr for BrowserEngine {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            other => Err(ProbeError::config(format!("unknown browser engine '{other}'"))),
        }
    }
}

/// When to capture a screenshot of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capture {
    /// Never capture
    Never,
    /// Capture when a scenario fails or times out
    #[default]
    OnFailure,
}

/// Browser session parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Engine to launch
    pub engine: BrowserEngine,
    /// Run without a visible window
    pub headless: bool,
    /// Fixed viewport; `None` keeps the native window size
    pub viewport: Option<(u32, u32)>,
    /// Launch with `--start-maximized`
    pub start_maximized: bool,
    /// Path to the browser binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Screenshot policy
    pub capture: Capture,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: false,
            viewport: None,
            start_maximized: true,
            chromium_path: None,
            sandbox: true,
            capture: Capture::OnFailure,
        }
    }
}

impl BrowserOptions {
    /// Set engine
    #[must_use]
    pub const fn with_engine(mut self, engine: BrowserEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Use a fixed viewport
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set screenshot policy
    #[must_use]
    pub const fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Reject combinations the CDP adapter cannot honor
    pub fn validate(&self) -> ProbeResult<()> {
        if self.engine != BrowserEngine::Chromium {
            return Err(ProbeError::config(format!(
                "{} is not supported; only Chromium can be driven over CDP",
                self.engine
            )));
        }
        if matches!(self.viewport, Some((0, _) | (_, 0))) {
            return Err(ProbeError::config("viewport dimensions must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::{BrowserOptions, ProbeError, ProbeResult};
    use crate::driver::{BrowserSession, ElementHandle, ElementSnapshot, PageEdge, SessionFactory};
    use crate::locator::Selector;
    use crate::wait::{poll_until, LoadState, WaitOptions};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    fn session_err(e: impl std::fmt::Display) -> ProbeError {
        ProbeError::session(e.to_string())
    }

    async fn eval<T: DeserializeOwned>(page: &CdpPage, expr: String) -> ProbeResult<T> {
        page.evaluate(expr)
            .await
            .map_err(session_err)?
            .into_value()
            .map_err(session_err)
    }

    fn js_str(s: &str) -> String {
        serde_json::Value::from(s).to_string()
    }

    /// Launches one Chromium per session
    #[derive(Debug)]
    pub struct CdpSessionFactory {
        options: BrowserOptions,
    }

    impl CdpSessionFactory {
        /// Validate options and build the factory. Nothing launches yet.
        pub fn new(options: BrowserOptions) -> ProbeResult<Self> {
            options.validate()?;
            Ok(Self { options })
        }

        fn cdp_config(&self) -> ProbeResult<CdpConfig> {
            let opts = &self.options;
            let mut builder = CdpConfig::builder();

            if !opts.headless {
                builder = builder.with_head();
            }
            if !opts.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = opts.chromium_path {
                builder = builder.chrome_executable(path);
            }
            if opts.start_maximized {
                builder = builder.arg("--start-maximized");
            }
            builder = match opts.viewport {
                Some((width, height)) => builder.window_size(width, height).viewport(Viewport {
                    width,
                    height,
                    ..Viewport::default()
                }),
                None => builder.viewport(None),
            };

            builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })
        }
    }

    #[async_trait]
    impl SessionFactory for CdpSessionFactory {
        fn project(&self) -> &str {
            self.options.engine.project()
        }

        async fn open(&self) -> ProbeResult<Arc<dyn BrowserSession>> {
            let (browser, mut handler) = CdpBrowser::launch(self.cdp_config()?)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            let handler_task = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    handler_task.abort();
                    return Err(ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    });
                }
            };
            tracing::debug!("chromium session opened");

            Ok(Arc::new(CdpSession {
                page,
                browser: Mutex::new(Some(browser)),
                handler: Mutex::new(Some(handler_task)),
            }))
        }
    }

    /// One browser with one page
    #[derive(Debug)]
    pub struct CdpSession {
        page: CdpPage,
        browser: Mutex<Option<CdpBrowser>>,
        handler: Mutex<Option<JoinHandle<()>>>,
    }

    impl CdpSession {
        async fn ready_state(&self) -> ProbeResult<String> {
            eval(&self.page, "document.readyState".to_string()).await
        }
    }

    #[async_trait]
    impl BrowserSession for CdpSession {
        fn locate(&self, name: &str, selector: &Selector) -> Arc<dyn ElementHandle> {
            Arc::new(CdpElement {
                name: name.to_string(),
                selector: selector.clone(),
                page: self.page.clone(),
            })
        }

        async fn goto(&self, url: &str, wait_until: LoadState, timeout: Duration) -> ProbeResult<()> {
            let nav_err = |message: String| ProbeError::NavigationError {
                url: url.to_string(),
                message,
            };

            tokio::time::timeout(timeout, self.page.goto(url))
                .await
                .map_err(|_| nav_err(format!("no response within {}ms", timeout.as_millis())))?
                .map_err(|e| nav_err(e.to_string()))?;

            let opts = WaitOptions::new().with_timeout(timeout.as_millis() as u64);
            let outcome = poll_until(&opts, move || async move {
                let state = self.ready_state().await?;
                Ok((wait_until.ready_states().contains(&state.as_str()), state))
            })
            .await?;
            if outcome.satisfied {
                Ok(())
            } else {
                Err(nav_err(format!(
                    "document stuck in readyState '{}' waiting for {wait_until}",
                    outcome.last
                )))
            }
        }

        async fn current_url(&self) -> ProbeResult<String> {
            eval(&self.page, "location.href".to_string()).await
        }

        async fn title(&self) -> ProbeResult<String> {
            eval(&self.page, "document.title".to_string()).await
        }

        async fn press_key(&self, key: &str) -> ProbeResult<()> {
            let code = match key {
                "Tab" => 9,
                "Enter" => 13,
                "Escape" => 27,
                _ => 0,
            };
            for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
                let params = DispatchKeyEventParams::builder()
                    .r#type(kind)
                    .key(key)
                    .code(key)
                    .windows_virtual_key_code(code)
                    .native_virtual_key_code(code)
                    .build()
                    .map_err(ProbeError::session)?;
                let _ = self.page.execute(params).await.map_err(session_err)?;
            }
            Ok(())
        }

        async fn scroll_page(&self, edge: PageEdge) -> ProbeResult<()> {
            let expr = match edge {
                PageEdge::Top => "window.scrollTo(0, 0); true",
                PageEdge::Bottom => "window.scrollTo(0, document.body.scrollHeight); true",
            };
            let _: bool = eval(&self.page, expr.to_string()).await?;
            Ok(())
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = self.page.execute(params).await.map_err(session_err)?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(session_err)
        }

        async fn close(&self) -> ProbeResult<()> {
            let browser = self.browser.lock().await.take();
            let handler = self.handler.lock().await.take();

            let result = match browser {
                Some(mut browser) => {
                    let closed = browser.close().await.map(|_| ()).map_err(session_err);
                    let _ = browser.wait().await;
                    closed
                }
                None => Ok(()),
            };
            if let Some(task) = handler {
                task.abort();
            }
            tracing::debug!("chromium session closed");
            result
        }
    }

    /// Lazily resolved element on a CDP page
    #[derive(Debug)]
    struct CdpElement {
        name: String,
        selector: Selector,
        page: CdpPage,
    }

    impl CdpElement {
        /// Run `body` with `el` bound to the resolved element; `false` when absent
        async fn with_element(&self, body: &str) -> ProbeResult<()> {
            let expr = format!(
                "(() => {{ const el = {query}; if (!el) return false; {body} return true; }})()",
                query = self.selector.to_query()
            );
            if eval::<bool>(&self.page, expr).await? {
                Ok(())
            } else {
                Err(ProbeError::ElementNotFound {
                    handle: format!("{} ({})", self.name, self.selector),
                })
            }
        }
    }

    #[async_trait]
    impl ElementHandle for CdpElement {
        fn name(&self) -> &str {
            &self.name
        }

        fn selector(&self) -> &Selector {
            &self.selector
        }

        async fn snapshot(&self) -> ProbeResult<ElementSnapshot> {
            let expr = format!(
                "(() => {{ \
                   const el = {query}; \
                   if (!el) return {{ found: false, visible: false, text: null, value: null }}; \
                   const r = el.getBoundingClientRect(); \
                   const s = window.getComputedStyle(el); \
                   const visible = r.width > 0 && r.height > 0 \
                     && s.visibility !== 'hidden' && s.display !== 'none'; \
                   const value = (el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement \
                     || el instanceof HTMLSelectElement) ? el.value : null; \
                   return {{ found: true, visible, text: el.textContent, value }}; \
                 }})()",
                query = self.selector.to_query()
            );
            eval(&self.page, expr).await
        }

        async fn fill(&self, text: &str) -> ProbeResult<()> {
            let body = format!(
                "el.focus(); \
                 const proto = el instanceof HTMLTextAreaElement \
                   ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {text}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                text = js_str(text)
            );
            self.with_element(&body).await
        }

        async fn click(&self) -> ProbeResult<()> {
            self.with_element("el.scrollIntoView({ block: 'center' }); el.click();")
                .await
        }

        async fn scroll_into_view(&self) -> ProbeResult<()> {
            self.with_element("el.scrollIntoView({ block: 'center' });")
                .await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{CdpSession, CdpSessionFactory};
