//! Scripted in-memory site for exercising page objects without a browser.
//!
//! A [`MockSite`] is a set of pages keyed by path. Each page holds elements
//! keyed by the *handle name* page objects use (`welcome_h1`, `check_in`,
//! ...). Clicking an element can run [`MockAction`]s such as navigating or
//! revealing other elements, which is enough to script the booking flow.
//!
//! Every call is appended to a history log so tests can assert on the order
//! of interactions (fill, then Tab).

use crate::date_token::{resolve_now, DateToken};
use crate::driver::{BrowserSession, ElementHandle, ElementSnapshot, PageEdge, SessionFactory};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{SITE_TITLE, WELCOME_TEXT};
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Side effect of clicking a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// Switch to another page (path, optionally with a query string)
    Navigate(String),
    /// Make elements on the current page visible
    Reveal(Vec<String>),
    /// Hide elements on the current page
    Hide(Vec<String>),
    /// Replace the text of an element on the current page
    SetText(String, String),
}

/// A scripted element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Input value (`None` for non-inputs)
    pub value: Option<String>,
    /// Number of state reads that report hidden before the element shows
    pub reveal_after: u32,
    /// Effects of clicking
    pub on_click: Vec<MockAction>,
}

impl MockElement {
    /// Visible element with text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            visible: true,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Visible input with a value
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            visible: true,
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Element present in the DOM but not rendered
    #[must_use]
    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            visible: false,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Report hidden for the first `reads` state reads
    #[must_use]
    pub const fn revealed_after(mut self, reads: u32) -> Self {
        self.reveal_after = reads;
        self
    }

    /// Add a click effect
    #[must_use]
    pub fn on_click(mut self, action: MockAction) -> Self {
        self.on_click.push(action);
        self
    }
}

/// A scripted page
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    /// Document title
    pub title: String,
    /// Elements by handle name
    pub elements: HashMap<String, MockElement>,
}

impl MockPage {
    /// Create a page with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: HashMap::new(),
        }
    }

    /// Add an element
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, element: MockElement) -> Self {
        let _ = self.elements.insert(name.into(), element);
        self
    }
}

/// A set of pages plus the origin they live under
#[derive(Debug, Clone)]
pub struct MockSite {
    origin: String,
    pages: HashMap<String, MockPage>,
}

impl MockSite {
    /// Create an empty site under `origin` (e.g. `https://mock.test`)
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            pages: HashMap::new(),
        }
    }

    /// Add a page at `path`
    #[must_use]
    pub fn page(mut self, path: impl Into<String>, page: MockPage) -> Self {
        let _ = self.pages.insert(path.into(), page);
        self
    }

    /// Origin all pages are served from
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

#[derive(Debug)]
struct MockState {
    site: MockSite,
    url: String,
    page: Option<MockPage>,
    history: Vec<String>,
    closed: bool,
}

impl MockState {
    fn path_of(&self, url: &str) -> String {
        let rest = url.strip_prefix(self.site.origin.as_str()).unwrap_or(url);
        let path = rest.split(|c| c == '?' || c == '#').next().unwrap_or("");
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }

    fn navigate(&mut self, target: &str) -> ProbeResult<()> {
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.site.origin, target)
        };
        let path = self.path_of(&url);
        let page = self
            .site
            .pages
            .get(&path)
            .cloned()
            .ok_or_else(|| ProbeError::NavigationError {
                url: url.clone(),
                message: "404 Not Found".to_string(),
            })?;
        self.page = Some(page);
        self.url = url;
        Ok(())
    }

    fn element_mut(&mut self, name: &str) -> Option<&mut MockElement> {
        self.page.as_mut().and_then(|p| p.elements.get_mut(name))
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            Err(ProbeError::session("session is closed"))
        } else {
            Ok(())
        }
    }
}

/// Session over a [`MockSite`]
#[derive(Debug, Clone)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    /// Open a session on `about:blank`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                site,
                url: "about:blank".to_string(),
                page: None,
                history: Vec::new(),
                closed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All interactions so far, in order
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Whether any history entry starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|h| h.starts_with(prefix))
    }

    /// Current value of an input on the current page
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<String> {
        self.lock()
            .page
            .as_ref()
            .and_then(|p| p.elements.get(name))
            .and_then(|e| e.value.clone())
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    fn locate(&self, name: &str, selector: &Selector) -> Arc<dyn ElementHandle> {
        Arc::new(MockHandle {
            name: name.to_string(),
            selector: selector.clone(),
            state: Arc::clone(&self.state),
        })
    }

    async fn goto(&self, url: &str, wait_until: LoadState, _timeout: Duration) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.history.push(format!("goto {url} ({wait_until})"));
        state.navigate(url)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let state = self.lock();
        state.ensure_open()?;
        Ok(state.url.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        let state = self.lock();
        state.ensure_open()?;
        Ok(state.page.as_ref().map(|p| p.title.clone()).unwrap_or_default())
    }

    async fn press_key(&self, key: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.history.push(format!("press {key}"));
        Ok(())
    }

    async fn scroll_page(&self, edge: PageEdge) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.history.push(format!("scroll {edge:?}"));
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.lock().ensure_open()?;
        // PNG signature only
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.lock();
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}

#[derive(Debug)]
struct MockHandle {
    name: String,
    selector: Selector,
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(&self) -> ProbeError {
        ProbeError::ElementNotFound {
            handle: format!("{} ({})", self.name, self.selector),
        }
    }
}

#[async_trait]
impl ElementHandle for MockHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> &Selector {
        &self.selector
    }

    async fn snapshot(&self) -> ProbeResult<ElementSnapshot> {
        let mut state = self.lock();
        state.ensure_open()?;
        let Some(el) = state.element_mut(&self.name) else {
            return Ok(ElementSnapshot::missing());
        };
        let visible = if el.reveal_after > 0 {
            el.reveal_after -= 1;
            false
        } else {
            el.visible
        };
        Ok(ElementSnapshot {
            found: true,
            visible,
            text: Some(el.text.clone()),
            value: el.value.clone(),
        })
    }

    async fn fill(&self, text: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        let name = self.name.clone();
        let el = state.element_mut(&name).ok_or_else(|| self.not_found())?;
        el.value = Some(text.to_string());
        state.history.push(format!("fill {name}={text}"));
        Ok(())
    }

    async fn click(&self) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        let name = self.name.clone();
        let actions = state
            .element_mut(&name)
            .ok_or_else(|| self.not_found())?
            .on_click
            .clone();
        state.history.push(format!("click {name}"));

        for action in actions {
            match action {
                MockAction::Navigate(target) => state.navigate(&target)?,
                MockAction::Reveal(names) => {
                    for n in names {
                        if let Some(el) = state.element_mut(&n) {
                            el.visible = true;
                        }
                    }
                }
                MockAction::Hide(names) => {
                    for n in names {
                        if let Some(el) = state.element_mut(&n) {
                            el.visible = false;
                        }
                    }
                }
                MockAction::SetText(n, text) => {
                    if let Some(el) = state.element_mut(&n) {
                        el.text = text;
                    }
                }
            }
        }
        Ok(())
    }

    async fn scroll_into_view(&self) -> ProbeResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        if state.element_mut(&self.name).is_none() {
            return Err(self.not_found());
        }
        state.history.push(format!("scroll {}", self.name));
        Ok(())
    }
}

/// Factory handing out independent sessions over copies of one site
#[derive(Debug)]
pub struct MockSessionFactory {
    site: MockSite,
    opened: Mutex<Vec<MockSession>>,
    fail_opens: AtomicUsize,
}

impl MockSessionFactory {
    /// Create a factory for `site`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            opened: Mutex::new(Vec::new()),
            fail_opens: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` calls to `open` fail
    #[must_use]
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_opens.store(n, Ordering::SeqCst);
        self
    }

    /// Sessions opened so far
    #[must_use]
    pub fn sessions(&self) -> Vec<MockSession> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    fn project(&self) -> &str {
        "Mock"
    }

    async fn open(&self) -> ProbeResult<Arc<dyn BrowserSession>> {
        let remaining = self.fail_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(ProbeError::BrowserLaunch {
                message: "mock launch failure".to_string(),
            });
        }
        let session = MockSession::new(self.site.clone());
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(session.clone());
        Ok(Arc::new(session))
    }
}

/// The booking site as the suite expects to find it: home page with today and
/// tomorrow prefilled, a single room bookable from the availability search,
/// and a reservation form that confirms after a short delay.
#[must_use]
pub fn booking_site(origin: impl Into<String>) -> MockSite {
    let today = resolve_now(DateToken::Today).ui();
    let tomorrow = resolve_now(DateToken::Tomorrow).ui();

    let home = MockPage::new(SITE_TITLE)
        .with("welcome_h1", MockElement::text(WELCOME_TEXT))
        .with("check_in", MockElement::input(today))
        .with("check_out", MockElement::input(tomorrow))
        .with("btn_book_now", MockElement::text("Book Now"))
        .with("btn_check_availability", MockElement::text("Check Availability"))
        .with(
            "btn_room_book_now",
            MockElement::text("Book now").on_click(MockAction::Navigate("/reservation/1?checkin=&checkout=".into())),
        )
        .with("btn_single_book_now", MockElement::text("Book now"))
        .with("btn_double_book_now", MockElement::text("Book now"))
        .with("btn_suite_book_now", MockElement::text("Book now"))
        .with("btn_form_submit", MockElement::text("Submit"))
        .with("header_main_brand", MockElement::text("Shady Meadows B&B"))
        .with("header_rooms", MockElement::text("Rooms"))
        .with("header_booking", MockElement::text("Booking"))
        .with("header_amenities", MockElement::text("Amenities"))
        .with("header_location", MockElement::text("Location"))
        .with("header_contact", MockElement::text("Contact"))
        .with("header_admin", MockElement::text("Admin"))
        .with("footer_brand", MockElement::text("Shady Meadows B&B"))
        .with("footer_contact", MockElement::text("Contact Us"))
        .with("footer_links", MockElement::text("Quick Links"));

    let reservation = MockPage::new(SITE_TITLE)
        .with("room_h1", MockElement::text("Single Room"))
        .with("first_name", MockElement::input(""))
        .with("last_name", MockElement::input(""))
        .with("email", MockElement::input(""))
        .with("phone", MockElement::input(""))
        .with(
            "btn_reserve_now",
            MockElement::text("Reserve Now").on_click(MockAction::Reveal(vec!["confirmed_h2".into()])),
        )
        .with(
            "confirmed_h2",
            MockElement::hidden("Booking Confirmed").revealed_after(2),
        );

    MockSite::new(origin)
        .page("/", home)
        .page("/reservation/1", reservation)
}
