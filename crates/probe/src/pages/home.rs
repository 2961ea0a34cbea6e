//! Home page: hero, booking widget, room cards, header and footer.

use crate::config::SuiteConfig;
use crate::date_token::{resolve_now, DateToken};
use crate::driver::{BrowserSession, ElementHandle};
use crate::fixture::{require, HomeRow, HOME_SHEET};
use crate::locator::{Selector, TextMatcher};
use crate::page_object::{BasePage, LocatorMap, PageObject};
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::sync::Arc;

const ROOM_CARD: &str = "//*[@id=\"rooms\"]/div/div[2]/div";
const NAV_ITEM: &str = "//*[@id='navbarNav']/ul/li";
const FOOTER_COLUMN: &str = "//*[@id='root-container']/div/footer/div/div[1]/div";

fn booking_input(column: u8) -> Selector {
    Selector::xpath(format!(
        "//*[@id='booking']/div/div/div/form/div/div[{column}]/div/div/input"
    ))
}

fn room_book_now(card: u8) -> Selector {
    Selector::xpath(format!("{ROOM_CARD}[{card}]/div/div[3]/a"))
}

fn nav_link(item: u8) -> Selector {
    Selector::xpath(format!("{NAV_ITEM}[{item}]/a"))
}

/// Locator table of the home page
#[must_use]
pub fn locators() -> Vec<(&'static str, Selector)> {
    vec![
        (
            "welcome_h1",
            Selector::xpath("//*[@id=\"root-container\"]/div/section[1]/div/div/div/h1"),
        ),
        ("check_in", booking_input(1)),
        ("check_out", booking_input(2)),
        ("btn_book_now", Selector::text("Book Now")),
        ("btn_check_availability", Selector::text("Check Availability")),
        ("btn_room_book_now", room_book_now(1)),
        ("btn_single_book_now", room_book_now(1)),
        ("btn_double_book_now", room_book_now(2)),
        ("btn_suite_book_now", room_book_now(3)),
        ("btn_form_submit", Selector::role("button", "Submit")),
        (
            "header_main_brand",
            Selector::xpath("//*[@id='root-container']/div/nav/div/a/span"),
        ),
        ("header_rooms", nav_link(1)),
        ("header_booking", nav_link(2)),
        ("header_amenities", nav_link(3)),
        ("header_location", nav_link(4)),
        ("header_contact", nav_link(5)),
        ("header_admin", nav_link(6)),
        (
            "footer_brand",
            Selector::AnyXPath(vec![
                format!("{FOOTER_COLUMN}[1]/div/h5"),
                format!("{FOOTER_COLUMN}[1]/h5"),
            ]),
        ),
        ("footer_contact", Selector::xpath(format!("{FOOTER_COLUMN}[2]/h5"))),
        ("footer_links", Selector::xpath(format!("{FOOTER_COLUMN}[3]/h5"))),
    ]
}

/// Call-to-action buttons whose label the smoke run checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeButton {
    /// Hero "Book Now"
    BookNow,
    /// Booking widget "Check Availability"
    CheckAvailability,
    /// First room card
    SingleBookNow,
    /// Second room card
    DoubleBookNow,
    /// Third room card
    SuiteBookNow,
    /// Contact form "Submit"
    FormSubmit,
}

impl HomeButton {
    /// Every button, in smoke order
    pub const ALL: [Self; 6] = [
        Self::BookNow,
        Self::CheckAvailability,
        Self::SingleBookNow,
        Self::DoubleBookNow,
        Self::SuiteBookNow,
        Self::FormSubmit,
    ];

    /// Locator name
    #[must_use]
    pub const fn handle(&self) -> &'static str {
        match self {
            Self::BookNow => "btn_book_now",
            Self::CheckAvailability => "btn_check_availability",
            Self::SingleBookNow => "btn_single_book_now",
            Self::DoubleBookNow => "btn_double_book_now",
            Self::SuiteBookNow => "btn_suite_book_now",
            Self::FormSubmit => "btn_form_submit",
        }
    }

    /// Expected-label column in the `HomePage` sheet
    #[must_use]
    pub const fn column(&self) -> &'static str {
        self.handle()
    }

    /// Expected label from a row
    #[must_use]
    pub fn expected(self, row: &HomeRow) -> Option<&str> {
        match self {
            Self::BookNow => row.btn_book_now.as_deref(),
            Self::CheckAvailability => row.btn_check_availability.as_deref(),
            Self::SingleBookNow => row.btn_single_book_now.as_deref(),
            Self::DoubleBookNow => row.btn_double_book_now.as_deref(),
            Self::SuiteBookNow => row.btn_suite_book_now.as_deref(),
            Self::FormSubmit => row.btn_form_submit.as_deref(),
        }
    }

    // Lower room cards render in view once the first one is scrolled to.
    const fn scrolls_first(self) -> bool {
        !matches!(self, Self::BookNow | Self::DoubleBookNow | Self::SuiteBookNow)
    }
}

impl fmt::Display for HomeButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BookNow => "Book Now",
            Self::CheckAvailability => "Check Availability",
            Self::SingleBookNow => "Single Room Book Now",
            Self::DoubleBookNow => "Double Room Book Now",
            Self::SuiteBookNow => "Suite Book Now",
            Self::FormSubmit => "Form Submit",
        };
        f.write_str(label)
    }
}

/// Expected header labels
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct HeaderExpectations {
    pub header_main: String,
    pub rooms: String,
    pub booking: String,
    pub amenities: String,
    pub location: String,
    pub contact: String,
    pub admin: String,
}

impl HeaderExpectations {
    /// Every column must be present
    pub fn from_row(row: &HomeRow) -> ProbeResult<Self> {
        let col = |value: &Option<String>, field: &str| {
            require(value.as_deref(), HOME_SHEET, field).map(str::to_string)
        };
        Ok(Self {
            header_main: col(&row.header_main, "header_main")?,
            rooms: col(&row.rooms, "rooms")?,
            booking: col(&row.booking, "booking")?,
            amenities: col(&row.amenities, "amenities")?,
            location: col(&row.location, "location")?,
            contact: col(&row.contact, "contact")?,
            admin: col(&row.admin, "admin")?,
        })
    }

    fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("header_main_brand", self.header_main.as_str()),
            ("header_rooms", self.rooms.as_str()),
            ("header_booking", self.booking.as_str()),
            ("header_amenities", self.amenities.as_str()),
            ("header_location", self.location.as_str()),
            ("header_contact", self.contact.as_str()),
            ("header_admin", self.admin.as_str()),
        ]
    }
}

/// Expected footer headings
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct FooterExpectations {
    pub footer_brand: String,
    pub contact_us: String,
    pub quick_links: String,
}

impl FooterExpectations {
    /// Every column must be present
    pub fn from_row(row: &HomeRow) -> ProbeResult<Self> {
        let col = |value: &Option<String>, field: &str| {
            require(value.as_deref(), HOME_SHEET, field).map(str::to_string)
        };
        Ok(Self {
            footer_brand: col(&row.footer_brand, "footer_brand")?,
            contact_us: col(&row.contact_us, "contact_us")?,
            quick_links: col(&row.quick_links, "quick_links")?,
        })
    }

    fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("footer_brand", self.footer_brand.as_str()),
            ("footer_contact", self.contact_us.as_str()),
            ("footer_links", self.quick_links.as_str()),
        ]
    }
}

/// The landing page
#[derive(Debug)]
pub struct HomePage {
    base: BasePage,
    locators: LocatorMap,
}

impl PageObject for HomePage {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn page_name(&self) -> &str {
        "home"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl HomePage {
    /// Bind the home page locators to a session
    #[must_use]
    pub fn new(session: Arc<dyn BrowserSession>, config: Arc<SuiteConfig>) -> Self {
        let locators = LocatorMap::bind(session.as_ref(), locators());
        Self {
            base: BasePage::new(session, config),
            locators,
        }
    }

    fn el(&self, name: &str) -> ProbeResult<&dyn ElementHandle> {
        self.locators.get(name)
    }

    /// Check-in input holds the UI rendering of `token`
    pub async fn verify_default_checkin_date(&self, token: DateToken) -> ProbeResult<()> {
        self.base
            .scroll_into_view(self.el("btn_check_availability")?)
            .await;
        let expected = resolve_now(token).ui();
        self.base
            .expect_value(self.el("check_in")?, &expected, None)
            .await?;
        tracing::info!("Default check-in is {expected} ({token})");
        Ok(())
    }

    /// Check-out input holds the UI rendering of `token`
    pub async fn verify_default_checkout_date(&self, token: DateToken) -> ProbeResult<()> {
        let expected = resolve_now(token).ui();
        self.base
            .expect_value(self.el("check_out")?, &expected, None)
            .await?;
        tracing::info!("Default check-out is {expected} ({token})");
        Ok(())
    }

    /// All header links visible, then each label exact
    pub async fn verify_header_section_texts(&self, expected: &HeaderExpectations) -> ProbeResult<()> {
        let pairs = expected.pairs();
        for (name, _) in &pairs {
            self.base.expect_visible(self.el(name)?, None).await?;
        }
        for (name, text) in pairs {
            self.base.expect_text(self.el(name)?, text, None).await?;
        }
        Ok(())
    }

    /// All footer headings visible, then each label exact
    pub async fn verify_footer_section_texts(&self, expected: &FooterExpectations) -> ProbeResult<()> {
        self.base.scroll_into_view(self.el("footer_brand")?).await;
        let pairs = expected.pairs();
        for (name, _) in &pairs {
            self.base.expect_visible(self.el(name)?, None).await?;
        }
        for (name, text) in pairs {
            self.base.expect_text(self.el(name)?, text, None).await?;
        }
        Ok(())
    }

    /// Type both dates, tabbing out of each field so the date picker commits
    pub async fn set_dates(&self, check_in: &str, check_out: &str) -> ProbeResult<()> {
        self.base
            .fill_when_visible(self.el("check_in")?, Some(check_in), None)
            .await?;
        self.base.press_tab().await?;
        self.base
            .fill_when_visible(self.el("check_out")?, Some(check_out), None)
            .await?;
        self.base.press_tab().await
    }

    /// Submit the availability search
    pub async fn check_availability(&self) -> ProbeResult<()> {
        self.base
            .click_when_visible(self.el("btn_check_availability")?, None)
            .await
    }

    /// Book the first room listed by the search
    pub async fn room_book_now_check_availability(&self) -> ProbeResult<()> {
        self.base
            .click_when_visible(self.el("btn_room_book_now")?, None)
            .await
    }

    /// Hero heading is visible; used as the page-loaded check
    pub async fn expect_welcome_visible(&self) -> ProbeResult<()> {
        self.base.expect_visible(self.el("welcome_h1")?, None).await
    }

    /// Document title equals `expected`
    pub async fn verify_title(&self, expected: &str) -> ProbeResult<()> {
        self.base.expect_title(expected, None).await
    }

    /// Hero heading text equals `expected`
    pub async fn verify_welcome_text(&self, expected: &str) -> ProbeResult<()> {
        let actual = self.base.get_text(self.el("welcome_h1")?).await?;
        exact(&actual, expected, "Welcome text mismatch")
    }

    /// Button is visible and its label equals `expected`
    pub async fn verify_button_text(&self, button: HomeButton, expected: &str) -> ProbeResult<()> {
        let handle = self.el(button.handle())?;
        self.base.expect_visible(handle, None).await?;
        if button.scrolls_first() {
            self.base.scroll_into_view(handle).await;
        }
        let actual = self.base.get_text(handle).await?;
        exact(&actual, expected, &format!("Error at {button} button"))
    }
}

fn exact(actual: &str, expected: &str, label: &str) -> ProbeResult<()> {
    if TextMatcher::exact(expected).matches(actual) {
        Ok(())
    } else {
        Err(ProbeError::assertion(format!(
            "{label}: expected '{expected}', got '{}'",
            actual.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_token::resolve_now;
    use crate::fixture::ScenarioRow;
    use crate::mock::{MockElement, MockPage, MockSession, MockSite};
    use crate::wait::LoadState;

    const ORIGIN: &str = "https://mock.test";

    fn home_page() -> MockPage {
        let today = resolve_now(DateToken::Today).ui();
        let tomorrow = resolve_now(DateToken::Tomorrow).ui();
        MockPage::new("Restful-booker-platform demo")
            .with("welcome_h1", MockElement::text("Welcome to Shady Meadows B&B"))
            .with("check_in", MockElement::input(today))
            .with("check_out", MockElement::input(format!(" {tomorrow} ")))
            .with("btn_book_now", MockElement::text("Book Now"))
            .with("btn_check_availability", MockElement::text("Check Availability"))
            .with("btn_single_book_now", MockElement::text("Book now"))
            .with("btn_double_book_now", MockElement::text("Book now"))
            .with("btn_suite_book_now", MockElement::text("Book now").revealed_after(2))
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
            .with("footer_links", MockElement::text("Quick Links"))
    }

    async fn home() -> (HomePage, MockSession) {
        let session = MockSession::new(MockSite::new(ORIGIN).page("/", home_page()));
        let cfg = Arc::new(
            SuiteConfig::new("QA", ORIGIN)
                .with_default_timeout(200)
                .with_poll_interval(5),
        );
        let page = HomePage::new(Arc::new(session.clone()), cfg);
        page.base().navigate("/", LoadState::default()).await.unwrap();
        (page, session)
    }

    fn header_row() -> HomeRow {
        HomeRow::from_row(&ScenarioRow::from_pairs([
            ("header_main", "Shady Meadows B&B"),
            ("rooms", "Rooms"),
            ("booking", "Booking"),
            ("amenities", "Amenities"),
            ("location", "Location"),
            ("contact", "Contact"),
            ("admin", "Admin"),
            ("footer_brand", "Shady Meadows B&B"),
            ("contact_us", "Contact Us"),
            ("quick_links", "Quick Links"),
        ]))
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_table_is_complete_and_unique() {
            let table = locators();
            assert_eq!(table.len(), 20);
            let mut names: Vec<_> = table.iter().map(|(n, _)| *n).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), 20);
        }

        #[test]
        fn test_room_selectors() {
            let table = locators();
            let find = |name: &str| table.iter().find(|(n, _)| *n == name).map(|(_, s)| s.clone());
            assert_eq!(find("btn_room_book_now"), find("btn_single_book_now"));
            assert_eq!(
                find("btn_suite_book_now").unwrap().to_string(),
                "xpath=//*[@id=\"rooms\"]/div/div[2]/div[3]/div/div[3]/a"
            );
            assert_eq!(
                find("check_out").unwrap().to_string(),
                "xpath=//*[@id='booking']/div/div/div/form/div/div[2]/div/div/input"
            );
        }
    }

    mod expectation_tests {
        use super::*;

        #[test]
        fn test_missing_header_column_fails_loud() {
            let mut row = header_row();
            row.admin = None;
            let err = HeaderExpectations::from_row(&row).unwrap_err();
            assert!(matches!(err, ProbeError::MissingField { ref field, .. } if field == "admin"));
        }

        #[test]
        fn test_footer_from_row() {
            let footer = FooterExpectations::from_row(&header_row()).unwrap();
            assert_eq!(footer.quick_links, "Quick Links");
        }
    }

    mod verb_tests {
        use super::*;

        #[tokio::test]
        async fn test_default_dates() {
            let (page, _) = home().await;
            page.verify_default_checkin_date(DateToken::Today).await.unwrap();
            page.verify_default_checkout_date(DateToken::Tomorrow).await.unwrap();
            let err = page
                .verify_default_checkout_date(DateToken::PlusDays(5))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ValueMismatch { .. }));
        }

        #[tokio::test]
        async fn test_header_verification_is_idempotent() {
            let (page, session) = home().await;
            let header = HeaderExpectations::from_row(&header_row()).unwrap();
            page.verify_header_section_texts(&header).await.unwrap();
            let before = session.history();
            page.verify_header_section_texts(&header).await.unwrap();
            assert_eq!(session.history(), before);
        }

        #[tokio::test]
        async fn test_header_text_mismatch() {
            let (page, _) = home().await;
            let mut header = HeaderExpectations::from_row(&header_row()).unwrap();
            header.rooms = "Suites".to_string();
            let err = page.verify_header_section_texts(&header).await.unwrap_err();
            assert!(matches!(err, ProbeError::TextMismatch { ref actual, .. } if actual == "Rooms"));
        }

        #[tokio::test]
        async fn test_footer_verification() {
            let (page, session) = home().await;
            let footer = FooterExpectations::from_row(&header_row()).unwrap();
            page.verify_footer_section_texts(&footer).await.unwrap();
            assert!(session.was_called("scroll footer_brand"));
        }

        #[tokio::test]
        async fn test_set_dates_fills_then_tabs() {
            let (page, session) = home().await;
            page.set_dates("01/02/2031", "03/02/2031").await.unwrap();
            let tail: Vec<_> = session.history().into_iter().rev().take(4).collect();
            assert_eq!(
                tail,
                vec![
                    "press Tab".to_string(),
                    "fill check_out=03/02/2031".to_string(),
                    "press Tab".to_string(),
                    "fill check_in=01/02/2031".to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_button_texts() {
            let (page, session) = home().await;
            page.verify_button_text(HomeButton::BookNow, "Book Now").await.unwrap();
            page.verify_button_text(HomeButton::SuiteBookNow, "Book now").await.unwrap();
            page.verify_button_text(HomeButton::FormSubmit, "Submit").await.unwrap();
            assert!(session.was_called("scroll btn_form_submit"));
            assert!(!session.was_called("scroll btn_suite_book_now"));

            let err = page
                .verify_button_text(HomeButton::CheckAvailability, "Check")
                .await
                .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("Error at Check Availability button"));
        }

        #[tokio::test]
        async fn test_title_and_welcome() {
            let (page, _) = home().await;
            page.expect_welcome_visible().await.unwrap();
            page.verify_title("Restful-booker-platform demo").await.unwrap();
            page.verify_welcome_text("Welcome to Shady Meadows B&B").await.unwrap();
            assert!(page.verify_welcome_text("Welcome").await.is_err());
        }

        #[test]
        fn test_button_columns() {
            let row = HomeRow {
                btn_form_submit: Some("Submit".into()),
                ..HomeRow::default()
            };
            assert_eq!(HomeButton::FormSubmit.expected(&row), Some("Submit"));
            assert_eq!(HomeButton::BookNow.expected(&row), None);
            assert_eq!(HomeButton::ALL.len(), 6);
            assert_eq!(HomeButton::DoubleBookNow.column(), "btn_double_book_now");
        }
    }
}
