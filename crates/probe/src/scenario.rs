//! Data-driven scenarios.
//!
//! The smoke suite checks the home page against a `HomePage` row; the sanity
//! suite books a room once per `Sanity` row. Scenarios are plain step
//! sequences over [`Pages`]; the runner owns sessions, timeouts and reporting.

use crate::date_token::{to_ui_date, DateToken};
use crate::fixture::{HomeRow, SanityRow, Workbook, HOME_SHEET, SANITY_SHEET};
use crate::pages::{FooterExpectations, HeaderExpectations, HomeButton, Pages};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Document title the booking flow expects
pub const SITE_TITLE: &str = "Restful-booker-platform demo";

/// Hero heading the booking flow expects
pub const WELCOME_TEXT: &str = "Welcome to Shady Meadows B&B";

/// Title of the smoke scenario
pub const SMOKE_TITLE: &str = "Verify Core UI elements - Smoke Test";

/// Which suite a scenario belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Home page verification
    Smoke,
    /// End-to-end booking
    Sanity,
}

impl ScenarioKind {
    /// Sheet the scenario rows come from
    #[must_use]
    pub const fn sheet(&self) -> &'static str {
        match self {
            Self::Smoke => HOME_SHEET,
            Self::Sanity => SANITY_SHEET,
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smoke => write!(f, "smoke"),
            Self::Sanity => write!(f, "sanity"),
        }
    }
}

/// Suite selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Smoke only
    Smoke,
    /// Sanity only
    Sanity,
    /// Smoke, then sanity
    #[default]
    All,
}

impl Suite {
    /// Whether the suite includes `kind`
    #[must_use]
    pub const fn includes(&self, kind: ScenarioKind) -> bool {
        matches!(
            (self, kind),
            (Self::All, _) | (Self::Smoke, ScenarioKind::Smoke) | (Self::Sanity, ScenarioKind::Sanity)
        )
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smoke => write!(f, "smoke"),
            Self::Sanity => write!(f, "sanity"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for Suite {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smoke" => Ok(Self::Smoke),
            "sanity" => Ok(Self::Sanity),
            "all" => Ok(Self::All),
            other => Err(ProbeError::config(format!(
                "unknown suite '{other}' (expected smoke, sanity or all)"
            ))),
        }
    }
}

/// One runnable test case
#[async_trait]
pub trait Scenario: Send + Sync + fmt::Debug {
    /// Title used in RESULT lines and reports
    fn title(&self) -> &str;

    /// Suite the scenario belongs to
    fn kind(&self) -> ScenarioKind;

    /// Zero-based row in the source sheet
    fn row_index(&self) -> usize;

    /// Run every step against freshly bound page objects. The session is
    /// already on the home page.
    async fn run(&self, pages: &Pages) -> ProbeResult<()>;
}

/// Home page verification driven by one `HomePage` row
#[derive(Debug, Clone)]
pub struct SmokeScenario {
    row: HomeRow,
    index: usize,
    title: String,
}

impl SmokeScenario {
    /// Smoke scenario for row `index`; rows after the first get a `#n` suffix
    #[must_use]
    pub fn new(row: HomeRow, index: usize) -> Self {
        let title = if index == 0 {
            SMOKE_TITLE.to_string()
        } else {
            format!("{SMOKE_TITLE} #{}", index + 1)
        };
        Self { row, index, title }
    }

    /// The expectations row
    #[must_use]
    pub const fn row(&self) -> &HomeRow {
        &self.row
    }
}

#[async_trait]
impl Scenario for SmokeScenario {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Smoke
    }

    fn row_index(&self) -> usize {
        self.index
    }

    async fn run(&self, pages: &Pages) -> ProbeResult<()> {
        // Resolve every expectation up front so a missing column fails before
        // any interaction.
        let row = &self.row;
        let title = row.required(&row.expected_title, "expected_title")?;
        let welcome = row.required(&row.welcome_text, "welcome_text")?;
        let buttons = HomeButton::ALL
            .iter()
            .map(|b| {
                b.expected(row)
                    .map(|label| (*b, label))
                    .ok_or_else(|| ProbeError::MissingField {
                        sheet: HOME_SHEET.to_string(),
                        field: b.column().to_string(),
                    })
            })
            .collect::<ProbeResult<Vec<_>>>()?;
        let header = HeaderExpectations::from_row(row)?;
        let footer = FooterExpectations::from_row(row)?;

        let home = &pages.home;

        home.expect_welcome_visible().await?;
        tracing::info!("Landed on Home Page");

        home.verify_title(title).await?;

        home.verify_welcome_text(welcome).await?;
        tracing::info!("Welcome Text - '{welcome}' is visible");

        for (button, label) in buttons {
            home.verify_button_text(button, label).await?;
            tracing::info!("{button} - '{label}' is present");
        }
        tracing::info!("Mandatory Core UI elements validated successfully");

        home.base().scroll_to_top().await;
        home.verify_header_section_texts(&header).await?;
        tracing::info!("Header Section is visible");

        home.verify_footer_section_texts(&footer).await?;
        tracing::info!("Footer Section is visible");

        home.verify_default_checkin_date(DateToken::Today).await?;
        home.verify_default_checkout_date(DateToken::Tomorrow).await?;

        tracing::info!("Smoke Test Completed Successfully");
        Ok(())
    }
}

/// End-to-end booking driven by one `Sanity` row
#[derive(Debug, Clone)]
pub struct SanityScenario {
    row: SanityRow,
    index: usize,
    title: String,
}

impl SanityScenario {
    /// Booking scenario for row `index`
    #[must_use]
    pub fn new(row: SanityRow, index: usize) -> Self {
        let title = format!(
            "E2E Booking #{} ({} → {})",
            index + 1,
            row.check_in.as_deref().unwrap_or_default(),
            row.check_out.as_deref().unwrap_or_default()
        );
        Self { row, index, title }
    }

    /// The booking row
    #[must_use]
    pub const fn row(&self) -> &SanityRow {
        &self.row
    }
}

#[async_trait]
impl Scenario for SanityScenario {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Sanity
    }

    fn row_index(&self) -> usize {
        self.index
    }

    async fn run(&self, pages: &Pages) -> ProbeResult<()> {
        // Dates, guest columns and at least one room name are required; all
        // are checked before the first interaction.
        let row = &self.row;
        let check_in = row.required(&row.check_in, "check_in")?;
        let check_out = row.required(&row.check_out, "check_out")?;
        for (value, field) in [
            (&row.firstname, "firstname"),
            (&row.lastname, "lastname"),
            (&row.email, "email"),
            (&row.phone, "phone"),
        ] {
            row.required(value, field)?;
        }
        let rooms = row.room_candidates();
        if rooms.iter().all(|r| r.trim().is_empty()) {
            return Err(ProbeError::MissingField {
                sheet: SANITY_SHEET.to_string(),
                field: "single_room/double_room/suite_room".to_string(),
            });
        }
        let guest = row.guest();

        let home = &pages.home;
        let reservation = &pages.reservation;

        home.expect_welcome_visible().await?;
        home.verify_title(SITE_TITLE).await?;
        home.verify_welcome_text(WELCOME_TEXT).await?;

        home.verify_default_checkin_date(DateToken::Today).await?;
        home.verify_default_checkout_date(DateToken::Tomorrow).await?;

        tracing::info!("Running for checkin_date: {check_in}");
        tracing::info!("Running for checkout_date: {check_out}");

        home.set_dates(&to_ui_date(check_in), &to_ui_date(check_out))
            .await?;
        home.check_availability().await?;
        home.room_book_now_check_availability().await?;

        reservation.wait_for_reservation_url().await?;
        reservation.expect_room_header_contains(&rooms).await?;

        reservation.click_reserve_now().await?;
        reservation.fill_guest_details(&guest).await?;
        reservation.submit_reservation().await?;

        reservation.confirmation_text().await?;
        reservation.wait_for_reservation_url().await?;
        reservation.expect_confirmation_visible().await?;

        tracing::info!(
            "E2E booking flow completed successfully for {}",
            guest.full_name()
        );
        Ok(())
    }
}

/// Build the scenarios of `suite` from a workbook, smoke first. A sheet the
/// suite needs must exist; an empty sheet yields no scenarios.
pub fn build_scenarios(workbook: &Workbook, suite: Suite) -> ProbeResult<Vec<Arc<dyn Scenario>>> {
    let mut scenarios: Vec<Arc<dyn Scenario>> = Vec::new();

    if suite.includes(ScenarioKind::Smoke) {
        let rows = workbook.home_rows()?;
        if rows.is_empty() {
            tracing::warn!("Sheet \"{HOME_SHEET}\" has no rows; no smoke scenarios");
        }
        for (index, row) in rows.into_iter().enumerate() {
            scenarios.push(Arc::new(SmokeScenario::new(row, index)));
        }
    }

    if suite.includes(ScenarioKind::Sanity) {
        let rows = workbook.sanity_rows()?;
        if rows.is_empty() {
            tracing::warn!("Sheet \"{SANITY_SHEET}\" has no rows; no sanity scenarios");
        }
        for (index, row) in rows.into_iter().enumerate() {
            scenarios.push(Arc::new(SanityScenario::new(row, index)));
        }
    }

    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::driver::BrowserSession;
    use crate::mock::{booking_site, MockElement, MockPage, MockSession};
    use crate::wait::LoadState;

    const ORIGIN: &str = "https://mock.test";

    const WORKBOOK: &str = r#"
HomePage:
  - expected_title: Restful-booker-platform demo
    welcome_text: Welcome to Shady Meadows B&B
    btn_book_now: Book Now
    btn_check_availability: Check Availability
    btn_single_book_now: Book now
    btn_double_book_now: Book now
    btn_suite_book_now: Book now
    btn_form_submit: Submit
    header_main: Shady Meadows B&B
    rooms: Rooms
    booking: Booking
    amenities: Amenities
    location: Location
    contact: Contact
    admin: Admin
    footer_brand: Shady Meadows B&B
    contact_us: Contact Us
    quick_links: Quick Links
Sanity:
  - check_in: today
    check_out: plus_2
    single_room: Single
    double_room: Double
    suite_room: Suite
    firstname: Jane
    lastname: Doe
    email: jane@example.com
    phone: "07123456789"
  - check_in: tomorrow
    check_out: plus_3
    single_room: Single
    firstname: John
    lastname: Roe
    email: john@example.com
    phone: "07987654321"
"#;

    fn workbook() -> Workbook {
        Workbook::from_yaml_str(WORKBOOK).unwrap()
    }

    async fn pages_on(session: &MockSession) -> Pages {
        let cfg = Arc::new(
            SuiteConfig::new("QA", ORIGIN)
                .with_default_timeout(200)
                .with_poll_interval(5),
        );
        let session: Arc<dyn BrowserSession> = Arc::new(session.clone());
        let pages = Pages::new(&session, &cfg);
        pages.home.base().navigate("/", LoadState::default()).await.unwrap();
        pages
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_suite_parsing() {
            assert_eq!("smoke".parse::<Suite>().unwrap(), Suite::Smoke);
            assert_eq!(" Sanity ".parse::<Suite>().unwrap(), Suite::Sanity);
            assert_eq!("ALL".parse::<Suite>().unwrap(), Suite::All);
            assert!("regression".parse::<Suite>().unwrap_err().is_fatal());
        }

        #[test]
        fn test_suite_includes() {
            assert!(Suite::All.includes(ScenarioKind::Smoke));
            assert!(Suite::All.includes(ScenarioKind::Sanity));
            assert!(!Suite::Smoke.includes(ScenarioKind::Sanity));
            assert_eq!(ScenarioKind::Sanity.sheet(), "Sanity");
        }
    }

    mod build_tests {
        use super::*;

        #[test]
        fn test_build_all() {
            let scenarios = build_scenarios(&workbook(), Suite::All).unwrap();
            let titles: Vec<_> = scenarios.iter().map(|s| s.title().to_string()).collect();
            assert_eq!(
                titles,
                vec![
                    "Verify Core UI elements - Smoke Test",
                    "E2E Booking #1 (today → plus_2)",
                    "E2E Booking #2 (tomorrow → plus_3)",
                ]
            );
            assert_eq!(scenarios[2].row_index(), 1);
            assert_eq!(scenarios[0].kind(), ScenarioKind::Smoke);
        }

        #[test]
        fn test_missing_sheet_is_fatal() {
            let book = Workbook::from_yaml_str("HomePage: []\n").unwrap();
            assert!(build_scenarios(&book, Suite::Smoke).unwrap().is_empty());
            let err = build_scenarios(&book, Suite::Sanity).unwrap_err();
            assert!(err.is_fatal());
        }

        #[test]
        fn test_later_smoke_rows_are_numbered() {
            let scenario = SmokeScenario::new(HomeRow::default(), 1);
            assert_eq!(scenario.title(), "Verify Core UI elements - Smoke Test #2");
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_smoke_passes_on_booking_site() {
            let session = MockSession::new(booking_site(ORIGIN));
            let pages = pages_on(&session).await;
            let row = workbook().home_rows().unwrap().remove(0);
            SmokeScenario::new(row, 0).run(&pages).await.unwrap();
            assert!(session.was_called("scroll Top"));
        }

        #[tokio::test]
        async fn test_smoke_missing_column_fails_before_interaction() {
            let session = MockSession::new(booking_site(ORIGIN));
            let pages = pages_on(&session).await;
            let mut row = workbook().home_rows().unwrap().remove(0);
            row.quick_links = None;
            let before = session.history();
            let err = SmokeScenario::new(row, 0).run(&pages).await.unwrap_err();
            assert!(matches!(err, ProbeError::MissingField { ref field, .. } if field == "quick_links"));
            assert_eq!(session.history(), before);
        }

        #[tokio::test]
        async fn test_sanity_books_a_room() {
            let session = MockSession::new(booking_site(ORIGIN));
            let pages = pages_on(&session).await;
            let row = workbook().sanity_rows().unwrap().remove(0);
            SanityScenario::new(row, 0).run(&pages).await.unwrap();

            let history = session.history();
            let expected_in = format!("fill check_in={}", to_ui_date("today"));
            assert!(history.contains(&expected_in));
            assert!(history.contains(&"fill first_name=Jane".to_string()));
            assert_eq!(session.value_of("phone").as_deref(), Some("07123456789"));
        }

        #[tokio::test]
        async fn test_sanity_without_rooms_fails_before_interaction() {
            let session = MockSession::new(booking_site(ORIGIN));
            let pages = pages_on(&session).await;
            let row = SanityRow {
                check_in: Some("today".into()),
                check_out: Some("plus_2".into()),
                firstname: Some("Jane".into()),
                lastname: Some("Doe".into()),
                email: Some("jane@example.com".into()),
                phone: Some("07123456789".into()),
                ..SanityRow::default()
            };
            let before = session.history();
            let err = SanityScenario::new(row, 0).run(&pages).await.unwrap_err();
            assert!(
                matches!(err, ProbeError::MissingField { ref field, .. } if field == "single_room/double_room/suite_room")
            );
            assert!(!err.is_assertion());
            assert_eq!(session.history(), before);
        }

        #[tokio::test]
        async fn test_sanity_missing_date_or_guest_column_fails_before_interaction() {
            let session = MockSession::new(booking_site(ORIGIN));
            let pages = pages_on(&session).await;
            let before = session.history();

            let mut row = workbook().sanity_rows().unwrap().remove(0);
            row.check_out = None;
            let err = SanityScenario::new(row, 0).run(&pages).await.unwrap_err();
            assert!(matches!(err, ProbeError::MissingField { ref field, .. } if field == "check_out"));

            let mut row = workbook().sanity_rows().unwrap().remove(0);
            row.email = None;
            let err = SanityScenario::new(row, 0).run(&pages).await.unwrap_err();
            assert!(matches!(err, ProbeError::MissingField { ref sheet, ref field } if sheet == "Sanity" && field == "email"));

            assert_eq!(session.history(), before);
        }

        #[tokio::test]
        async fn test_sanity_wrong_room_fails() {
            let site = booking_site(ORIGIN).page(
                "/reservation/1",
                MockPage::new(SITE_TITLE).with("room_h1", MockElement::text("Family Room")),
            );
            let session = MockSession::new(site);
            let pages = pages_on(&session).await;
            let row = workbook().sanity_rows().unwrap().remove(1);
            let err = SanityScenario::new(row, 1).run(&pages).await.unwrap_err();
            assert!(err.is_assertion());
        }
    }
}
