//! Reservation page: room heading, guest form and booking confirmation.

use crate::config::SuiteConfig;
use crate::driver::{BrowserSession, ElementHandle};
use crate::fixture::GuestDetails;
use crate::locator::Selector;
use crate::page_object::{describe, BasePage, LocatorMap, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::poll_until;
use std::sync::Arc;

const FORM_PANEL: &str = "//*[@id='root-container']/div/div[2]/div/div[2]/div/div";

/// Path fragment every reservation URL contains
pub const RESERVATION_PATH: &str = "/reservation/";

/// Lower-cased phrase the confirmation heading must contain
pub const CONFIRMATION_PHRASE: &str = "booking confirmed";

fn form_input(row: u8) -> Selector {
    Selector::xpath(format!("{FORM_PANEL}/form/div[{row}]/input"))
}

/// Locator table of the reservation page
#[must_use]
pub fn locators() -> Vec<(&'static str, Selector)> {
    vec![
        (
            "room_h1",
            Selector::xpath("//*[@id=\"root-container\"]//div[1]/div[1]/h1"),
        ),
        ("first_name", form_input(1)),
        ("last_name", form_input(2)),
        ("email", form_input(3)),
        ("phone", form_input(4)),
        ("btn_reserve_now", Selector::xpath(format!("{FORM_PANEL}/form/button[1]"))),
        ("confirmed_h2", Selector::xpath(format!("{FORM_PANEL}/h2"))),
    ]
}

/// The room reservation page
#[derive(Debug)]
pub struct ReservationPage {
    base: BasePage,
    locators: LocatorMap,
}

impl PageObject for ReservationPage {
    fn url_pattern(&self) -> &str {
        RESERVATION_PATH
    }

    fn page_name(&self) -> &str {
        "reservation"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl ReservationPage {
    /// Bind the reservation locators to a session
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

    /// Wait until the location contains `/reservation/`
    pub async fn wait_for_reservation_url(&self) -> ProbeResult<()> {
        self.base.wait_for_url(&self.url_matcher(), None).await?;
        tracing::debug!("On {} page", self.page_name());
        Ok(())
    }

    /// Room heading contains at least one of `candidates`. Empty candidates
    /// never match.
    pub async fn expect_room_header_contains(&self, candidates: &[&str]) -> ProbeResult<()> {
        let heading = self.el("room_h1")?;
        self.base.expect_visible(heading, None).await?;
        let text = self.base.get_text(heading).await?;

        let usable: Vec<&str> = candidates
            .iter()
            .copied()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if usable.iter().any(|c| text.contains(c)) {
            tracing::info!("Room header '{}' matched", text.trim());
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "room header '{}' contains none of {usable:?}",
                text.trim()
            )))
        }
    }

    /// Open the guest form
    pub async fn click_reserve_now(&self) -> ProbeResult<()> {
        self.base
            .click_when_visible(self.el("btn_reserve_now")?, None)
            .await
    }

    /// Submit the guest form. The site reuses the Reserve Now button.
    pub async fn submit_reservation(&self) -> ProbeResult<()> {
        self.base
            .click_when_visible(self.el("btn_reserve_now")?, None)
            .await
    }

    /// Type guest details in form order, then Tab out of the last field
    pub async fn fill_guest_details(&self, guest: &GuestDetails) -> ProbeResult<()> {
        self.base.scroll_into_view(self.el("first_name")?).await;
        let fields = [
            ("first_name", guest.first_name.as_deref()),
            ("last_name", guest.last_name.as_deref()),
            ("email", guest.email.as_deref()),
            ("phone", guest.phone.as_deref()),
        ];
        for (name, value) in fields {
            self.base
                .fill_when_visible(self.el(name)?, value, None)
                .await?;
        }
        self.base.press_tab().await
    }

    /// Wait for a visible confirmation heading mentioning "booking confirmed"
    /// and return its text
    pub async fn confirmation_text(&self) -> ProbeResult<String> {
        let heading = self.el("confirmed_h2")?;
        let opts = self.base.config().wait_options(None);
        let outcome = poll_until(&opts, move || async move {
            let snap = heading.snapshot().await?;
            let text = snap.text.unwrap_or_default();
            let ok = snap.visible && text.to_lowercase().contains(CONFIRMATION_PHRASE);
            Ok((ok, text))
        })
        .await?;

        if outcome.satisfied {
            let text = outcome.last.trim().to_string();
            tracing::info!("Confirmation: {text}");
            Ok(text)
        } else {
            Err(ProbeError::TextMismatch {
                handle: describe(heading),
                expected: format!("text containing '{CONFIRMATION_PHRASE}'"),
                actual: outcome.last,
                timeout_ms: opts.timeout_ms,
            })
        }
    }

    /// Confirmation heading is visible
    pub async fn expect_confirmation_visible(&self) -> ProbeResult<()> {
        self.base
            .expect_visible(self.el("confirmed_h2")?, None)
            .await
    }
}
