//! Concrete page objects of the booking site.

pub mod home;
pub mod reservation;

pub use home::{FooterExpectations, HeaderExpectations, HomeButton, HomePage};
pub use reservation::ReservationPage;

use crate::config::SuiteConfig;
use crate::driver::BrowserSession;
use std::sync::Arc;

/// Every page object of one scenario, bound to the same session
#[derive(Debug)]
pub struct Pages {
    /// Landing page
    pub home: HomePage,
    /// Reservation page
    pub reservation: ReservationPage,
}

impl Pages {
    /// Build fresh page objects for a session
    #[must_use]
    pub fn new(session: &Arc<dyn BrowserSession>, config: &Arc<SuiteConfig>) -> Self {
        Self {
            home: HomePage::new(Arc::clone(session), Arc::clone(config)),
            reservation: ReservationPage::new(Arc::clone(session), Arc::clone(config)),
        }
    }
}
