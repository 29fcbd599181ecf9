//! Per-page rendering context.

use tower_sessions::Session;

use super::session::{CurrentUser, Flash, session_keys};

/// Data the base layout needs on every page: the signed-in user for the nav
/// and the pending flash message.
///
/// Loading the context *takes* the flash out of the session, giving flash
/// messages their one-request lifetime.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// The signed-in user, if any.
    pub current_user: Option<CurrentUser>,
    /// Flash message to display on this render.
    pub flash: Option<Flash>,
}

impl PageContext {
    /// Load the context from the session, consuming any pending flash.
    pub async fn load(session: &Session) -> Self {
        let current_user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        let flash = session
            .remove::<Flash>(session_keys::FLASH)
            .await
            .ok()
            .flatten();

        Self {
            current_user,
            flash,
        }
    }

    /// Attach a flash to render on this response without storing it in the
    /// session (the re-rendered-form case).
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Whether the signed-in user is an admin (nav link visibility).
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(|user| user.admin)
    }
}
