//! Flash message session helpers.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Store a flash to be displayed by the next rendered page.
///
/// Used before redirects; pages that re-render directly attach the flash to
/// their [`crate::models::PageContext`] instead.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}
