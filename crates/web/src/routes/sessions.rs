//! Sign-in and sign-out route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user, set_flash};
use crate::models::{CurrentUser, Flash, PageContext};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "sessions/new.html")]
pub struct SigninTemplate {
    pub ctx: PageContext,
    /// Echoed email after a failed attempt.
    pub email: String,
}

/// Display the sign-in form.
#[instrument(skip(session))]
pub async fn new(session: Session) -> SigninTemplate {
    SigninTemplate {
        ctx: PageContext::load(&session).await,
        email: String::new(),
    }
}

/// Sign in with email and password.
///
/// Success writes the user's identity into the session and redirects home;
/// bad credentials re-render the form with a danger flash and write
/// nothing.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service.signin(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
                name: user.full_name(),
                admin: user.admin,
            };
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to write session: {e}");
                return Ok(Redirect::to("/signin").into_response());
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));

            let _ = set_flash(&session, Flash::success("Sign in successful")).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let ctx = PageContext::load(&session)
                .await
                .with_flash(Flash::danger("Invalid email or password"));
            Ok(SigninTemplate {
                ctx,
                email: form.email,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Sign out and clear the session entry.
#[instrument(skip(session))]
pub async fn destroy(session: Session) -> Response {
    let _ = clear_current_user(&session).await;
    clear_sentry_user();

    let _ = set_flash(&session, Flash::success("You have been signed out")).await;
    Redirect::to("/").into_response()
}
