//! Password reset route handlers.
//!
//! Token-based flow: the request step validates the email and sends a
//! token-bearing link; the edit/update steps are bound to that token, and
//! a successful update rotates it so the link is single-use.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::set_flash;
use crate::models::{Flash, PageContext};
use crate::services::auth::{AuthError, AuthService, ResetRequestError};
use crate::state::AppState;

/// Reset request form data.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    #[serde(default)]
    pub email: String,
}

/// New-password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Reset request page template.
#[derive(Template, WebTemplate)]
#[template(path = "password_resets/new.html")]
pub struct ResetRequestTemplate {
    pub ctx: PageContext,
}

/// Confirmation page template, rendered after the email is dispatched.
#[derive(Template, WebTemplate)]
#[template(path = "password_resets/confirm.html")]
pub struct ResetConfirmTemplate {
    pub ctx: PageContext,
    pub email: String,
}

/// Token-bound new-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "password_resets/edit.html")]
pub struct ResetEditTemplate {
    pub ctx: PageContext,
    pub token: String,
    pub errors: Vec<String>,
}

/// Display the reset request form.
#[instrument(skip(session))]
pub async fn new(session: Session) -> ResetRequestTemplate {
    ResetRequestTemplate {
        ctx: PageContext::load(&session).await,
    }
}

/// Issue a password reset email.
///
/// A blank email and an email that matches no user produce distinct danger
/// flashes ("Email can't be blank." / "Email invalid."); a known address
/// gets exactly one email and the confirmation page.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetRequestForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    let user = match service.request_password_reset(&form.email).await {
        Ok(user) => user,
        Err(ResetRequestError::BlankEmail) => {
            let _ = set_flash(&session, Flash::danger("Email can't be blank.")).await;
            return Ok(Redirect::to("/reset_password").into_response());
        }
        Err(ResetRequestError::UnknownEmail) => {
            let _ = set_flash(&session, Flash::danger("Email invalid.")).await;
            return Ok(Redirect::to("/reset_password").into_response());
        }
        Err(ResetRequestError::Repository(e)) => return Err(e.into()),
    };

    let reset_url = format!(
        "{}/password_resets/{}/edit",
        state.config().base_url.trim_end_matches('/'),
        user.token
    );

    // Fire-and-forget delivery
    let mailer = state.mailer().clone();
    let email = user.email.clone();
    let name = user.full_name();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_password_reset(&email, &name, &reset_url).await {
            tracing::error!("Failed to send password reset email: {e}");
        }
    });

    Ok(ResetConfirmTemplate {
        ctx: PageContext::load(&session).await,
        email: user.email.to_string(),
    }
    .into_response())
}

/// Display the token-bound new-password form.
#[instrument(skip(state, session))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<ResetEditTemplate> {
    let ctx = PageContext::load(&session).await;

    // 404 for unknown tokens before showing the form
    UserRepository::new(state.pool())
        .get_by_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("reset token".to_owned()))?;

    Ok(ResetEditTemplate {
        ctx,
        token,
        errors: Vec::new(),
    })
}

/// Consume the token and set the new password.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service
        .reset_password(&token, &form.password, &form.password_confirmation)
        .await
    {
        Ok(_) => {
            let _ = set_flash(
                &session,
                Flash::success("Your password has been reset. Please sign in"),
            )
            .await;
            Ok(Redirect::to("/signin").into_response())
        }
        Err(AuthError::TokenNotFound) => Err(AppError::NotFound("reset token".to_owned())),
        Err(AuthError::Validation(errors)) => {
            let ctx = PageContext::load(&session)
                .await
                .with_flash(Flash::danger("Password has not been reset"));
            Ok(ResetEditTemplate { ctx, token, errors }.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
