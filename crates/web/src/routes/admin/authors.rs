//! Admin author CRUD route handlers.

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

use dogear_core::AuthorId;

use crate::db::AuthorRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::{Author, Flash, PageContext};
use crate::state::AppState;

/// Author form data (create and update).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl AuthorForm {
    /// Validate presence of both names, returning user-facing messages.
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push("First name can't be blank".to_owned());
        }
        if self.last_name.trim().is_empty() {
            errors.push("Last name can't be blank".to_owned());
        }
        errors
    }
}

/// Author index template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/authors/index.html")]
pub struct AuthorsIndexTemplate {
    pub ctx: PageContext,
    pub authors: Vec<Author>,
}

/// Author detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/authors/show.html")]
pub struct AuthorShowTemplate {
    pub ctx: PageContext,
    pub author: Author,
}

/// New author form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/authors/new.html")]
pub struct AuthorNewTemplate {
    pub ctx: PageContext,
    pub form: AuthorForm,
    pub errors: Vec<String>,
}

/// Edit author form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/authors/edit.html")]
pub struct AuthorEditTemplate {
    pub ctx: PageContext,
    pub author_id: AuthorId,
    pub form: AuthorForm,
    pub errors: Vec<String>,
}

/// List all authors.
#[instrument(skip(_admin, state, session))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<AuthorsIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let authors = AuthorRepository::new(state.pool()).list_all().await?;

    Ok(AuthorsIndexTemplate { ctx, authors })
}

/// Display one author.
#[instrument(skip(_admin, state, session))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<AuthorShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let author = AuthorRepository::new(state.pool())
        .get(AuthorId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author {id}")))?;

    Ok(AuthorShowTemplate { ctx, author })
}

/// Display the new author form.
#[instrument(skip(_admin, session))]
pub async fn new(RequireAdmin(_admin): RequireAdmin, session: Session) -> AuthorNewTemplate {
    AuthorNewTemplate {
        ctx: PageContext::load(&session).await,
        form: AuthorForm::default(),
        errors: Vec::new(),
    }
}

/// Create an author.
#[instrument(skip(_admin, state, session, form))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AuthorForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let ctx = PageContext::load(&session)
            .await
            .with_flash(Flash::danger("Author has not been created"));
        return Ok(AuthorNewTemplate { ctx, form, errors }.into_response());
    }

    let author = AuthorRepository::new(state.pool())
        .create(form.first_name.trim(), form.last_name.trim())
        .await?;

    let _ = set_flash(&session, Flash::success("Author has been created")).await;
    Ok(Redirect::to(&format!("/admin/authors/{}", author.id)).into_response())
}

/// Display the edit author form.
#[instrument(skip(_admin, state, session))]
pub async fn edit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<AuthorEditTemplate> {
    let ctx = PageContext::load(&session).await;
    let author = AuthorRepository::new(state.pool())
        .get(AuthorId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author {id}")))?;

    Ok(AuthorEditTemplate {
        ctx,
        author_id: author.id,
        form: AuthorForm {
            first_name: author.first_name,
            last_name: author.last_name,
        },
        errors: Vec::new(),
    })
}

/// Update an author.
#[instrument(skip(_admin, state, session, form))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<AuthorForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let ctx = PageContext::load(&session)
            .await
            .with_flash(Flash::danger("Author has not been updated"));
        return Ok(AuthorEditTemplate {
            ctx,
            author_id: AuthorId::new(id),
            form,
            errors,
        }
        .into_response());
    }

    let author = AuthorRepository::new(state.pool())
        .update(AuthorId::new(id), form.first_name.trim(), form.last_name.trim())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("author {id}")),
            other => AppError::Database(other),
        })?;

    let _ = set_flash(&session, Flash::success("Author has been updated")).await;
    Ok(Redirect::to(&format!("/admin/authors/{}", author.id)).into_response())
}

/// Delete an author.
#[instrument(skip(_admin, state, session))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    AuthorRepository::new(state.pool())
        .delete(AuthorId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("author {id}")),
            other => AppError::Database(other),
        })?;

    let _ = set_flash(&session, Flash::success("Author has been deleted")).await;
    Ok(Redirect::to("/admin/authors").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_both_names() {
        let errors = AuthorForm::default().validate();
        assert_eq!(
            errors,
            vec![
                "First name can't be blank".to_owned(),
                "Last name can't be blank".to_owned(),
            ]
        );
    }

    #[test]
    fn test_validate_ok() {
        let form = AuthorForm {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
        };
        assert!(form.validate().is_empty());
    }
}
