//! Admin publisher CRUD route handlers.
//!
//! Publisher flash messages carry a trailing period; the catalog's other
//! entities don't. The strings are business copy and are kept verbatim.

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

use dogear_core::PublisherId;

use crate::db::PublisherRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::{Flash, PageContext, Publisher};
use crate::state::AppState;

/// Publisher form data (create and update).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublisherForm {
    #[serde(default)]
    pub name: String,
}

impl PublisherForm {
    /// Validate presence of the name.
    fn validate(&self) -> Vec<String> {
        if self.name.trim().is_empty() {
            vec!["Name can't be blank".to_owned()]
        } else {
            Vec::new()
        }
    }
}

/// Publisher index template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/publishers/index.html")]
pub struct PublishersIndexTemplate {
    pub ctx: PageContext,
    pub publishers: Vec<Publisher>,
}

/// Publisher detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/publishers/show.html")]
pub struct PublisherShowTemplate {
    pub ctx: PageContext,
    pub publisher: Publisher,
}

/// New publisher form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/publishers/new.html")]
pub struct PublisherNewTemplate {
    pub ctx: PageContext,
    pub form: PublisherForm,
    pub errors: Vec<String>,
}

/// Edit publisher form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/publishers/edit.html")]
pub struct PublisherEditTemplate {
    pub ctx: PageContext,
    pub publisher_id: PublisherId,
    pub form: PublisherForm,
    pub errors: Vec<String>,
}

/// List all publishers.
#[instrument(skip(_admin, state, session))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<PublishersIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let publishers = PublisherRepository::new(state.pool()).list_all().await?;

    Ok(PublishersIndexTemplate { ctx, publishers })
}

/// Display one publisher.
#[instrument(skip(_admin, state, session))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<PublisherShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let publisher = PublisherRepository::new(state.pool())
        .get(PublisherId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("publisher {id}")))?;

    Ok(PublisherShowTemplate { ctx, publisher })
}

/// Display the new publisher form (served from `/admin/add_publisher`).
#[instrument(skip(_admin, session))]
pub async fn new(RequireAdmin(_admin): RequireAdmin, session: Session) -> PublisherNewTemplate {
    PublisherNewTemplate {
        ctx: PageContext::load(&session).await,
        form: PublisherForm::default(),
        errors: Vec::new(),
    }
}

/// Create a publisher.
#[instrument(skip(_admin, state, session, form))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PublisherForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let ctx = PageContext::load(&session)
            .await
            .with_flash(Flash::danger("Publisher has not been created."));
        return Ok(PublisherNewTemplate { ctx, form, errors }.into_response());
    }

    let publisher = PublisherRepository::new(state.pool())
        .create(form.name.trim())
        .await?;

    let _ = set_flash(&session, Flash::success("Publisher has been created.")).await;
    Ok(Redirect::to(&format!("/admin/publishers/{}", publisher.id)).into_response())
}

/// Display the edit publisher form.
#[instrument(skip(_admin, state, session))]
pub async fn edit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<PublisherEditTemplate> {
    let ctx = PageContext::load(&session).await;
    let publisher = PublisherRepository::new(state.pool())
        .get(PublisherId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("publisher {id}")))?;

    Ok(PublisherEditTemplate {
        ctx,
        publisher_id: publisher.id,
        form: PublisherForm {
            name: publisher.name,
        },
        errors: Vec::new(),
    })
}

/// Update a publisher.
#[instrument(skip(_admin, state, session, form))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<PublisherForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let ctx = PageContext::load(&session)
            .await
            .with_flash(Flash::danger("Publisher has not been updated."));
        return Ok(PublisherEditTemplate {
            ctx,
            publisher_id: PublisherId::new(id),
            form,
            errors,
        }
        .into_response());
    }

    let publisher = PublisherRepository::new(state.pool())
        .update(PublisherId::new(id), form.name.trim())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("publisher {id}")),
            other => AppError::Database(other),
        })?;

    let _ = set_flash(&session, Flash::success("Publisher has been updated.")).await;
    Ok(Redirect::to(&format!("/admin/publishers/{}", publisher.id)).into_response())
}

/// Delete a publisher. Its books stay, with their publisher unset.
#[instrument(skip(_admin, state, session))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    PublisherRepository::new(state.pool())
        .delete(PublisherId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("publisher {id}")),
            other => AppError::Database(other),
        })?;

    let _ = set_flash(&session, Flash::success("Publisher has been deleted.")).await;
    Ok(Redirect::to("/admin/publishers").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        assert_eq!(
            PublisherForm::default().validate(),
            vec!["Name can't be blank".to_owned()]
        );
        assert!(
            PublisherForm {
                name: "Peachpit Press".to_owned()
            }
            .validate()
            .is_empty()
        );
    }
}
