//! Public catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dogear_core::BookId;

use crate::db::BookRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{BookDetail, BookSummary, PageContext};
use crate::state::AppState;

/// Catalog search form data.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

/// Catalog listing page template (also renders search results).
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub ctx: PageContext,
    pub books: Vec<BookSummary>,
    /// The search term, when this render is a search result page.
    pub query: Option<String>,
}

/// Book detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct CatalogShowTemplate {
    pub ctx: PageContext,
    pub detail: BookDetail,
}

/// Display the catalog listing.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<CatalogIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let books = BookRepository::new(state.pool()).list_summaries().await?;

    Ok(CatalogIndexTemplate {
        ctx,
        books,
        query: None,
    })
}

/// Display a book's detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<CatalogShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let detail = BookRepository::new(state.pool())
        .get_detail(BookId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;

    Ok(CatalogShowTemplate { ctx, detail })
}

/// Run a catalog search and render the listing with the matches.
#[instrument(skip(state, session, form))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<CatalogIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let repo = BookRepository::new(state.pool());

    let term = form.query.trim();
    let books = if term.is_empty() {
        repo.list_summaries().await?
    } else {
        repo.search(term).await?
    };

    Ok(CatalogIndexTemplate {
        ctx,
        books,
        query: Some(term.to_owned()),
    })
}
