//! Admin dashboard with entity counts.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{
    AuthorRepository, BookRepository, OrderRepository, PublisherRepository, UserRepository,
};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::PageContext;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub book_count: i64,
    pub author_count: i64,
    pub publisher_count: i64,
    pub user_count: i64,
    pub order_count: i64,
}

/// Display the back-office dashboard.
#[instrument(skip(_admin, state, session))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate> {
    let ctx = PageContext::load(&session).await;
    let pool = state.pool();

    Ok(DashboardTemplate {
        ctx,
        book_count: BookRepository::new(pool).count().await?,
        author_count: AuthorRepository::new(pool).count().await?,
        publisher_count: PublisherRepository::new(pool).count().await?,
        user_count: UserRepository::new(pool).count().await?,
        order_count: OrderRepository::new(pool).count().await?,
    })
}
