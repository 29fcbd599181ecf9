//! Cart route handlers.
//!
//! The session owns at most one cart: its id lives under the
//! `cart_id` session key and is minted lazily on the first add.

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

use dogear_core::{BookId, CartId};

use crate::db::{CartRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::models::{Cart, PageContext, session_keys};
use crate::state::AppState;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub book_id: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: Option<Cart>,
}

/// Get the cart ID from the session.
pub(crate) async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<CartId>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Find the session's cart, creating one (and storing its id) if missing.
async fn ensure_cart(
    repo: &CartRepository<'_>,
    session: &Session,
) -> std::result::Result<CartId, RepositoryError> {
    if let Some(id) = get_cart_id(session).await
        && repo.get(id).await?.is_some()
    {
        return Ok(id);
    }

    let id = repo.create().await?;
    if let Err(e) = session.insert(session_keys::CART_ID, id).await {
        tracing::error!("Failed to store cart id in session: {e}");
    }
    Ok(id)
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let ctx = PageContext::load(&session).await;

    let cart = match get_cart_id(&session).await {
        Some(id) => CartRepository::new(state.pool()).get(id).await?,
        None => None,
    };

    Ok(CartShowTemplate { ctx, cart })
}

/// Add a book to the cart.
///
/// A book already in the cart gets its quantity bumped; the price captured
/// on first add sticks. An unknown book id mutates nothing and bounces
/// back to the catalog.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let repo = CartRepository::new(state.pool());
    let cart_id = ensure_cart(&repo, &session).await?;

    match repo
        .add_book_to_items(cart_id, BookId::new(form.book_id))
        .await
    {
        Ok(_) => Ok(Redirect::to("/cart").into_response()),
        Err(RepositoryError::NotFound) => {
            tracing::warn!(book_id = form.book_id, "add-to-cart with unknown book");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn destroy(State(state): State<AppState>, session: Session) -> Result<Response> {
    if let Some(id) = get_cart_id(&session).await {
        CartRepository::new(state.pool()).destroy(id).await?;
        let _ = session.remove::<CartId>(session_keys::CART_ID).await;
    }

    Ok(Redirect::to("/cart").into_response())
}
