//! Checkout and order route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use dogear_core::{CartId, OrderId};

use crate::db::{CartRepository, OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireUser, set_flash};
use crate::models::{Address, Cart, Flash, Order, PageContext, session_keys};
use crate::services::checkout::{CheckoutError, CheckoutService};
use crate::state::AppState;

use super::cart::get_cart_id;

/// Checkout review page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/new.html")]
pub struct OrdersNewTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
    pub addresses: Vec<Address>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: Order,
}

/// Display the checkout review page.
///
/// Requires sign-in and a non-empty cart.
#[instrument(skip(user, state, session))]
pub async fn new(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let cart = match get_cart_id(&session).await {
        Some(id) => CartRepository::new(state.pool()).get(id).await?,
        None => None,
    };

    let Some(cart) = cart.filter(|cart| !cart.is_empty()) else {
        let _ = set_flash(&session, Flash::danger("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    };

    let ctx = PageContext::load(&session).await;
    let addresses = UserRepository::new(state.pool())
        .list_addresses(user.id)
        .await?;

    Ok(OrdersNewTemplate {
        ctx,
        cart,
        addresses,
    }
    .into_response())
}

/// Place an order from the session cart.
///
/// On success the cart is gone, a confirmation email is dispatched in the
/// background, and the browser lands on the order page.
#[instrument(skip(user, state, session))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let cart_id = get_cart_id(&session).await;

    let order = match CheckoutService::new(state.pool())
        .place_order(user.id, cart_id)
        .await
    {
        Ok(order) => order,
        Err(CheckoutError::EmptyCart) => {
            let _ = set_flash(&session, Flash::danger("Your cart is empty")).await;
            return Ok(Redirect::to("/cart").into_response());
        }
        Err(CheckoutError::Repository(e)) => return Err(e.into()),
    };

    let _ = session.remove::<CartId>(session_keys::CART_ID).await;

    // Fire-and-forget confirmation email
    let mailer = state.mailer().clone();
    let email = user.email.clone();
    let name = user.name.clone();
    let order_for_email = order.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_order_confirmation(&email, &name, &order_for_email)
            .await
        {
            tracing::error!(order_id = %order_for_email.id, "Failed to send order confirmation: {e}");
        }
    });

    let _ = set_flash(&session, Flash::success("Order has been placed")).await;
    Ok(Redirect::to(&format!("/orders/{}", order.id)).into_response())
}

/// Display an order, scoped to its owner.
#[instrument(skip(user, state, session))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<OrderShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let order = OrderRepository::new(state.pool())
        .get_for_user(OrderId::new(id), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderShowTemplate { ctx, order })
}
