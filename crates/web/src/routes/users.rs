//! User account route handlers: signup, profile, admin user index.

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

use dogear_core::UserId;

use crate::db::users::NewAddress;
use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::{Address, Flash, OrderSummary, PageContext, User};
use crate::services::auth::{AuthError, AuthService, Signup};
use crate::state::AppState;

/// Signup form data. Address fields are the flattened nested address; they
/// are all optional and skipped when left blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
}

impl SignupForm {
    /// Convert into the service-level signup data.
    fn into_signup(self) -> Signup {
        Signup {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            password_confirmation: self.password_confirmation,
            address: NewAddress {
                address_line1: self.address_line1,
                address_line2: self.address_line2,
                city: self.city,
                zipcode: self.zipcode,
            },
        }
    }

    /// Echo values back into a re-rendered form, with the passwords cleared.
    fn for_rerender(mut self) -> Self {
        self.password = String::new();
        self.password_confirmation = String::new();
        self
    }
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/new.html")]
pub struct UserNewTemplate {
    pub ctx: PageContext,
    pub form: SignupForm,
    pub errors: Vec<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/show.html")]
pub struct UserShowTemplate {
    pub ctx: PageContext,
    pub user: User,
    pub addresses: Vec<Address>,
    /// Order history, present only when the viewer is the profile owner.
    pub orders: Vec<OrderSummary>,
    pub is_self: bool,
}

/// User index template (admin only).
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub ctx: PageContext,
    pub users: Vec<User>,
}

/// Display the signup form.
#[instrument(skip(session))]
pub async fn new(session: Session) -> UserNewTemplate {
    UserNewTemplate {
        ctx: PageContext::load(&session).await,
        form: SignupForm::default(),
        errors: Vec::new(),
    }
}

/// Create an account from the signup form.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service.register(&form.clone().into_signup()).await {
        Ok(user) => {
            let _ = set_flash(&session, Flash::success("User has been created")).await;
            Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
        }
        Err(AuthError::Validation(errors)) => {
            let ctx = PageContext::load(&session)
                .await
                .with_flash(Flash::danger("User has not been created"));
            Ok(UserNewTemplate {
                ctx,
                form: form.for_rerender(),
                errors,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Display a user's profile page.
///
/// The profile itself is public (as the signup redirect lands here before
/// sign-in); the order history is only shown to its owner.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<UserShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let repo = UserRepository::new(state.pool());

    let user = repo
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let addresses = repo.list_addresses(user.id).await?;

    let is_self = ctx
        .current_user
        .as_ref()
        .is_some_and(|current| current.id == user.id);
    let orders = if is_self {
        OrderRepository::new(state.pool())
            .list_for_user(user.id)
            .await?
    } else {
        Vec::new()
    };

    Ok(UserShowTemplate {
        ctx,
        user,
        addresses,
        orders,
        is_self,
    })
}

/// List all users (admin only).
#[instrument(skip(_admin, state, session))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<UsersIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let users = UserRepository::new(state.pool()).list_all().await?;

    Ok(UsersIndexTemplate { ctx, users })
}
