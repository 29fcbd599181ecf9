//! Admin book CRUD route handlers.
//!
//! The book form carries a multi-valued `author_ids` checkbox set, which
//! `serde_urlencoded` (and therefore `axum::Form`) cannot represent, so
//! create/update read the raw body and parse the pairs explicitly.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawForm, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use dogear_core::{AuthorId, BookId, PublisherId};

use crate::db::{AuthorRepository, BookRepository, NewBook, PublisherRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::{Author, BookDetail, BookSummary, Flash, PageContext, Publisher};
use crate::state::AppState;

/// Raw book form values, echoed back into re-rendered forms verbatim.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: String,
    pub isbn: String,
    pub price: String,
    pub page_count: String,
    pub description: String,
    pub cover_image: String,
    pub published_at: String,
    pub publisher_id: String,
    pub author_ids: Vec<i32>,
}

impl BookForm {
    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Repeated `author_ids` keys accumulate; unparseable id values are
    /// dropped (checkboxes only ever submit ids the form rendered).
    #[must_use]
    pub fn from_bytes(body: &[u8]) -> Self {
        let mut form = Self::default();

        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "title" => form.title = value.into_owned(),
                "isbn" => form.isbn = value.into_owned(),
                "price" => form.price = value.into_owned(),
                "page_count" => form.page_count = value.into_owned(),
                "description" => form.description = value.into_owned(),
                "cover_image" => form.cover_image = value.into_owned(),
                "published_at" => form.published_at = value.into_owned(),
                "publisher_id" => form.publisher_id = value.into_owned(),
                "author_ids" => {
                    if let Ok(id) = value.parse::<i32>() {
                        form.author_ids.push(id);
                    }
                }
                _ => {}
            }
        }

        form
    }

    /// Build the form from an existing book for the edit page.
    #[must_use]
    pub fn from_detail(detail: &BookDetail) -> Self {
        Self {
            title: detail.book.title.clone(),
            isbn: detail.book.isbn.clone(),
            price: detail.book.price.amount().to_string(),
            page_count: detail
                .book
                .page_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
            description: detail.book.description.clone().unwrap_or_default(),
            cover_image: detail.book.cover_image.clone().unwrap_or_default(),
            published_at: detail
                .book
                .published_at
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            publisher_id: detail
                .book
                .publisher_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            author_ids: detail.authors.iter().map(|a| a.id.as_i32()).collect(),
        }
    }

    /// Whether an author checkbox should render checked.
    #[must_use]
    pub fn has_author(&self, id: i32) -> bool {
        self.author_ids.contains(&id)
    }

    /// Validate and convert into repository-level fields.
    ///
    /// # Errors
    ///
    /// Returns the list of user-facing validation messages.
    pub fn validate(&self) -> std::result::Result<NewBook, Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title can't be blank".to_owned());
        }
        if self.isbn.trim().is_empty() {
            errors.push("Isbn can't be blank".to_owned());
        }

        let price = if self.price.trim().is_empty() {
            errors.push("Price can't be blank".to_owned());
            None
        } else {
            match self.price.trim().parse::<Decimal>() {
                Ok(price) if price.is_sign_negative() => {
                    errors.push("Price must be greater than or equal to 0".to_owned());
                    None
                }
                Ok(price) => Some(price),
                Err(_) => {
                    errors.push("Price is not a number".to_owned());
                    None
                }
            }
        };

        let page_count = if self.page_count.trim().is_empty() {
            None
        } else {
            match self.page_count.trim().parse::<i32>() {
                Ok(count) => Some(count),
                Err(_) => {
                    errors.push("Page count is not a number".to_owned());
                    None
                }
            }
        };

        let published_at = if self.published_at.trim().is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(self.published_at.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("Published at is invalid".to_owned());
                    None
                }
            }
        };

        let publisher_id = if self.publisher_id.trim().is_empty() {
            None
        } else {
            match self.publisher_id.trim().parse::<i32>() {
                Ok(id) => Some(PublisherId::new(id)),
                Err(_) => {
                    errors.push("Publisher is invalid".to_owned());
                    None
                }
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewBook {
            title: self.title.trim().to_owned(),
            isbn: self.isbn.trim().to_owned(),
            // Price presence was just checked
            price: price.unwrap_or_default(),
            page_count,
            description: none_if_blank(&self.description),
            cover_image: none_if_blank(&self.cover_image),
            published_at,
            publisher_id,
            author_ids: self.author_ids.iter().copied().map(AuthorId::new).collect(),
        })
    }
}

/// Trimmed `Some`, or `None` for a blank input.
fn none_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Book index template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books/index.html")]
pub struct BooksIndexTemplate {
    pub ctx: PageContext,
    pub books: Vec<BookSummary>,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books/show.html")]
pub struct BookShowTemplate {
    pub ctx: PageContext,
    pub detail: BookDetail,
}

/// New book form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books/new.html")]
pub struct BookNewTemplate {
    pub ctx: PageContext,
    pub form: BookForm,
    pub errors: Vec<String>,
    pub publishers: Vec<Publisher>,
    pub authors: Vec<Author>,
}

/// Edit book form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books/edit.html")]
pub struct BookEditTemplate {
    pub ctx: PageContext,
    pub book_id: BookId,
    pub form: BookForm,
    pub errors: Vec<String>,
    pub publishers: Vec<Publisher>,
    pub authors: Vec<Author>,
}

/// List all books with their relation names.
#[instrument(skip(_admin, state, session))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<BooksIndexTemplate> {
    let ctx = PageContext::load(&session).await;
    let books = BookRepository::new(state.pool()).list_summaries().await?;

    Ok(BooksIndexTemplate { ctx, books })
}

/// Display one book.
#[instrument(skip(_admin, state, session))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<BookShowTemplate> {
    let ctx = PageContext::load(&session).await;
    let detail = BookRepository::new(state.pool())
        .get_detail(BookId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;

    Ok(BookShowTemplate { ctx, detail })
}

/// Display the new book form.
#[instrument(skip(_admin, state, session))]
pub async fn new(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<BookNewTemplate> {
    let ctx = PageContext::load(&session).await;
    let publishers = PublisherRepository::new(state.pool()).list_all().await?;
    let authors = AuthorRepository::new(state.pool()).list_all().await?;

    Ok(BookNewTemplate {
        ctx,
        form: BookForm::default(),
        errors: Vec::new(),
        publishers,
        authors,
    })
}

/// Create a book.
#[instrument(skip(_admin, state, session, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    RawForm(body): RawForm,
) -> Result<Response> {
    let form = BookForm::from_bytes(&body);

    let new_book = match form.validate() {
        Ok(new_book) => new_book,
        Err(errors) => {
            return render_new_again(&state, &session, form, errors).await;
        }
    };

    match BookRepository::new(state.pool()).create(&new_book).await {
        Ok(book) => {
            let _ = set_flash(&session, Flash::success("Book has been created")).await;
            Ok(Redirect::to(&format!("/admin/books/{}", book.id)).into_response())
        }
        Err(RepositoryError::Conflict(message)) => {
            render_new_again(&state, &session, form, vec![capitalize(&message)]).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the edit book form.
#[instrument(skip(_admin, state, session))]
pub async fn edit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<BookEditTemplate> {
    let ctx = PageContext::load(&session).await;
    let detail = BookRepository::new(state.pool())
        .get_detail(BookId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;
    let publishers = PublisherRepository::new(state.pool()).list_all().await?;
    let authors = AuthorRepository::new(state.pool()).list_all().await?;

    Ok(BookEditTemplate {
        ctx,
        book_id: detail.book.id,
        form: BookForm::from_detail(&detail),
        errors: Vec::new(),
        publishers,
        authors,
    })
}

/// Update a book.
#[instrument(skip(_admin, state, session, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    RawForm(body): RawForm,
) -> Result<Response> {
    let form = BookForm::from_bytes(&body);
    let book_id = BookId::new(id);

    let new_book = match form.validate() {
        Ok(new_book) => new_book,
        Err(errors) => {
            return render_edit_again(&state, &session, book_id, form, errors).await;
        }
    };

    match BookRepository::new(state.pool())
        .update(book_id, &new_book)
        .await
    {
        Ok(book) => {
            let _ = set_flash(&session, Flash::success("Book has been updated")).await;
            Ok(Redirect::to(&format!("/admin/books/{}", book.id)).into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("book {id}"))),
        Err(RepositoryError::Conflict(message)) => {
            render_edit_again(&state, &session, book_id, form, vec![capitalize(&message)]).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a book. A book that has been ordered stays (its order items are
/// immutable history) and the delete is reported as failed.
#[instrument(skip(_admin, state, session))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    match BookRepository::new(state.pool()).delete(BookId::new(id)).await {
        Ok(()) => {
            let _ = set_flash(&session, Flash::success("Book has been deleted")).await;
            Ok(Redirect::to("/admin/books").into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("book {id}"))),
        Err(RepositoryError::Conflict(_)) => {
            let _ = set_flash(&session, Flash::danger("Book has not been deleted")).await;
            Ok(Redirect::to("/admin/books").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Re-render the new form with errors and a danger flash.
async fn render_new_again(
    state: &AppState,
    session: &Session,
    form: BookForm,
    errors: Vec<String>,
) -> Result<Response> {
    let ctx = PageContext::load(session)
        .await
        .with_flash(Flash::danger("Book has not been created"));
    let publishers = PublisherRepository::new(state.pool()).list_all().await?;
    let authors = AuthorRepository::new(state.pool()).list_all().await?;

    Ok(BookNewTemplate {
        ctx,
        form,
        errors,
        publishers,
        authors,
    }
    .into_response())
}

/// Re-render the edit form with errors and a danger flash.
async fn render_edit_again(
    state: &AppState,
    session: &Session,
    book_id: BookId,
    form: BookForm,
    errors: Vec<String>,
) -> Result<Response> {
    let ctx = PageContext::load(session)
        .await
        .with_flash(Flash::danger("Book has not been updated"));
    let publishers = PublisherRepository::new(state.pool()).list_all().await?;
    let authors = AuthorRepository::new(state.pool()).list_all().await?;

    Ok(BookEditTemplate {
        ctx,
        book_id,
        form,
        errors,
        publishers,
        authors,
    }
    .into_response())
}

/// Uppercase the first letter of a repository message for display.
fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_collects_repeated_author_ids() {
        let body = b"title=Javascript&isbn=9870321772978&price=34.99&author_ids=1&author_ids=2";
        let form = BookForm::from_bytes(body);

        assert_eq!(form.title, "Javascript");
        assert_eq!(form.isbn, "9870321772978");
        assert_eq!(form.price, "34.99");
        assert_eq!(form.author_ids, vec![1, 2]);
        assert!(form.has_author(1));
        assert!(!form.has_author(3));
    }

    #[test]
    fn test_from_bytes_decodes_percent_escapes() {
        let body = b"title=Learn+Rust%21&isbn=x&price=1";
        let form = BookForm::from_bytes(body);
        assert_eq!(form.title, "Learn Rust!");
    }

    #[test]
    fn test_validate_full_form() {
        let body = b"title=Javascript&isbn=9870321772978&price=34.99&page_count=518\
                     &published_at=2016-01-01&publisher_id=3&author_ids=1";
        let new_book = BookForm::from_bytes(body).validate().expect("valid form");

        assert_eq!(new_book.title, "Javascript");
        assert_eq!(new_book.price.to_string(), "34.99");
        assert_eq!(new_book.page_count, Some(518));
        assert_eq!(
            new_book.published_at,
            NaiveDate::from_ymd_opt(2016, 1, 1)
        );
        assert_eq!(new_book.publisher_id, Some(PublisherId::new(3)));
        assert_eq!(new_book.author_ids, vec![AuthorId::new(1)]);
    }

    #[test]
    fn test_validate_missing_title() {
        let errors = BookForm::from_bytes(b"isbn=x&price=10")
            .validate()
            .expect_err("invalid form");
        assert_eq!(errors, vec!["Title can't be blank".to_owned()]);
    }

    #[test]
    fn test_validate_bad_price_and_date() {
        let errors = BookForm::from_bytes(b"title=T&isbn=x&price=cheap&published_at=tomorrow")
            .validate()
            .expect_err("invalid form");
        assert!(errors.contains(&"Price is not a number".to_owned()));
        assert!(errors.contains(&"Published at is invalid".to_owned()));
    }

    #[test]
    fn test_validate_blank_optionals() {
        let new_book = BookForm::from_bytes(
            b"title=T&isbn=x&price=5&page_count=&published_at=&publisher_id=&description=",
        )
        .validate()
        .expect("valid form");

        assert_eq!(new_book.page_count, None);
        assert_eq!(new_book.published_at, None);
        assert_eq!(new_book.publisher_id, None);
        assert_eq!(new_book.description, None);
    }
}
