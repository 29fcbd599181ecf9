//! Seed the database with a small demo catalog and an admin account.
//!
//! Safe to re-run: books are keyed by ISBN and skipped when present, and
//! the demo admin is only created if the email is free.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use dogear_core::{AuthorId, PublisherId};

use dogear_web::db::{
    self, AuthorRepository, BookRepository, NewBook, PublisherRepository, RepositoryError,
    UserRepository,
};
use dogear_web::services::auth::{AuthService, AuthError, Signup};

/// Demo admin credentials, for local development only.
const ADMIN_EMAIL: &str = "admin@dogearbooks.test";
const ADMIN_PASSWORD: &str = "paperback-writer";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Auth service error while creating the demo admin.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

struct SeedBook {
    title: &'static str,
    isbn: &'static str,
    price: &'static str,
    page_count: i32,
    publisher: &'static str,
    authors: &'static [(&'static str, &'static str)],
}

const CATALOG: &[SeedBook] = &[
    SeedBook {
        title: "Javascript",
        isbn: "9870321772978",
        price: "34.99",
        page_count: 518,
        publisher: "Peachpit Press",
        authors: &[("Jane", "Doe")],
    },
    SeedBook {
        title: "The Paper Sea",
        isbn: "9781405892337",
        price: "18.50",
        page_count: 402,
        publisher: "Inkhouse",
        authors: &[("John", "Smith"), ("Jane", "Doe")],
    },
    SeedBook {
        title: "Letterpress at Home",
        isbn: "9780140449136",
        price: "24.00",
        page_count: 214,
        publisher: "Inkhouse",
        authors: &[("Maria", "Alvarez")],
    },
];

/// Seed the demo catalog and admin account.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let publishers = PublisherRepository::new(&pool);
    let authors = AuthorRepository::new(&pool);
    let books = BookRepository::new(&pool);

    // Publishers and authors by name, created on first sight
    let mut publishers_by_name: HashMap<String, PublisherId> = publishers
        .list_all()
        .await?
        .into_iter()
        .map(|p| (p.name, p.id))
        .collect();
    let mut authors_by_name: HashMap<(String, String), AuthorId> = authors
        .list_all()
        .await?
        .into_iter()
        .map(|a| ((a.first_name, a.last_name), a.id))
        .collect();

    let mut created = 0;
    for seed in CATALOG {
        if book_exists(&books, seed.isbn).await? {
            tracing::info!(title = seed.title, "already seeded, skipping");
            continue;
        }

        let publisher_id = match publishers_by_name.get(seed.publisher) {
            Some(id) => *id,
            None => {
                let id = publishers.create(seed.publisher).await?.id;
                publishers_by_name.insert(seed.publisher.to_owned(), id);
                id
            }
        };

        let mut author_ids = Vec::new();
        for (first, last) in seed.authors {
            let key = ((*first).to_owned(), (*last).to_owned());
            let id = match authors_by_name.get(&key) {
                Some(id) => *id,
                None => {
                    let id = authors.create(first, last).await?.id;
                    authors_by_name.insert(key, id);
                    id
                }
            };
            author_ids.push(id);
        }

        books
            .create(&NewBook {
                title: seed.title.to_owned(),
                isbn: seed.isbn.to_owned(),
                price: seed.price.parse::<Decimal>().unwrap_or_default(),
                page_count: Some(seed.page_count),
                description: None,
                cover_image: None,
                published_at: None,
                publisher_id: Some(publisher_id),
                author_ids,
            })
            .await?;
        created += 1;
    }

    tracing::info!("Seeded {created} book(s)");

    seed_admin(&pool).await?;

    Ok(())
}

async fn book_exists(books: &BookRepository<'_>, isbn: &str) -> Result<bool, RepositoryError> {
    Ok(books
        .list_summaries()
        .await?
        .iter()
        .any(|book| book.isbn == isbn))
}

/// Create the demo admin account unless it already exists.
async fn seed_admin(pool: &sqlx::PgPool) -> Result<(), SeedError> {
    let users = UserRepository::new(pool);

    if users.get_by_email(ADMIN_EMAIL).await?.is_some() {
        tracing::info!("Demo admin already exists");
        return Ok(());
    }

    AuthService::new(pool)
        .register(&Signup {
            first_name: "Dogear".to_owned(),
            last_name: "Admin".to_owned(),
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
            password_confirmation: ADMIN_PASSWORD.to_owned(),
            address: dogear_web::db::users::NewAddress::default(),
        })
        .await?;

    users.set_admin(ADMIN_EMAIL, true).await?;
    tracing::info!("Created demo admin {ADMIN_EMAIL} (password: {ADMIN_PASSWORD})");

    Ok(())
}
