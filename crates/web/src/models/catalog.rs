//! Catalog domain types: books, authors, publishers.

use chrono::{DateTime, NaiveDate, Utc};

use dogear_core::{AuthorId, BookId, Price, PublisherId};

/// A publisher of books.
#[derive(Debug, Clone)]
pub struct Publisher {
    /// Unique publisher ID.
    pub id: PublisherId,
    /// Publisher name.
    pub name: String,
    /// When the publisher was created.
    pub created_at: DateTime<Utc>,
    /// When the publisher was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An author. Books and authors are many-to-many.
#[derive(Debug, Clone)]
pub struct Author {
    /// Unique author ID.
    pub id: AuthorId,
    /// Author's first name.
    pub first_name: String,
    /// Author's last name.
    pub last_name: String,
    /// When the author was created.
    pub created_at: DateTime<Utc>,
    /// When the author was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// The author's display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A book in the catalog.
#[derive(Debug, Clone)]
pub struct Book {
    /// Unique book ID.
    pub id: BookId,
    /// Book title.
    pub title: String,
    /// ISBN, unique across the catalog.
    pub isbn: String,
    /// Current list price.
    pub price: Price,
    /// Number of pages.
    pub page_count: Option<i32>,
    /// Marketing description.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Publication date.
    pub published_at: Option<NaiveDate>,
    /// Publisher, if assigned.
    pub publisher_id: Option<PublisherId>,
    /// When the book was created.
    pub created_at: DateTime<Utc>,
    /// When the book was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A catalog listing row: the book plus display-ready relation names.
///
/// Produced by an aggregate query so index pages don't fan out per book.
#[derive(Debug, Clone)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub isbn: String,
    pub price: Price,
    pub cover_image: Option<String>,
    /// Publisher name, if the book has one.
    pub publisher_name: Option<String>,
    /// Comma-separated author names ("Jane Doe, John Smith").
    pub author_names: Option<String>,
}

/// A fully-loaded book for detail pages and edit forms.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub publisher: Option<Publisher>,
    pub authors: Vec<Author>,
}

impl BookDetail {
    /// Comma-separated author names for display.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(Author::full_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the given author is attached to this book (edit-form checkboxes).
    #[must_use]
    pub fn has_author(&self, id: AuthorId) -> bool {
        self.authors.iter().any(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i32, first: &str, last: &str) -> Author {
        Author {
            id: AuthorId::new(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_full_name() {
        assert_eq!(author(1, "Jane", "Doe").full_name(), "Jane Doe");
    }

    #[test]
    fn test_book_detail_author_names() {
        let detail = BookDetail {
            book: Book {
                id: BookId::new(1),
                title: "Javascript".to_string(),
                isbn: "9870321772978".to_string(),
                price: Price::from_cents(3499),
                page_count: Some(518),
                description: None,
                cover_image: None,
                published_at: None,
                publisher_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            publisher: None,
            authors: vec![author(1, "Jane", "Doe"), author(2, "John", "Smith")],
        };

        assert_eq!(detail.author_names(), "Jane Doe, John Smith");
        assert!(detail.has_author(AuthorId::new(2)));
        assert!(!detail.has_author(AuthorId::new(9)));
    }
}
