//! Book (catalog record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A book record as persisted in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publication_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_borrowed: bool,
    pub favorite: Option<bool>,
    pub comments: Vec<Comment>,
}

/// Lending state of a book record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingState {
    Available,
    Borrowed,
}

impl Book {
    pub fn lending_state(&self) -> LendingState {
        if self.is_borrowed {
            LendingState::Borrowed
        } else {
            LendingState::Available
        }
    }

    /// Apply a partial update, field by field.
    ///
    /// Merge policy: only fields the caller supplied are overwritten; an
    /// omitted field never clears the stored value. Identity, lending state,
    /// favorite flag, comments and creation time are never touched here.
    pub fn apply_update(&mut self, update: UpdateBook, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(genre) = update.genre {
            self.genre = genre;
        }
        if let Some(publication_date) = update.publication_date {
            self.publication_date = publication_date;
        }
        self.updated_at = Some(now);
    }
}

/// A comment on a book. Comments live and die with their parent record;
/// there is no operation to edit or remove one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: CallerId,
}

/// Opaque identity of the caller, supplied by the hosting transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerId(pub String);

/// Create book request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "genre must not be empty"))]
    pub genre: String,
    pub publication_date: DateTime<Utc>,
}

/// Partial update request; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "genre must not be empty"))]
    pub genre: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}
