//! Catalog management service
//!
//! All public record operations enter here: CRUD with validation, the
//! borrow/return lending transitions, the favorite guard, comment appends
//! and substring search. The hosting environment serializes invocations, so
//! every read-modify-write below is atomic by construction.

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    id::{self, IdGenerator},
    models::{Book, CallerId, Comment, CreateBook, LendingState, UpdateBook},
    repository::Repository,
};

pub struct CatalogService {
    repository: Repository,
    ids: Box<dyn IdGenerator>,
}

impl CatalogService {
    pub fn new(repository: Repository, ids: Box<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    /// Add a new book to the catalog
    pub fn add_book(&mut self, input: CreateBook) -> AppResult<Book> {
        input.validate()?;

        let now = Utc::now();
        let book = Book {
            id: self.ids.new_id(),
            title: input.title,
            author: input.author,
            genre: input.genre,
            publication_date: input.publication_date,
            created_at: now,
            updated_at: Some(now),
            is_borrowed: false,
            favorite: None,
            comments: Vec::new(),
        };

        self.repository.books.insert(&book.id, &book)?;
        tracing::info!("Added book id={} title={:?}", book.id, book.title);

        Ok(book)
    }

    /// Get a book by id
    pub fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id={} not found", id)))
    }

    /// Get all books in ascending id order
    pub fn get_books(&self) -> Vec<Book> {
        self.repository.books.values()
    }

    /// Update the bibliographic fields of an existing book.
    ///
    /// Only fields present in `input` are overwritten; lending state,
    /// favorite flag, comments and creation time are preserved.
    pub fn update_book(&mut self, id: &str, input: UpdateBook) -> AppResult<Book> {
        let mut book = self.get_book(id)?;
        input.validate()?;

        book.apply_update(input, Utc::now());
        self.repository.books.insert(id, &book)?;

        Ok(book)
    }

    /// Delete a book, returning the removed record
    pub fn delete_book(&mut self, id: &str) -> AppResult<Book> {
        if !id::is_valid_id(id) {
            return Err(AppError::InvalidId(format!(
                "{} is not a well-formed book id",
                id
            )));
        }

        let deleted = self
            .repository
            .books
            .remove(id)?
            .ok_or_else(|| AppError::NotFound(format!("Book with id={} not found", id)))?;

        tracing::info!("Deleted book id={}", id);
        Ok(deleted)
    }

    /// Borrow a book: Available -> Borrowed
    pub fn borrow_book(&mut self, id: &str) -> AppResult<Book> {
        let mut book = self.get_book(id)?;

        match book.lending_state() {
            LendingState::Borrowed => Err(AppError::StateConflict(format!(
                "Book with id={} is already borrowed",
                id
            ))),
            LendingState::Available => {
                book.is_borrowed = true;
                self.repository.books.insert(id, &book)?;
                tracing::debug!("Borrowed book id={}", id);
                Ok(book)
            }
        }
    }

    /// Return a borrowed book: Borrowed -> Available
    pub fn return_book(&mut self, id: &str) -> AppResult<Book> {
        let mut book = self.get_book(id)?;

        match book.lending_state() {
            LendingState::Available => Err(AppError::StateConflict(format!(
                "Book with id={} is not currently borrowed",
                id
            ))),
            LendingState::Borrowed => {
                book.is_borrowed = false;
                self.repository.books.insert(id, &book)?;
                tracing::debug!("Returned book id={}", id);
                Ok(book)
            }
        }
    }

    /// Mark an available book as a favorite
    pub fn favorite_book(&mut self, id: &str) -> AppResult<Book> {
        let mut book = self.get_book(id)?;

        match book.lending_state() {
            LendingState::Borrowed => Err(AppError::StateConflict(
                "Cannot mark a borrowed book as a favorite".to_string(),
            )),
            LendingState::Available => {
                book.favorite = Some(true);
                self.repository.books.insert(id, &book)?;
                Ok(book)
            }
        }
    }

    /// Append a comment to a book's thread and return it
    pub fn comment_on_book(
        &mut self,
        id: &str,
        text: String,
        caller: CallerId,
    ) -> AppResult<Comment> {
        let mut book = self.get_book(id)?;

        let comment = Comment {
            id: self.ids.new_id(),
            text,
            created_at: Utc::now(),
            author: caller,
        };

        book.comments.push(comment.clone());
        self.repository.books.insert(id, &book)?;

        Ok(comment)
    }

    /// Case-insensitive substring search over title, author and genre.
    ///
    /// Results keep the store's ascending id order; an empty query matches
    /// every book.
    pub fn search_books(&self, query: &str) -> AppResult<Vec<Book>> {
        let needle = query.to_lowercase();

        let matches = self
            .repository
            .books
            .values()
            .into_iter()
            .filter(|book| {
                book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
                    || book.genre.to_lowercase().contains(&needle)
            })
            .collect();

        Ok(matches)
    }
}
