//! Libris Library Catalog Record Service
//!
//! A persistent book-record service: CRUD with validation, a two-state
//! lending workflow (borrow/return), per-book favorite flags and append-only
//! comment threads, and case-insensitive substring search, all on top of a
//! durable ordered record store.
//!
//! Transport, authentication and identifier generation are external
//! collaborators: callers pass an opaque [`models::CallerId`] where needed
//! and inject an [`id::IdGenerator`] at service construction.

pub mod config;
pub mod error;
pub mod id;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
