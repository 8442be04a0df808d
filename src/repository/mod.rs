//! Repository layer for durable record storage

pub mod books;

use std::path::Path;

use crate::{config::StorageConfig, error::AppResult};

/// Main repository struct owning the durable stores
pub struct Repository {
    pub books: books::BookStore,
}

impl Repository {
    /// Open all stores described by the storage configuration
    pub fn open(config: &StorageConfig) -> AppResult<Self> {
        Ok(Self {
            books: books::BookStore::open(
                Path::new(&config.path),
                config.max_key_bytes,
                config.max_value_bytes,
            )?,
        })
    }
}
