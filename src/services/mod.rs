//! Business logic services

pub mod catalog;

use crate::{id::IdGenerator, repository::Repository};

/// Container for all services
pub struct Services {
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository and id capability
    pub fn new(repository: Repository, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository, ids),
        }
    }
}
