use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Criteria, Entity, EntityId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Entity has no identifier: {0}")]
    MissingId(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The REST collaborator for one entity kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    async fn list(&self, criteria: &Criteria) -> RepositoryResult<Vec<E>>;
    async fn get(&self, id: EntityId) -> RepositoryResult<E>;
    async fn create(&self, entity: &E) -> RepositoryResult<E>;
    /// Full replace (PUT).
    async fn update(&self, entity: &E) -> RepositoryResult<E>;
    /// Merge of the non-empty fields (PATCH).
    async fn partial_update(&self, entity: &E) -> RepositoryResult<E>;
    async fn delete(&self, id: EntityId) -> RepositoryResult<()>;
}
