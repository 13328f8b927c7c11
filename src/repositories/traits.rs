//! Common repository traits
//!
//! This module defines generic interfaces for database operations.
//! The traits are object safe (`async_trait`) so services can hold
//! `Arc<dyn ...Repository>` and swap the MySQL backend for the in-memory one.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by every repository implementation
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the requested key
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("duplicate value: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Trait for creating new entities in the database
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with ID assigned by the database)
/// * `CreateDTO` - DTO for creation (without ID, will be automatically generated)
#[async_trait]
pub trait Create<Entity, CreateDTO> {
    /// Creates a new entity in the database
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity with ID assigned by the database
    /// * `Err(RepositoryError::Conflict)` - A unique key already exists
    async fn create(&self, data: &CreateDTO) -> Result<Entity, RepositoryError>;
}

/// Trait for reading a single entity by primary key
///
/// Soft-deleted rows are never returned.
#[async_trait]
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that ID
    async fn read(&self, id: &Id) -> Result<Option<Entity>, RepositoryError>;
}

/// Trait for updating existing entities
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - DTO for updating (optional fields for partial updates)
/// * `Id` - Type of the primary key
#[async_trait]
pub trait Update<Entity, UpdateDTO, Id> {
    /// Updates an existing entity; only `Some(_)` fields are modified
    ///
    /// # Returns
    /// * `Ok(Entity)` - Updated entity
    /// * `Err(RepositoryError::NotFound)` - Entity not found
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, RepositoryError>;
}

/// Trait for (soft) deleting entities
#[async_trait]
pub trait Delete<Id> {
    /// # Returns
    /// * `Ok(())` - Deletion successful
    /// * `Err(RepositoryError::NotFound)` - Entity not found
    async fn delete(&self, id: &Id) -> Result<(), RepositoryError>;
}
