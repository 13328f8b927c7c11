//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Delete, Read, RepositoryError, Update};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use async_trait::async_trait;
use sqlx::MySqlPool;

const USER_COLUMNS: &str = "id, email, username, password, first_name, last_name, is_active, \
     is_admin, last_login_at, created_at, updated_at, deleted_at";

/// Contratto di persistenza per le identità.
///
/// Le ricerche ignorano sempre gli utenti soft-deleted. Il vincolo di unicità
/// sullo storage resta l'unica garanzia reale contro registrazioni concorrenti:
/// `exists_by_*` è solo un controllo veloce lato applicazione.
#[async_trait]
pub trait UserRepository:
    Create<User, CreateUserDTO>
    + Read<User, i64>
    + Update<User, UpdateUserDTO, i64>
    + Delete<i64>
    + Send
    + Sync
{
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError>;

    async fn update_last_login(&self, id: &i64) -> Result<(), RepositoryError>;

    /// `password_hash` deve essere già hashata
    async fn update_password(&self, id: &i64, password_hash: &str) -> Result<(), RepositoryError>;

    /// Verifica che lo storage risponda (usato dagli health check)
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// USER REPO
pub struct MySqlUserRepository {
    connection_pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(connection_pool: MySqlPool) -> MySqlUserRepository {
        Self { connection_pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = ? AND deleted_at IS NULL"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }

    async fn exists_by_column(&self, column: &str, value: &str) -> Result<bool, RepositoryError> {
        let query = format!(
            "SELECT COUNT(*) FROM users WHERE {column} = ? AND deleted_at IS NULL"
        );
        let count: i64 = sqlx::query_scalar(&query)
            .bind(value)
            .fetch_one(&self.connection_pool)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl Create<User, CreateUserDTO> for MySqlUserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<User, RepositoryError> {
        // Nuovi account: attivi e non admin
        let result = sqlx::query(
            "INSERT INTO users (email, username, password, first_name, last_name, is_active, is_admin) \
             VALUES (?, ?, ?, ?, ?, TRUE, FALSE)",
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i64;

        self.read(&new_id).await?.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl Read<User, i64> for MySqlUserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl Update<User, UpdateUserDTO, i64> for MySqlUserRepository {
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> Result<User, RepositoryError> {
        // rows_affected non basta: MySQL conta 0 anche quando i valori non cambiano
        sqlx::query(
            "UPDATE users SET \
                username = COALESCE(?, username), \
                first_name = COALESCE(?, first_name), \
                last_name = COALESCE(?, last_name), \
                is_active = COALESCE(?, is_active), \
                is_admin = COALESCE(?, is_admin) \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.is_active)
        .bind(data.is_admin)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl Delete<i64> for MySqlUserRepository {
    /// Soft delete: l'account viene marcato e disattivato, mai rimosso
    async fn delete(&self, id: &i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = CURRENT_TIMESTAMP(6), is_active = FALSE \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_by_column("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_by_column("username", username).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        self.exists_by_column("email", email).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        self.exists_by_column("username", username).await
    }

    async fn update_last_login(&self, id: &i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = CURRENT_TIMESTAMP(6) WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_password(&self, id: &i64, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }
}
