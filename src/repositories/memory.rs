//! Repository in memoria
//!
//! Stessa semantica dei repository MySQL (soft delete, unicità tra i record vivi),
//! senza database. Usati dai test di integrazione e dagli unit test dei manager.
//! Ogni chiamata viene registrata in `calls()` per poter verificare quali
//! operazioni di persistenza sono state eseguite.

use super::{
    Create, Delete, ProductFilter, ProductRepository, Read, RepositoryError, Update,
    UserRepository,
};
use crate::dtos::{CreateProductDTO, CreateUserDTO, UpdateProductDTO, UpdateUserDTO};
use crate::entities::{Product, User};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
    calls: Vec<&'static str>,
}

// derive(Default) richiederebbe T: Default
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
            calls: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

// ************************* USERS ************************* //

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table<User>>,
    fail_last_login: bool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variante in cui `update_last_login` fallisce sempre
    pub fn with_failing_last_login() -> Self {
        Self {
            fail_last_login: true,
            ..Self::default()
        }
    }

    /// Nomi delle operazioni invocate, in ordine
    pub async fn calls(&self) -> Vec<&'static str> {
        self.table.lock().await.calls.clone()
    }

    /// Utente per id, inclusi i soft-deleted
    pub async fn raw(&self, id: i64) -> Option<User> {
        self.table.lock().await.rows.iter().find(|u| u.id == id).cloned()
    }
}

fn live_user<'a>(rows: &'a mut [User], id: i64) -> Option<&'a mut User> {
    rows.iter_mut().find(|u| u.id == id && u.deleted_at.is_none())
}

#[async_trait]
impl Create<User, CreateUserDTO> for InMemoryUserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<User, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("create");

        let live = table.rows.iter().filter(|u| u.deleted_at.is_none());
        for user in live {
            if user.email == data.email {
                return Err(RepositoryError::Conflict("email".to_string()));
            }
            if user.username == data.username {
                return Err(RepositoryError::Conflict("username".to_string()));
            }
        }

        let now = Utc::now();
        let user = User {
            id: table.next_id(),
            email: data.email.clone(),
            username: data.username.clone(),
            password: data.password.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            is_active: true,
            is_admin: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl Read<User, i64> for InMemoryUserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("read");
        Ok(live_user(&mut table.rows, *id).map(|u| u.clone()))
    }
}

#[async_trait]
impl Update<User, UpdateUserDTO, i64> for InMemoryUserRepository {
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> Result<User, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("update");

        if let Some(username) = &data.username {
            let taken = table
                .rows
                .iter()
                .any(|u| u.id != *id && u.deleted_at.is_none() && &u.username == username);
            if taken {
                return Err(RepositoryError::Conflict("username".to_string()));
            }
        }

        let user = live_user(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        if let Some(username) = &data.username {
            user.username = username.clone();
        }
        if let Some(first_name) = &data.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &data.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(is_active) = data.is_active {
            user.is_active = is_active;
        }
        if let Some(is_admin) = data.is_admin {
            user.is_admin = is_admin;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl Delete<i64> for InMemoryUserRepository {
    async fn delete(&self, id: &i64) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("delete");
        let user = live_user(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        user.deleted_at = Some(Utc::now());
        user.is_active = false;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("find_by_email");
        Ok(table
            .rows
            .iter()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("find_by_username");
        Ok(table
            .rows
            .iter()
            .find(|u| u.deleted_at.is_none() && u.username == username)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("exists_by_email");
        Ok(table
            .rows
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("exists_by_username");
        Ok(table
            .rows
            .iter()
            .any(|u| u.deleted_at.is_none() && u.username == username))
    }

    async fn update_last_login(&self, id: &i64) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("update_last_login");
        if self.fail_last_login {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let user = live_user(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        user.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn update_password(&self, id: &i64, password_hash: &str) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("update_password");
        let user = live_user(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        user.password = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// ************************* PRODUCTS ************************* //

#[derive(Default)]
pub struct InMemoryProductRepository {
    table: Mutex<Table<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn live_product<'a>(rows: &'a mut [Product], id: i64) -> Option<&'a mut Product> {
    rows.iter_mut().find(|p| p.id == id && p.deleted_at.is_none())
}

#[async_trait]
impl Create<Product, CreateProductDTO> for InMemoryProductRepository {
    async fn create(&self, data: &CreateProductDTO) -> Result<Product, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("create");
        let now = Utc::now();
        let product = Product {
            id: table.next_id(),
            name: data.name.clone(),
            description: data.description.clone(),
            price: data.price,
            stock: data.stock,
            category: data.category.clone(),
            image_url: data.image_url.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.push(product.clone());
        Ok(product)
    }
}

#[async_trait]
impl Read<Product, i64> for InMemoryProductRepository {
    async fn read(&self, id: &i64) -> Result<Option<Product>, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("read");
        Ok(live_product(&mut table.rows, *id).map(|p| p.clone()))
    }
}

#[async_trait]
impl Update<Product, UpdateProductDTO, i64> for InMemoryProductRepository {
    async fn update(&self, id: &i64, data: &UpdateProductDTO) -> Result<Product, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("update");
        let product = live_product(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &data.name {
            product.name = name.clone();
        }
        if let Some(description) = &data.description {
            product.description = description.clone();
        }
        if let Some(price) = data.price {
            product.price = price;
        }
        if let Some(stock) = data.stock {
            product.stock = stock;
        }
        if let Some(category) = &data.category {
            product.category = category.clone();
        }
        if let Some(image_url) = &data.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(is_active) = data.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

#[async_trait]
impl Delete<i64> for InMemoryProductRepository {
    async fn delete(&self, id: &i64) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("delete");
        let product = live_product(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        product.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("list");
        Ok(table
            .rows
            .iter()
            .filter(|p| filter.matches(p))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("count");
        Ok(table.rows.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("exists_by_name");
        Ok(table
            .rows
            .iter()
            .any(|p| p.deleted_at.is_none() && p.name == name))
    }

    async fn update_stock(&self, id: &i64, stock: i32) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("update_stock");
        let product = live_product(&mut table.rows, *id).ok_or(RepositoryError::NotFound)?;
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn bulk_update_status(&self, ids: &[i64], is_active: bool) -> Result<u64, RepositoryError> {
        let mut table = self.table.lock().await;
        table.calls.push("bulk_update_status");
        let mut updated = 0;
        for product in table
            .rows
            .iter_mut()
            .filter(|p| p.deleted_at.is_none() && ids.contains(&p.id))
        {
            product.is_active = is_active;
            product.updated_at = Utc::now();
            updated += 1;
        }
        Ok(updated)
    }
}
