//! ProductRepository - Repository per il catalogo prodotti

use super::{Create, Delete, Read, RepositoryError, Update};
use crate::dtos::{CreateProductDTO, UpdateProductDTO};
use crate::entities::Product;
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category, image_url, \
     is_active, created_at, updated_at, deleted_at";

/// Criteri di filtro per la lista prodotti. I campi `None` non filtrano.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Match esatto sulla categoria
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_active: Option<bool>,
    /// Sottostringa di nome o descrizione, case-insensitive
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    /// Stessa semantica della clausola WHERE, valutata in memoria
    pub fn matches(&self, product: &Product) -> bool {
        if product.deleted_at.is_some() {
            return false;
        }
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if product.is_active != active {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, MySql>) {
        builder.push(" WHERE deleted_at IS NULL");
        if let Some(category) = &self.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(min) = self.min_price {
            builder.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            builder.push(" AND price <= ").push_bind(max);
        }
        if let Some(active) = self.is_active {
            builder.push(" AND is_active = ").push_bind(active);
        }
        if let Some(term) = &self.search {
            let pattern = like_pattern(term);
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\\\' OR LOWER(description) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\\\')");
        }
    }
}

/// `%term%` con i metacaratteri di LIKE trattati come letterali,
/// così la ricerca SQL coincide con `matches`
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
pub trait ProductRepository:
    Create<Product, CreateProductDTO>
    + Read<Product, i64>
    + Update<Product, UpdateProductDTO, i64>
    + Delete<i64>
    + Send
    + Sync
{
    /// Pagina di prodotti ordinata per id
    async fn list(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError>;

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError>;

    async fn update_stock(&self, id: &i64, stock: i32) -> Result<(), RepositoryError>;

    /// Ritorna il numero di prodotti aggiornati
    async fn bulk_update_status(&self, ids: &[i64], is_active: bool) -> Result<u64, RepositoryError>;
}

pub struct MySqlProductRepository {
    connection_pool: MySqlPool,
}

impl MySqlProductRepository {
    pub fn new(connection_pool: MySqlPool) -> MySqlProductRepository {
        Self { connection_pool }
    }
}

#[async_trait]
impl Create<Product, CreateProductDTO> for MySqlProductRepository {
    async fn create(&self, data: &CreateProductDTO) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO products (name, description, price, stock, category, image_url, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, TRUE)",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(&data.category)
        .bind(&data.image_url)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i64;

        self.read(&new_id).await?.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl Read<Product, i64> for MySqlProductRepository {
    async fn read(&self, id: &i64) -> Result<Option<Product>, RepositoryError> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND deleted_at IS NULL");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(product)
    }
}

#[async_trait]
impl Update<Product, UpdateProductDTO, i64> for MySqlProductRepository {
    async fn update(&self, id: &i64, data: &UpdateProductDTO) -> Result<Product, RepositoryError> {
        sqlx::query(
            "UPDATE products SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                price = COALESCE(?, price), \
                stock = COALESCE(?, stock), \
                category = COALESCE(?, category), \
                image_url = COALESCE(?, image_url), \
                is_active = COALESCE(?, is_active) \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(&data.category)
        .bind(&data.image_url)
        .bind(data.is_active)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl Delete<i64> for MySqlProductRepository {
    /// Soft delete
    async fn delete(&self, id: &i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = CURRENT_TIMESTAMP(6) WHERE id = ? AND deleted_at IS NULL",
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
impl ProductRepository for MySqlProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = QueryBuilder::<MySql>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        filter.push_where(&mut builder);
        builder
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(products)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM products");
        filter.push_where(&mut builder);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        Ok(total)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE name = ? AND deleted_at IS NULL",
        )
        .bind(name)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    async fn update_stock(&self, id: &i64, stock: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET stock = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(stock)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        // 0 righe anche quando lo stock è invariato: distinguere con una lettura
        if result.rows_affected() == 0 && self.read(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn bulk_update_status(&self, ids: &[i64], is_active: bool) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<MySql>::new("UPDATE products SET is_active = ");
        builder.push_bind(is_active);
        builder.push(" WHERE deleted_at IS NULL AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&self.connection_pool).await?;
        Ok(result.rows_affected())
    }
}
