//! Product catalog use-case service.
//!
//! # Responsibility
//! - Provide validated product CRUD, name search and guarded stock
//!   adjustments.
//!
//! # Invariants
//! - Stock never goes negative; the repository owns the transactional
//!   check-then-write.

use crate::model::catalog::{CatalogValidationError, Product, ProductId};
use crate::repo::catalog_repo::{CatalogRepoError, CatalogRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    Validation(CatalogValidationError),
    ProductNotFound(ProductId),
    /// Adjustment would drive stock below zero.
    InsufficientStock {
        product: ProductId,
        stock: i64,
        requested: i64,
    },
    /// Persistence-layer failure.
    Repo(CatalogRepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::InsufficientStock {
                product,
                stock,
                requested,
            } => write!(
                f,
                "insufficient stock for product {product}: have {stock}, adjustment {requested}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogRepoError> for CatalogServiceError {
    fn from(value: CatalogRepoError) -> Self {
        match value {
            CatalogRepoError::Validation(err) => Self::Validation(err),
            CatalogRepoError::ProductNotFound(id) => Self::ProductNotFound(id),
            CatalogRepoError::InsufficientStock {
                product,
                stock,
                requested,
            } => Self::InsufficientStock {
                product,
                stock,
                requested,
            },
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over repository implementations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one validated product.
    pub fn add_product(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price_cents: i64,
        stock: i64,
    ) -> Result<Product, CatalogServiceError> {
        let product = Product::new(name, description, category, price_cents, stock);
        self.repo.create_product(&product)?;
        Ok(product)
    }

    /// Updates an existing product by stable ID.
    pub fn update_product(&self, product: &Product) -> Result<(), CatalogServiceError> {
        Ok(self.repo.update_product(product)?)
    }

    /// Gets one product by stable ID.
    pub fn get_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, CatalogServiceError> {
        Ok(self.repo.get_product(product_id)?)
    }

    /// Lists the whole catalog.
    pub fn list_products(&self) -> Result<Vec<Product>, CatalogServiceError> {
        Ok(self.repo.list_products()?)
    }

    /// Searches products by name substring; blank terms list all.
    pub fn search_products(&self, term: &str) -> Result<Vec<Product>, CatalogServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(self.repo.list_products()?);
        }
        Ok(self.repo.search_products(term)?)
    }

    /// Removes one product by stable ID.
    pub fn remove_product(&self, product_id: ProductId) -> Result<(), CatalogServiceError> {
        Ok(self.repo.delete_product(product_id)?)
    }

    /// Applies a signed stock delta; refused when it would go negative.
    pub fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Product, CatalogServiceError> {
        Ok(self.repo.adjust_stock(product_id, delta)?)
    }
}
