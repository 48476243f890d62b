//! Product catalog domain model.
//!
//! # Responsibility
//! - Define the product record used by the catalog service.
//! - Validate price/stock constraints before persistence.
//!
//! # Invariants
//! - `price_cents` is strictly positive.
//! - `stock` never goes negative; guarded adjustments are owned by the
//!   catalog repository.

use crate::model::is_blank;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a product record.
pub type ProductId = Uuid;

/// Field-level validation failures for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    BlankName,
    NonPositivePrice(i64),
    NegativeStock(i64),
}

impl Display for CatalogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "product name must not be blank"),
            Self::NonPositivePrice(value) => {
                write!(f, "product price must be positive, got {value} cents")
            }
            Self::NegativeStock(value) => {
                write!(f, "product stock must not be negative, got {value}")
            }
        }
    }
}

impl Error for CatalogValidationError {}

/// One sellable catalog item. Prices are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub uuid: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl Product {
    /// Creates a product with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price_cents: i64,
        stock: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            price_cents,
            stock,
        }
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        if is_blank(&self.name) {
            return Err(CatalogValidationError::BlankName);
        }
        if self.price_cents <= 0 {
            return Err(CatalogValidationError::NonPositivePrice(self.price_cents));
        }
        if self.stock < 0 {
            return Err(CatalogValidationError::NegativeStock(self.stock));
        }
        Ok(())
    }
}
