//! Catalog repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide validated product CRUD and name search.
//! - Own the guarded stock adjustment.
//!
//! # Invariants
//! - `adjust_stock` reads, checks and writes inside one transaction; stock
//!   never goes negative.

use crate::db::DbError;
use crate::model::catalog::{CatalogValidationError, Product, ProductId};
use crate::repo::{ensure_schema, SchemaError, TableSpec};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PRODUCT_SELECT_SQL: &str =
    "SELECT uuid, name, description, category, price_cents, stock FROM products";

const REQUIRED_TABLES: &[TableSpec] = &[TableSpec {
    table: "products",
    columns: &["uuid", "name", "description", "category", "price_cents", "stock"],
}];

pub type CatalogRepoResult<T> = Result<T, CatalogRepoError>;

/// Repository error for catalog persistence operations.
#[derive(Debug)]
pub enum CatalogRepoError {
    Validation(CatalogValidationError),
    Db(DbError),
    Schema(SchemaError),
    ProductNotFound(ProductId),
    /// Adjustment would drive stock below zero.
    InsufficientStock {
        product: ProductId,
        stock: i64,
        requested: i64,
    },
    InvalidData(String),
}

impl Display for CatalogRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::InsufficientStock {
                product,
                stock,
                requested,
            } => write!(
                f,
                "insufficient stock for product {product}: have {stock}, adjustment {requested}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for CatalogRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogValidationError> for CatalogRepoError {
    fn from(value: CatalogValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for CatalogRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SchemaError> for CatalogRepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<rusqlite::Error> for CatalogRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the catalog context.
pub trait CatalogRepository {
    fn create_product(&self, product: &Product) -> CatalogRepoResult<ProductId>;
    fn update_product(&self, product: &Product) -> CatalogRepoResult<()>;
    fn get_product(&self, id: ProductId) -> CatalogRepoResult<Option<Product>>;
    fn list_products(&self) -> CatalogRepoResult<Vec<Product>>;
    /// Case-insensitive substring match on product name.
    fn search_products(&self, term: &str) -> CatalogRepoResult<Vec<Product>>;
    fn delete_product(&self, id: ProductId) -> CatalogRepoResult<()>;
    /// Applies a signed stock delta; refuses adjustments below zero.
    fn adjust_stock(&self, id: ProductId, delta: i64) -> CatalogRepoResult<Product>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogRepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_product(&self, product: &Product) -> CatalogRepoResult<ProductId> {
        product.validate()?;

        self.conn.execute(
            "INSERT INTO products (uuid, name, description, category, price_cents, stock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                product.uuid.to_string(),
                product.name.as_str(),
                product.description.as_str(),
                product.category.as_str(),
                product.price_cents,
                product.stock,
            ],
        )?;

        Ok(product.uuid)
    }

    fn update_product(&self, product: &Product) -> CatalogRepoResult<()> {
        product.validate()?;

        let changed = self.conn.execute(
            "UPDATE products
             SET name = ?2, description = ?3, category = ?4, price_cents = ?5, stock = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                product.uuid.to_string(),
                product.name.as_str(),
                product.description.as_str(),
                product.category.as_str(),
                product.price_cents,
                product.stock,
            ],
        )?;

        if changed == 0 {
            return Err(CatalogRepoError::ProductNotFound(product.uuid));
        }

        Ok(())
    }

    fn get_product(&self, id: ProductId) -> CatalogRepoResult<Option<Product>> {
        read_product(self.conn, id)
    }

    fn list_products(&self) -> CatalogRepoResult<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn search_products(&self, term: &str) -> CatalogRepoResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT_SQL}
             WHERE name LIKE '%' || ?1 || '%'
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([term])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn delete_product(&self, id: ProductId) -> CatalogRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(CatalogRepoError::ProductNotFound(id));
        }
        Ok(())
    }

    fn adjust_stock(&self, id: ProductId, delta: i64) -> CatalogRepoResult<Product> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut product = match read_product(&tx, id)? {
            Some(product) => product,
            None => return Err(CatalogRepoError::ProductNotFound(id)),
        };

        let new_stock = product.stock + delta;
        if new_stock < 0 {
            return Err(CatalogRepoError::InsufficientStock {
                product: id,
                stock: product.stock,
                requested: delta,
            });
        }

        tx.execute(
            "UPDATE products
             SET stock = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), new_stock],
        )?;
        tx.commit()?;

        product.stock = new_stock;
        info!(
            "event=adjust_stock module=catalog status=ok product={id} delta={delta} stock={new_stock}"
        );
        Ok(product)
    }
}

fn read_product(conn: &Connection, id: ProductId) -> CatalogRepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT_SQL} WHERE uuid = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_product_row(row)?));
    }
    Ok(None)
}

fn parse_product_row(row: &Row<'_>) -> CatalogRepoResult<Product> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        CatalogRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in products.uuid"))
    })?;

    let product = Product {
        uuid,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        price_cents: row.get("price_cents")?,
        stock: row.get("stock")?,
    };
    product.validate()?;
    Ok(product)
}
