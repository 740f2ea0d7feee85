use thiserror::Error;

use crate::{
    db_types::{NewProduct, NewVariation, Product, ProductUpdate, ProductVariation},
    traits::data_objects::ProductWithVariations,
};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Product variation #{0} does not exist")]
    VariationNotFound(i64),
    #[error("The SKU {0} is already in use")]
    DuplicateSku(String),
    #[error("Invalid product data. {0}")]
    ValidationError(String),
    #[error("The requested product change would result in a no-op.")]
    ProductModificationNoOp,
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// The product catalog the storefront sells from. Stock is tracked per variation.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Stores a product and its initial variations atomically.
    async fn create_product(&self, product: NewProduct) -> Result<ProductWithVariations, CatalogError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<ProductWithVariations>, CatalogError>;

    /// All products, optionally including the ones that have been deactivated, ordered by name.
    async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<ProductWithVariations>, CatalogError>;

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogError>;

    async fn add_variation(&self, product_id: i64, variation: NewVariation) -> Result<ProductVariation, CatalogError>;

    async fn set_variation_stock(&self, variation_id: i64, stock: i64) -> Result<ProductVariation, CatalogError>;
}
