use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Centavos, NewProduct, NewVariation, Product, ProductUpdate, ProductVariation},
    traits::{data_objects::ProductWithVariations, CatalogError, CatalogManagement},
};

/// Products, their variations and stock.
pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self, include_inactive: bool) -> Result<Vec<ProductWithVariations>, CatalogError> {
        self.db.fetch_products(include_inactive).await
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<ProductWithVariations>, CatalogError> {
        self.db.fetch_product(product_id).await
    }

    /// Adds a product to the catalog. Every product needs at least one variation.
    pub async fn create_product(&self, mut product: NewProduct) -> Result<ProductWithVariations, CatalogError> {
        product.name = product.name.trim().to_string();
        if product.name.is_empty() {
            return Err(CatalogError::ValidationError("A product name is required".into()));
        }
        check_price(product.price)?;
        if product.variations.is_empty() {
            return Err(CatalogError::ValidationError("A product needs at least one variation".into()));
        }
        product.variations.iter().try_for_each(check_variation)?;
        let product = self.db.create_product(product).await?;
        info!(
            "🔄️🌸️ Product #{} ({}) added with {} variations",
            product.product.id,
            product.product.name,
            product.variations.len()
        );
        Ok(product)
    }

    pub async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogError> {
        if update.is_empty() {
            return Err(CatalogError::ProductModificationNoOp);
        }
        if update.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CatalogError::ValidationError("A product name is required".into()));
        }
        if let Some(price) = update.price {
            check_price(price)?;
        }
        let product = self.db.update_product(product_id, update).await?;
        debug!("🔄️🌸️ Product #{product_id} updated. Active: {}", product.active);
        Ok(product)
    }

    pub async fn add_variation(&self, product_id: i64, variation: NewVariation) -> Result<ProductVariation, CatalogError> {
        check_variation(&variation)?;
        self.db.add_variation(product_id, variation).await
    }

    pub async fn set_stock(&self, variation_id: i64, stock: i64) -> Result<ProductVariation, CatalogError> {
        if stock < 0 {
            return Err(CatalogError::ValidationError("Stock cannot be negative".into()));
        }
        let variation = self.db.set_variation_stock(variation_id, stock).await?;
        debug!("🔄️🌸️ Stock for variation #{variation_id} set to {stock}");
        Ok(variation)
    }
}

fn check_price(price: Centavos) -> Result<(), CatalogError> {
    if price.is_positive() {
        Ok(())
    } else {
        Err(CatalogError::ValidationError(format!("The price must be positive, not {price}")))
    }
}

fn check_variation(variation: &NewVariation) -> Result<(), CatalogError> {
    if variation.name.trim().is_empty() {
        return Err(CatalogError::ValidationError("A variation name is required".into()));
    }
    if variation.stock < 0 {
        return Err(CatalogError::ValidationError(format!("Variation {} has negative stock", variation.name)));
    }
    Ok(())
}
