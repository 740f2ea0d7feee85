use chrono::Utc;
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Centavos, NewProduct, NewVariation, Product, ProductUpdate, ProductVariation},
    traits::{data_objects::ProductWithVariations, CatalogError},
};

/// A variation joined with the product fields an order needs to snapshot
#[derive(Debug, Clone, FromRow)]
pub struct SellableVariation {
    pub variation_id: i64,
    pub variation_name: String,
    pub stock: i64,
    pub product_name: String,
    pub price: Centavos,
    pub active: bool,
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let now = Utc::now();
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.image_url)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} '{}' created", product.id, product.name);
    Ok(product)
}

pub async fn insert_variation(
    product_id: i64,
    variation: NewVariation,
    conn: &mut SqliteConnection,
) -> Result<ProductVariation, CatalogError> {
    let sku = variation.sku.clone();
    let result = sqlx::query_as::<_, ProductVariation>(
        r#"
            INSERT INTO product_variations (product_id, name, sku, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(product_id)
    .bind(variation.name)
    .bind(variation.sku)
    .bind(variation.stock)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(v) => Ok(v),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(CatalogError::DuplicateSku(sku.unwrap_or_default()))
        },
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(CatalogError::ProductNotFound(product_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await
}

pub async fn fetch_variations(product_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ProductVariation>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM product_variations WHERE product_id = $1 ORDER BY id")
        .bind(product_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_product_with_variations(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductWithVariations>, sqlx::Error> {
    let Some(product) = fetch_product(product_id, conn).await? else {
        return Ok(None);
    };
    let variations = fetch_variations(product_id, conn).await?;
    Ok(Some(ProductWithVariations { product, variations }))
}

pub async fn fetch_products(
    include_inactive: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductWithVariations>, sqlx::Error> {
    let sql = if include_inactive {
        "SELECT * FROM products ORDER BY name"
    } else {
        "SELECT * FROM products WHERE active = TRUE ORDER BY name"
    };
    let products: Vec<Product> = sqlx::query_as(sql).fetch_all(&mut *conn).await?;
    let mut result = Vec::with_capacity(products.len());
    for product in products {
        let variations = fetch_variations(product.id, conn).await?;
        result.push(ProductWithVariations { product, variations });
    }
    Ok(result)
}

pub async fn update_product(
    product_id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for product #{product_id}. Update request skipped.");
        return Err(CatalogError::ProductModificationNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(", ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(url);
    }
    if let Some(active) = update.active {
        set_clause.push("active = ");
        set_clause.push_bind_unseparated(active);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    product.ok_or(CatalogError::ProductNotFound(product_id))
}

pub async fn set_stock(
    variation_id: i64,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductVariation>, sqlx::Error> {
    sqlx::query_as("UPDATE product_variations SET stock = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(stock)
        .bind(Utc::now())
        .bind(variation_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_sellable_variation(
    variation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<SellableVariation>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT v.id AS variation_id, v.name AS variation_name, v.stock, p.name AS product_name, p.price, p.active
        FROM product_variations v JOIN products p ON v.product_id = p.id
        WHERE v.id = $1
        "#,
    )
    .bind(variation_id)
    .fetch_optional(conn)
    .await
}

/// Adds `delta` (which may be negative) to the stock of a variation. Returns `false`, leaving stock untouched, if the
/// result would be negative.
pub async fn adjust_stock(variation_id: i64, delta: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE product_variations SET stock = stock + $1, updated_at = $2 WHERE id = $3 AND stock + $1 >= 0")
            .bind(delta)
            .bind(Utc::now())
            .bind(variation_id)
            .execute(conn)
            .await?;
    trace!("🗃️ Stock for variation #{variation_id} adjusted by {delta}");
    Ok(result.rows_affected() == 1)
}
