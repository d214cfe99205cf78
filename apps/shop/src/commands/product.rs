//! # Product Commands
//!
//! Storefront browsing and admin catalog maintenance.

use serde::Serialize;
use tracing::{debug, info};

use okaybruh_core::validation::{parse_price, parse_stock};
use okaybruh_core::{Catalog, Product, ProductDraft, ProductPatch};

use crate::error::ApiError;
use crate::state::Shop;

/// Admin form input as typed on the command line (unparsed numbers).
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub image: Option<String>,
}

/// Storefront listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    /// Category filter applied, if any.
    pub category: Option<String>,
    pub products: Vec<Product>,
    pub categories: Vec<String>,
}

/// Lists products, optionally narrowed to one category.
///
/// A blank category means all products.
pub async fn list_products(
    shop: &Shop,
    category: Option<&str>,
) -> Result<ProductListResponse, ApiError> {
    debug!(category = ?category, "list_products command");

    let catalog = Catalog::from_products(shop.backend().list_products().await?);
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    let products = match category {
        Some(c) => catalog.by_category(c).into_iter().cloned().collect(),
        None => catalog.list().to_vec(),
    };

    Ok(ProductListResponse {
        category: category.map(str::to_string),
        categories: catalog.categories().into_iter().map(str::to_string).collect(),
        products,
    })
}

/// The first `featured_count` products in catalog order.
pub async fn featured_products(shop: &Shop) -> Result<Vec<Product>, ApiError> {
    debug!("featured_products command");
    let catalog = Catalog::from_products(shop.backend().list_products().await?);
    Ok(catalog.featured(shop.config().featured_count).to_vec())
}

pub async fn get_product(shop: &Shop, id: i64) -> Result<Product, ApiError> {
    debug!(product_id = id, "get_product command");
    Ok(shop.backend().get_product(id).await?)
}

/// Creates a product from the admin form.
///
/// ## Validation
/// Name and price are required; price and stock must be non-negative
/// numbers. Nothing is written when any field is rejected.
pub async fn create_product(shop: &Shop, form: ProductForm) -> Result<Product, ApiError> {
    debug!(name = ?form.name, "create_product command");

    let name = form
        .name
        .ok_or_else(|| ApiError::invalid_input("Product name is required"))?;
    let price = form
        .price
        .as_deref()
        .ok_or_else(|| ApiError::invalid_input("Product price is required"))
        .and_then(|raw| parse_price(raw).map_err(ApiError::from))?;
    let stock = form.stock.as_deref().map(parse_stock).transpose()?;

    let draft = ProductDraft {
        name,
        description: form.description,
        category: form.category,
        price,
        stock,
        image: form.image,
    };

    let product = shop.backend().create_product(draft).await?;
    info!(product_id = product.id, name = %product.name, "Product created");
    Ok(product)
}

/// Applies the given fields to an existing product.
pub async fn update_product(shop: &Shop, id: i64, form: ProductForm) -> Result<Product, ApiError> {
    debug!(product_id = id, "update_product command");

    let patch = ProductPatch {
        name: form.name,
        description: form.description,
        category: form.category,
        price: form.price.as_deref().map(parse_price).transpose()?,
        stock: form.stock.as_deref().map(parse_stock).transpose()?,
        image: form.image,
    };
    if patch.is_empty() {
        return Err(ApiError::invalid_input("Nothing to update"));
    }

    let product = shop.backend().update_product(id, patch).await?;
    info!(product_id = id, "Product updated");
    Ok(product)
}

/// Deletes a product. Existing cart lines and orders keep their copies.
pub async fn delete_product(shop: &Shop, id: i64) -> Result<(), ApiError> {
    debug!(product_id = id, "delete_product command");
    shop.backend().delete_product(id).await?;
    info!(product_id = id, "Product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::shop;
    use crate::error::ErrorCode;
    use okaybruh_core::{Money, PLACEHOLDER_IMAGE};

    #[tokio::test]
    async fn test_list_and_filter() {
        let shop = shop().await;

        let all = list_products(&shop, None).await.unwrap();
        assert_eq!(all.products.len(), 6);
        assert!(all.categories.contains(&"Tees".to_string()));

        let tees = list_products(&shop, Some("tees")).await.unwrap();
        assert!(!tees.products.is_empty());
        assert!(tees.products.iter().all(|p| p.in_category("Tees")));

        let blank = list_products(&shop, Some("  ")).await.unwrap();
        assert_eq!(blank.products.len(), 6);
        assert!(blank.category.is_none());

        let featured = featured_products(&shop).await.unwrap();
        assert_eq!(featured.len(), 4);
        assert_eq!(featured[0].id, 1);
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let shop = shop().await;
        let product = create_product(
            &shop,
            ProductForm {
                name: Some("Tote Bag".into()),
                price: Some("14.50".into()),
                ..ProductForm::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(product.id, 7);
        assert_eq!(product.price, Money::from_cents(1450));
        assert_eq!(product.stock, 0);
        assert_eq!(product.description, "");
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let shop = shop().await;

        let missing_price = ProductForm {
            name: Some("Tote Bag".into()),
            ..ProductForm::default()
        };
        let err = create_product(&shop, missing_price).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let bad_price = ProductForm {
            name: Some("Tote Bag".into()),
            price: Some("abc".into()),
            ..ProductForm::default()
        };
        let err = create_product(&shop, bad_price).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        assert_eq!(list_products(&shop, None).await.unwrap().products.len(), 6);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let shop = shop().await;

        let updated = update_product(
            &shop,
            3,
            ProductForm {
                price: Some("19.99".into()),
                ..ProductForm::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, Money::from_cents(1999));

        let err = update_product(&shop, 3, ProductForm::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        delete_product(&shop, 3).await.unwrap();
        let err = get_product(&shop, 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = delete_product(&shop, 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
