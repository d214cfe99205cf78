//! # Product Catalog
//!
//! CRUD over [`Product`] records plus the storefront read helpers
//! (category filter, featured strip).
//!
//! Products are kept in insertion order, which is also the listing order.
//! New ids are `max(existing) + 1`, or 1 for an empty catalog.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ProductDraft, ProductPatch};
use crate::validation::{validate_price, validate_product_name, validate_stock};

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/300x300";

/// The shop's product catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Wraps stored products as-is.
    pub fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// The built-in Okaybruh catalog used when nothing has been stored yet.
    pub fn with_defaults() -> Self {
        let seed = [
            (
                "Okaybruh Classic Tee",
                "Premium cotton t-shirt with Okaybruh logo",
                2999,
                "Tees",
                50,
                "667eea",
                "Classic+Tee",
            ),
            (
                "Okaybruh Hoodie",
                "Comfortable hoodie for all seasons",
                5999,
                "Hoodies",
                30,
                "764ba2",
                "Hoodie",
            ),
            (
                "Okaybruh Cap",
                "Stylish snapback cap",
                2499,
                "Accessories",
                40,
                "f093fb",
                "Cap",
            ),
            (
                "Okaybruh Stickers Pack",
                "Set of 10 vinyl stickers",
                999,
                "Accessories",
                100,
                "4facfe",
                "Stickers",
            ),
            (
                "Okaybruh Premium Tee",
                "Limited edition premium cotton tee",
                3499,
                "Tees",
                25,
                "43e97b",
                "Premium+Tee",
            ),
            (
                "Okaybruh Sweatshirt",
                "Cozy sweatshirt for chilly days",
                4999,
                "Hoodies",
                35,
                "fa709a",
                "Sweatshirt",
            ),
        ];

        let products = seed
            .iter()
            .zip(1..)
            .map(
                |(&(name, description, cents, category, stock, color, label), id)| Product {
                    id,
                    name: name.to_string(),
                    description: description.to_string(),
                    category: Some(category.to_string()),
                    price: Money::from_cents(cents),
                    stock,
                    image: format!("{}/{}/ffffff?text={}", PLACEHOLDER_BASE, color, label),
                },
            )
            .collect();

        Catalog { products }
    }

    fn next_id(&self) -> i64 {
        self.products.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Creates a product from admin-form fields.
    ///
    /// ## Errors
    /// `Validation` when the name is blank, or price/stock are negative.
    pub fn create(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        validate_product_name(&draft.name)?;
        validate_price(draft.price)?;
        if let Some(stock) = draft.stock {
            validate_stock(stock)?;
        }

        let product = draft.into_product(self.next_id());
        self.products.push(product.clone());
        Ok(product)
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Like [`Catalog::get`], but a missing id is `NotFound`.
    pub fn require(&self, id: i64) -> CoreResult<&Product> {
        self.get(id).ok_or_else(|| CoreError::not_found("Product", id))
    }

    /// Merges `patch` over an existing product.
    ///
    /// Validation happens before anything is written, so a rejected update
    /// leaves the product untouched.
    pub fn update(&mut self, id: i64, patch: &ProductPatch) -> CoreResult<Product> {
        if let Some(name) = &patch.name {
            validate_product_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            validate_stock(stock)?;
        }

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Product", id))?;
        patch.apply_to(product);
        Ok(product.clone())
    }

    /// Removes a product. Cart lines and orders keep their own copies.
    pub fn delete(&mut self, id: i64) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Product", id))?;
        Ok(self.products.remove(index))
    }

    /// All products in insertion order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Products in `category`; a blank category means all products.
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        if category.trim().is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| p.in_category(category))
            .collect()
    }

    /// The first `count` products, for the home page strip.
    pub fn featured(&self, count: usize) -> &[Product] {
        &self.products[..count.min(self.products.len())]
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.products.iter().filter_map(|p| p.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PLACEHOLDER_IMAGE;

    fn draft(name: &str, cents: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price: Money::from_cents(cents),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::with_defaults();
        assert_eq!(catalog.len(), 6);

        let tee = catalog.get(1).unwrap();
        assert_eq!(tee.name, "Okaybruh Classic Tee");
        assert_eq!(tee.price, Money::from_cents(2999));
        assert_eq!(tee.stock, 50);
        assert_eq!(
            tee.image,
            "https://via.placeholder.com/300x300/667eea/ffffff?text=Classic+Tee"
        );
        assert_eq!(catalog.categories(), vec!["Tees", "Hoodies", "Accessories"]);
    }

    #[test]
    fn test_create_assigns_max_plus_one() {
        let mut catalog = Catalog::new();
        assert_eq!(catalog.create(draft("A", 100)).unwrap().id, 1);
        assert_eq!(catalog.create(draft("B", 100)).unwrap().id, 2);

        catalog.delete(1).unwrap();
        assert_eq!(catalog.create(draft("C", 100)).unwrap().id, 3);

        let mut defaults = Catalog::with_defaults();
        assert_eq!(defaults.create(draft("Tote", 1500)).unwrap().id, 7);
    }

    #[test]
    fn test_create_applies_defaults_and_validates() {
        let mut catalog = Catalog::new();
        let product = catalog.create(draft("Tote", 1500)).unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.image, PLACEHOLDER_IMAGE);

        assert!(catalog.create(draft("", 100)).is_err());
        assert!(catalog.create(draft("Bad", -1)).is_err());
        assert!(catalog
            .create(draft("Gold Tee", (crate::MAX_PRICE + 1) * 100))
            .is_err());

        let mut negative_stock = draft("Bad", 100);
        negative_stock.stock = Some(-2);
        assert!(catalog.create(negative_stock).is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_update_merges_and_validates() {
        let mut catalog = Catalog::with_defaults();
        let patch = ProductPatch {
            stock: Some(5),
            ..Default::default()
        };
        let updated = catalog.update(2, &patch).unwrap();
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.price, Money::from_cents(5999));

        let bad = ProductPatch {
            price: Some(Money::from_cents(-100)),
            stock: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            catalog.update(2, &bad),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(catalog.get(2).unwrap().stock, 5);

        assert!(catalog.update(99, &patch).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete() {
        let mut catalog = Catalog::with_defaults();
        let removed = catalog.delete(3).unwrap();
        assert_eq!(removed.name, "Okaybruh Cap");
        assert!(catalog.get(3).is_none());
        assert!(catalog.delete(3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_by_category_and_featured() {
        let catalog = Catalog::with_defaults();

        let hoodies: Vec<i64> = catalog.by_category("Hoodies").iter().map(|p| p.id).collect();
        assert_eq!(hoodies, vec![2, 6]);
        assert_eq!(catalog.by_category("").len(), 6);
        assert!(catalog.by_category("Shoes").is_empty());

        assert_eq!(catalog.featured(4).len(), 4);
        assert_eq!(catalog.featured(4)[0].id, 1);
        assert_eq!(catalog.featured(10).len(), 6);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let catalog = Catalog::with_defaults();
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());

        let back: Catalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }
}
