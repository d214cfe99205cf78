//! # Validation Module
//!
//! Input validation at the boundary, so defaults and checks happen once.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (CLI args / admin form)                            │
//! │  └── Raw strings: "2", "29.99", "abc"                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── parse_quantity / parse_price (malformed → InvalidInput)           │
//! │  └── Business rules: price ≥ 0, stock ≥ 0, quantity ≥ 1                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart / Catalog / Ledger operations                           │
//! │  └── Only ever see typed, validated values                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use okaybruh_core::validation::{parse_quantity, validate_quantity};
//!
//! let qty = parse_quantity("2").unwrap();
//! validate_quantity(qty).unwrap();
//! assert!(parse_quantity("two").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::CustomerInfo;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use okaybruh_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Okaybruh Hoodie").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an email address (loosely: non-empty and contains `@`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    require("email", email)?;

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

/// Validates checkout contact details. Name, email and phone are required.
pub fn validate_customer(customer: &CustomerInfo) -> ValidationResult<()> {
    require("customer name", &customer.name)?;
    validate_email(&customer.email)?;
    require("phone", &customer.phone)?;
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item / Change Quantity                                       │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │   (set_quantity handles < 1 as removal before calling this)    │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → proceed                                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a product price. Zero is allowed (free items).
///
/// Capped at [`MAX_PRICE`] so that no cart built from valid products can
/// leave the decimal range.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price > Money::from_cents(MAX_PRICE * 100) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a report month (1..=12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Parsers
// =============================================================================

/// Parses an integer entered as text.
///
/// ```rust
/// use okaybruh_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
/// assert_eq!(parse_quantity("-5").unwrap(), -5);
/// assert!(parse_quantity("1.5").is_err());
/// ```
///
/// Negative values parse fine; whether they mean "remove" or "invalid" is
/// up to the operation.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    parse_integer("quantity", raw)
}

/// Parses a stock level entered as text; must be ≥ 0.
pub fn parse_stock(raw: &str) -> ValidationResult<i64> {
    let stock = parse_integer("stock", raw)?;
    validate_stock(stock)?;
    Ok(stock)
}

/// Parses a price entered as text; must be ≥ 0.
pub fn parse_price(raw: &str) -> ValidationResult<Money> {
    let price: Money = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: format!("'{}' is not a number", raw.trim()),
    })?;
    validate_price(price)?;
    Ok(price)
}

fn parse_integer(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    raw.parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a whole number", raw),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Okaybruh Cap").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(2999)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_price(Money::from_cents(MAX_PRICE * 100)).is_ok());
        assert!(matches!(
            validate_price(Money::from_cents(MAX_PRICE * 100 + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("29.99").unwrap(), Money::from_cents(2999));
        assert!(matches!(
            parse_price("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_price("-1"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            parse_price("79228162514264337593543950335"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("40").unwrap(), 40);
        assert!(parse_stock("-1").is_err());
        assert!(parse_stock("lots").is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }

    #[test]
    fn test_validate_customer() {
        let mut customer = CustomerInfo {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+65 5555 1234".to_string(),
        };
        assert!(validate_customer(&customer).is_ok());

        customer.email = "ana.example.com".to_string();
        assert!(validate_customer(&customer).is_err());

        customer.email = "ana@example.com".to_string();
        customer.phone = " ".to_string();
        assert_eq!(
            validate_customer(&customer),
            Err(ValidationError::Required {
                field: "phone".to_string()
            })
        );
    }
}
