//! # Command-Line Interface
//!
//! ```text
//! okaybruh [--config shop.toml] [--backend local|remote] [--json] <command>
//!
//!   products list [--category Tees] [--featured]
//!   products show <id>
//!   products add --name .. --price .. [--stock ..] [--category ..] ...
//!   products edit <id> [--price ..] ...
//!   products delete <id>
//!
//!   cart show | add <product-id> [qty] | set <line-id> <qty>
//!   cart remove <line-id> | clear
//!
//!   checkout --name .. --email .. --phone .. [--payment cash|qrcode]
//!   orders list | show <id>
//!   report [--month 5] [--year 2024]
//!
//!   session show | reset
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use okaybruh_core::PaymentMethod;

use crate::commands::product::ProductForm;
use crate::state::BackendMode;

#[derive(Parser, Debug)]
#[command(name = "okaybruh", about = "Okaybruh merch shop storefront and admin", version)]
pub struct Cli {
    /// Path to shop.toml
    #[arg(long, env = "OKAYBRUH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: local (demo) or remote (REST service)
    #[arg(long, global = true)]
    pub backend: Option<BackendMode>,

    /// REST service base URL, e.g. http://localhost:3000/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Use this session id instead of the stored one
    #[arg(long, env = "OKAYBRUH_SESSION", global = true)]
    pub session: Option<String>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse and manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// View and change the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },

    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),

    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Monthly sales summary and daily chart
    Report {
        /// Month 1-12 (default: current month)
        #[arg(long)]
        month: Option<u32>,

        /// Year (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// The shopping session scoping the cart
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductAction {
    List {
        #[arg(long)]
        category: Option<String>,

        /// Only the featured products
        #[arg(long, conflicts_with = "category")]
        featured: bool,
    },
    Show {
        id: i64,
    },
    Add(ProductArgs),
    Edit {
        id: i64,

        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete {
        id: i64,
    },
}

/// Admin form fields. Numbers stay text until the command validates them.
#[derive(Args, Debug, Clone, Default)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub stock: Option<String>,

    #[arg(long)]
    pub image: Option<String>,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        ProductForm {
            name: args.name,
            description: args.description,
            category: args.category,
            price: args.price,
            stock: args.stock,
            image: args.image,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CartAction {
    Show,
    Add {
        product_id: i64,

        #[arg(default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },
    /// Set a line's quantity; 0 or less removes it
    Set {
        line_id: i64,

        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    Remove {
        line_id: i64,
    },
    Clear,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// cash (cash on delivery) or qrcode (PayNow)
    #[arg(long, default_value = "cash")]
    pub payment: PaymentMethod,
}

#[derive(Subcommand, Debug)]
pub enum OrderAction {
    List,
    Show { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    Show,
    /// Forget the stored session; the next command starts a new cart
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_set_with_negative_quantity() {
        let cli = Cli::try_parse_from(["okaybruh", "cart", "set", "3", "-1"]).unwrap();
        match cli.command {
            Command::Cart {
                action: CartAction::Set { line_id, quantity },
            } => {
                assert_eq!(line_id, 3);
                assert_eq!(quantity, "-1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_checkout_payment() {
        let cli = Cli::try_parse_from([
            "okaybruh",
            "--backend",
            "server",
            "checkout",
            "--name",
            "Ana",
            "--email",
            "ana@example.com",
            "--phone",
            "5555",
            "--payment",
            "paynow",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(BackendMode::Remote));
        match cli.command {
            Command::Checkout(args) => assert_eq!(args.payment, PaymentMethod::Qrcode),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["okaybruh", "checkout", "--name", "Ana"]).is_err());
    }
}
