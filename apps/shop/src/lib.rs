//! # Okaybruh Shop Library
//!
//! The command-line storefront and admin for the Okaybruh merch shop.
//!
//! ## Module Organization
//! ```text
//! okaybruh_shop/
//! ├── lib.rs          ◄─── You are here (logging, run, dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── Shop: backend + payments + session
//! │   ├── config.rs   ◄─── ShopConfig (defaults, shop.toml, OKAYBRUH_*)
//! │   └── session.rs  ◄─── Session id file
//! ├── commands/
//! │   ├── product.rs  ◄─── Browse + admin catalog commands
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   ├── order.rs    ◄─── Checkout, receipt, order history
//! │   └── report.rs   ◄─── Monthly summary + chart series
//! ├── render.rs       ◄─── Plain-text views
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. ShopConfig::load(--config)  + --backend / --api-url overrides       │
//! │  2. Shop::open ──► backend, payment codes, session                      │
//! │  3. dispatch(command) ──► commands::* ──► response                      │
//! │  4. render text (or JSON with --json)                                   │
//! │  5. Shop::close                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;
pub mod state;

use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use okaybruh_core::{CustomerInfo, SessionId};

use cli::{CartAction, Cli, Command, OrderAction, ProductAction, SessionAction};
use commands::order::CheckoutForm;
use error::ApiError;
use state::{session, Shop, ShopConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=okaybruh=trace` - Trace for the shop crates only
/// - Default: `info,okaybruh=debug,sqlx=warn`
///
/// Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,okaybruh=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one CLI invocation and returns what should be printed.
pub async fn run(cli: Cli) -> Result<String, ApiError> {
    let mut config = ShopConfig::load(cli.config.clone())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }

    let session = cli.session.as_deref().map(SessionId::parse).transpose()?;
    let shop = Shop::open(config, session).await?;
    info!(backend = shop.backend().name(), session = %shop.session(), "Shop opened");

    let result = dispatch(&shop, cli.command, cli.json).await;
    shop.close().await;
    result
}

/// Routes a parsed command to its handler and renders the response.
pub async fn dispatch(shop: &Shop, command: Command, json: bool) -> Result<String, ApiError> {
    debug!(?command, "dispatch");
    let symbol = shop.config().currency_symbol.clone();
    let rate = shop.tax_rate();

    match command {
        Command::Products { action } => match action {
            ProductAction::List { featured: true, .. } => {
                let products = commands::product::featured_products(shop).await?;
                output(json, &products, || render::products(&products, &symbol))
            }
            ProductAction::List { category, .. } => {
                let list = commands::product::list_products(shop, category.as_deref()).await?;
                output(json, &list, || render::product_list(&list, &symbol))
            }
            ProductAction::Show { id } => {
                let product = commands::product::get_product(shop, id).await?;
                output(json, &product, || render::product(&product, &symbol))
            }
            ProductAction::Add(fields) => {
                let product = commands::product::create_product(shop, fields.into()).await?;
                output(json, &product, || {
                    format!("Created product #{}\n\n{}", product.id, render::product(&product, &symbol))
                })
            }
            ProductAction::Edit { id, fields } => {
                let product = commands::product::update_product(shop, id, fields.into()).await?;
                output(json, &product, || render::product(&product, &symbol))
            }
            ProductAction::Delete { id } => {
                commands::product::delete_product(shop, id).await?;
                output(json, &serde_json::json!({ "deleted": id }), || {
                    format!("Deleted product #{}", id)
                })
            }
        },

        Command::Cart { action } => {
            let cart = match action {
                CartAction::Show => commands::cart::get_cart(shop).await?,
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::cart::add_to_cart(shop, product_id, &quantity).await?,
                CartAction::Set { line_id, quantity } => {
                    commands::cart::update_cart_item(shop, line_id, &quantity).await?
                }
                CartAction::Remove { line_id } => {
                    commands::cart::remove_from_cart(shop, line_id).await?
                }
                CartAction::Clear => commands::cart::clear_cart(shop).await?,
            };
            output(json, &cart, || render::cart(&cart, rate, &symbol))
        }

        Command::Checkout(args) => {
            let form = CheckoutForm {
                customer: CustomerInfo {
                    name: args.name,
                    email: args.email,
                    phone: args.phone,
                },
                payment_method: args.payment,
            };
            let receipt = commands::order::checkout(shop, form).await?;
            output(json, &receipt, || render::receipt(&receipt, &symbol))
        }

        Command::Orders { action } => match action {
            OrderAction::List => {
                let orders = commands::order::list_orders(shop).await?;
                output(json, &orders, || render::orders(&orders, &symbol))
            }
            OrderAction::Show { id } => {
                let receipt = commands::order::get_order(shop, id).await?;
                output(json, &receipt, || render::receipt(&receipt, &symbol))
            }
        },

        Command::Report { month, year } => {
            let now = Utc::now();
            let report = commands::report::sales_report(
                shop,
                month.unwrap_or_else(|| now.month()),
                year.unwrap_or_else(|| now.year()),
            )
            .await?;
            output(json, &report, || render::report(&report, &symbol))
        }

        Command::Session { action } => match action {
            SessionAction::Show => {
                let id = shop.session().to_string();
                output(json, &serde_json::json!({ "sessionId": id }), || id.clone())
            }
            SessionAction::Reset => {
                // The old cart is unreachable once the id is gone
                if let Err(e) = shop.backend().forget_cart(shop.session()).await {
                    warn!(session = %shop.session(), error = %e, "Could not drop the old cart");
                }
                session::reset(&shop.config().data_dir())?;
                info!(session = %shop.session(), "Session reset");
                output(json, &serde_json::json!({ "reset": true }), || {
                    "Session reset; the next command starts a new cart".to_string()
                })
            }
        },
    }
}

fn output<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<String, ApiError> {
    if json {
        serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))
    } else {
        Ok(text())
    }
}

// =============================================================================
// End-to-End Tests
// =============================================================================
