//! FakeStore CLI - Browse the catalog, manage products, and keep a cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! fakestore products list
//! fakestore products list --category "women's clothing"
//! fakestore products get 3
//! fakestore products categories
//!
//! # Admin CRUD against the catalog API
//! fakestore admin create --title "Canvas Tote" --price 24.50 \
//!     --description "Roomy tote for everyday errands" --category bags \
//!     --image https://example.com/tote.jpg
//! fakestore admin update 3 --price 19.99
//! fakestore admin delete 3
//!
//! # Cart (persisted between runs)
//! fakestore cart add 3 --quantity 2
//! fakestore cart show
//! fakestore cart set <ITEM_ID> 5
//! fakestore cart remove <ITEM_ID>
//! fakestore cart clear
//!
//! # Placeholder sign-in; the guest cart is merged into the user cart
//! fakestore login -e user@example.com -p password1
//! fakestore logout
//! ```
//!
//! # Commands
//!
//! - `products` - Read-only catalog browsing
//! - `admin` - Create, update, and delete catalog products
//! - `cart` - Inspect and change the persisted cart
//! - `login` / `logout` - Switch between the guest and user carts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use fakestore_core::{CartItemId, ProductId};
use fakestore_storefront::cart::{self, Storage};
use fakestore_storefront::catalog::CatalogClient;
use fakestore_storefront::config::StorefrontConfig;
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "fakestore")]
#[command(author, version, about = "FakeStore storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage catalog products
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in (placeholder; any valid email and 8+ character password)
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and return to the guest cart
    Logout,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally in one category
    List {
        /// Category name (see `products categories`)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Get {
        /// Product ID
        id: ProductId,
    },
    /// List category names
    Categories,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a product
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Image URL
        #[arg(long)]
        image: String,
    },
    /// Update a product; omitted fields keep their current value
    Update {
        /// Product ID
        id: ProductId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a catalog product to the cart
    Add {
        /// Product ID
        product_id: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Set a cart line's quantity (0 or less removes it)
    Set {
        /// Cart item ID (see `cart show`)
        item_id: CartItemId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove {
        /// Cart item ID (see `cart show`)
        item_id: CartItemId,
    },
    /// Remove every cart line
    Clear,
}

/// Shared handles for command implementations.
pub struct App {
    pub catalog: CatalogClient,
    pub storage: Arc<dyn Storage>,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fakestore_cli=info,fakestore_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let app = App {
        catalog: CatalogClient::new(&config.catalog)?,
        storage: cart::storage::open(&config.storage),
    };

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { category } => {
                commands::products::list(&app, category.as_deref()).await?;
            }
            ProductsAction::Get { id } => commands::products::show(&app, id).await?,
            ProductsAction::Categories => commands::products::categories(&app).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                title,
                price,
                description,
                category,
                image,
            } => {
                let draft = fakestore_core::ProductDraft {
                    title,
                    price,
                    description,
                    category,
                    image,
                };
                commands::admin::create(&app, &draft).await?;
            }
            AdminAction::Update {
                id,
                title,
                price,
                description,
                category,
                image,
            } => {
                let changes = commands::admin::ProductChanges {
                    title,
                    price,
                    description,
                    category,
                    image,
                };
                commands::admin::update(&app, id, changes).await?;
            }
            AdminAction::Delete { id } => commands::admin::delete(&app, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app)?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&app, product_id, quantity).await?,
            CartAction::Set { item_id, quantity } => {
                commands::cart::set_quantity(&app, item_id, quantity)?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&app, item_id)?,
            CartAction::Clear => commands::cart::clear(&app)?,
        },
        Commands::Login { email, password } => commands::auth::login(&app, &email, &password)?,
        Commands::Logout => commands::auth::logout(&app)?,
    }
    Ok(())
}
