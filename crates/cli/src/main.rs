//! Raiz CLI - Browse the catalog, manage the cart and start checkout.
//!
//! # Usage
//!
//! ```bash
//! # List products under R$ 100 in size M, cheapest first
//! raiz products --max-price 100 --size M --sort lowest_price
//!
//! # Add a product to the cart and open a checkout
//! raiz cart add camiseta-raiz --size G --quantity 2
//! raiz cart checkout
//!
//! # Set the delivery location
//! raiz location set 01001-000
//! ```
//!
//! # Commands
//!
//! - `products` - Filtered, sorted product listing
//! - `sizes` - Size menu and price bounds of the catalog
//! - `product` / `collection` - Single product or collection
//! - `cart` - Show and change the persistent cart, start checkout
//! - `location` - Delivery location by CEP

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use raiz_storefront::config::StorefrontConfig;
use raiz_storefront::error::AppError;
use raiz_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CartAction, LocationAction, ProductsArgs};

#[derive(Parser)]
#[command(name = "raiz")]
#[command(author, version, about = "Nação Raiz storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with filters and sorting
    Products(ProductsArgs),
    /// Show the size menu and price bounds
    Sizes {
        /// Only consider products in this collection
        #[arg(short, long)]
        collection: Option<String>,
    },
    /// Show a product
    Product {
        /// Product handle (e.g., `camiseta-raiz`)
        handle: String,

        /// Page of related products to show
        #[arg(long, default_value_t = 0)]
        related_page: usize,
    },
    /// Show a collection
    Collection {
        /// Collection handle
        handle: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Set, show or clear the delivery location
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "raiz_storefront=info,raiz_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            return fail(&AppError::from(e));
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(error: &AppError) -> ExitCode {
    error.report();
    commands::notify(&error.toast());
    ExitCode::FAILURE
}

async fn run(cli: Cli, state: &AppState) -> Result<(), AppError> {
    match cli.command {
        Commands::Products(args) => commands::catalog::products(state, args).await,
        Commands::Sizes { collection } => {
            commands::catalog::sizes(state, collection.as_deref()).await
        }
        Commands::Product {
            handle,
            related_page,
        } => commands::catalog::product(state, &handle, related_page).await,
        Commands::Collection { handle } => commands::catalog::collection(state, &handle).await,
        Commands::Cart { action } => commands::cart::run(state, action).await,
        Commands::Location { action } => commands::location::run(state, action).await,
    }
}
