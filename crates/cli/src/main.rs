//! RocketShoes CLI - manage the local cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set product 3 to four units
//! rs-cart update 3 4
//!
//! # Remove product 3
//! rs-cart remove 3
//!
//! # Empty the cart, printing the result as JSON
//! rs-cart --json clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's quantity (checked against stock)
//! - `clear` - Empty the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_cart::CartConfig;
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    /// Print the cart as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product id
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        product_id: ProductId,
    },
    /// Set the quantity of a product in the cart
    Update {
        /// Catalog product id
        product_id: ProductId,

        /// New quantity (must be at least 1 and within stock)
        #[arg(allow_negative_numbers = true)]
        amount: i32,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
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

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rs_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before tracing so Sentry can be initialized first
    let config = CartConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), commands::CommandError> {
    let store = commands::cart::open_store(config)?;

    let cart = match cli.command {
        Commands::Show => store.cart(),
        Commands::Add { product_id } => commands::cart::add(&store, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&store, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&store, product_id, amount).await?
        }
        Commands::Clear => commands::cart::clear(&store).await?,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        render::json(&mut out, &cart)?;
    } else {
        render::table(&mut out, &cart)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["rs-cart", "update", "3", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { amount: -1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_product_id() {
        assert!(Cli::try_parse_from(["rs-cart", "add", "tenis"]).is_err());
    }
}
