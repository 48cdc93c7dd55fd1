//! Vastraverse CLI - shop the Vastraverse storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! vastraverse products list --category sarees
//! vastraverse products show 12
//!
//! # Sign in (the session is kept in VASTRAVERSE_SESSION_FILE)
//! vastraverse login -e priya@example.com -p hunter22
//!
//! # Shop
//! vastraverse cart add 12 --quantity 2
//! vastraverse cart show
//! vastraverse checkout --address "12 MG Road, Pune"
//! ```
//!
//! # Commands
//!
//! - `products` - Browse the catalog
//! - `login` / `register` / `logout` / `whoami` - Manage the session
//! - `cart` - View and change the cart
//! - `wishlist` - View and change the wishlist
//! - `orders` / `checkout` - Order history and placement

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vastraverse_storefront::Storefront;
use vastraverse_storefront::config::StorefrontConfig;
use vastraverse_storefront::error::AppError;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "vastraverse")]
#[command(author, version, about = "Vastraverse storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: commands::catalog::ProductsAction,
    },
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register(commands::account::RegisterArgs),
    /// Sign out
    Logout,
    /// Show the signed-in shopper
    Whoami {
        /// Re-read the profile from the backend
        #[arg(long)]
        refresh: bool,
    },
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// View and change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::wishlist::WishlistAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Order everything in the cart
    Checkout {
        /// Shipping address
        #[arg(short, long)]
        address: String,
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

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vastraverse_storefront=info,vastraverse_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let notifier = Arc::new(terminal::TerminalNotifier::default());
    match run(cli, config, Arc::clone(&notifier)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            // Holder failures were already printed by the notifier.
            if !notifier.has_shown_error() {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: Cli,
    config: StorefrontConfig,
    notifier: Arc<terminal::TerminalNotifier>,
) -> Result<(), AppError> {
    let storefront = Storefront::new(config, Arc::new(terminal::TerminalNavigator), notifier)?;

    match cli.command {
        Commands::Products { action } => commands::catalog::run(&storefront, action).await,
        Commands::Login { email, password } => {
            commands::account::login(&storefront, &email, &password).await
        }
        Commands::Register(args) => commands::account::register(&storefront, args).await,
        Commands::Logout => {
            storefront.auth().logout().await;
            Ok(())
        }
        Commands::Whoami { refresh } => commands::account::whoami(&storefront, refresh).await,
        Commands::Cart { action } => commands::cart::run(&storefront, action).await,
        Commands::Wishlist { action } => commands::wishlist::run(&storefront, action).await,
        Commands::Orders { action } => commands::orders::run(&storefront, action).await,
        Commands::Checkout { address } => commands::orders::checkout(&storefront, &address).await,
    }
}
