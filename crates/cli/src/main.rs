//! AYANAVITA CLI - Command-line storefront.
//!
//! Every invocation behaves like a page load: the cart is refreshed from the
//! backend (or the local guest cart), the command runs, and the resulting cart
//! is printed.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! ayv-cli cart show
//!
//! # Add two of product 101 at 50.000 ₫
//! ayv-cli cart add 101 --name "Facial" --price 50000 --quantity 2
//!
//! # Sign in (merges the guest cart into the account cart)
//! ayv-cli login --token "$TOKEN"
//!
//! # Follow sign-in changes made by other processes
//! ayv-cli watch
//! ```
//!
//! # Commands
//!
//! - `cart` - Show or change the cart
//! - `login` / `logout` - Store or clear the access token
//! - `watch` - Print the cart after every sign-in change
//! - `language` - Get or set the interface language
//! - `saved-posts` - List or toggle saved blog posts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ayanavita_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "ayv-cli")]
#[command(author, version, about = "AYANAVITA storefront CLI")]
struct Cli {
    /// Print the cart as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Store an access token and merge the guest cart into the account cart
    Login {
        /// Bearer token issued by the backend
        #[arg(short, long)]
        token: String,
    },
    /// Clear the stored access token
    Logout,
    /// Print the cart after every sign-in change until interrupted
    Watch,
    /// Get or set the interface language
    Language {
        /// Language code to switch to (`vi`, `en`)
        code: Option<String>,
    },
    /// List or toggle saved blog posts
    SavedPosts {
        #[command(subcommand)]
        action: Option<SavedPostsAction>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: i64,

        /// Product display name
        #[arg(short, long)]
        name: String,

        /// Unit price in VND
        #[arg(short, long)]
        price: u64,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Set a product's quantity (zero or below removes it)
    Update {
        /// Product ID
        product_id: i64,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: i64,
    },
}

#[derive(Subcommand)]
enum SavedPostsAction {
    /// List saved post IDs
    List,
    /// Save the post, or unsave it if already saved
    Toggle {
        /// Blog post ID
        post_id: i64,
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
        .unwrap_or_else(|_| "ayanavita_storefront=info,ayanavita_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), commands::CommandError> {
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Cart { action } => {
            let mut page = commands::Page::load(config).await?;
            match action {
                CartAction::Show => {}
                CartAction::Add {
                    product_id,
                    name,
                    price,
                    quantity,
                    image,
                } => {
                    commands::cart::add(&mut page, product_id, name, price, quantity, image)
                        .await?;
                }
                CartAction::Update {
                    product_id,
                    quantity,
                } => commands::cart::update(&mut page, product_id, quantity).await?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&mut page, product_id).await?;
                }
            }
            output.cart(&page)?;
        }
        Commands::Login { token } => {
            let mut page = commands::Page::load(config).await?;
            commands::account::login(&mut page, token).await?;
            output.cart(&page)?;
        }
        Commands::Logout => {
            let mut page = commands::Page::load(config).await?;
            commands::account::logout(&mut page).await?;
            output.cart(&page)?;
        }
        Commands::Watch => {
            let page = commands::Page::load(config).await?;
            commands::account::watch(page, config, output).await?;
        }
        Commands::Language { code } => {
            commands::prefs::language(config, code.as_deref())?;
        }
        Commands::SavedPosts { action } => match action {
            None | Some(SavedPostsAction::List) => commands::prefs::list_saved_posts(config)?,
            Some(SavedPostsAction::Toggle { post_id }) => {
                commands::prefs::toggle_saved_post(config, post_id)?;
            }
        },
    }
    Ok(())
}
