//! Tindahan CLI - a command-line storefront.
//!
//! Every invocation mounts one storefront session over the data directory,
//! runs a single command, prints the resulting notifications and closes the
//! session.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! tindahan products list --category apparel
//! tindahan products show 4
//!
//! # Account
//! tindahan auth sign-up -n "Maria Santos" -e maria@shop.ph -p 'mabuhay-2024'
//! tindahan auth whoami
//!
//! # Cart and wishlist
//! tindahan cart add 4 --color Olive --size M --quantity 2
//! tindahan wishlist add 3
//! tindahan wishlist to-cart
//! tindahan cart show
//! ```
//!
//! # Environment Variables
//!
//! See `tindahan_storefront::config`. Logging is controlled by `RUST_LOG`
//! (default: `tindahan=info`) and written to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tindahan_core::AdminRole;
use tindahan_storefront::config::StorefrontConfig;
use tindahan_storefront::notify::RecordingNotifier;
use tindahan_storefront::session::StorefrontSession;
use tindahan_storefront::store::FileStore;
use tindahan_storefront::Result;

mod commands;

#[derive(Parser)]
#[command(name = "tindahan")]
#[command(author, version, about = "Tindahan storefront")]
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
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage your wishlist (requires sign-in)
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Sign in, sign up and account recovery
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Admin registration and sign-in
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product with its options
    Show {
        /// Product ID
        id: String,
    },
    /// Search names and descriptions
    Search {
        /// Text to look for
        query: String,
    },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and subtotal
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: String,
        /// Color value or name (defaults to the first option)
        #[arg(short, long)]
        color: Option<String>,
        /// Size (defaults to the first option)
        #[arg(short, long)]
        size: Option<String>,
        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line from the cart
    Remove {
        /// Product ID
        id: String,
        /// Only remove this color (value or name)
        #[arg(short, long)]
        color: Option<String>,
        /// Only remove this size
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Set the quantity of matching lines
    Update {
        /// Product ID
        id: String,
        /// New quantity (values below 1 are ignored)
        quantity: u32,
        /// Only update this color (value or name)
        #[arg(short, long)]
        color: Option<String>,
        /// Only update this size
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Empty the cart
    Clear,
    /// Show recorded cart activity
    Activity {
        /// Number of records to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// Save the product, or remove it if already saved
    Toggle {
        /// Product ID
        id: String,
    },
    /// Remove every saved product
    Clear,
    /// Add every saved product to the cart
    ToCart,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account and sign in
    SignUp {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Sign in
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// Request a password reset token
    ForgotPassword {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        /// Reset token
        #[arg(short, long)]
        token: String,
        /// New password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Register an admin account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password (min 8 characters)
        #[arg(short, long)]
        password: String,
        /// Admin registration code
        #[arg(short, long)]
        code: String,
        /// Admin role (`super_admin`, `admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: AdminRole,
    },
    /// Sign in as an admin
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tindahan=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "Command failed");
        tracing::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = StorefrontConfig::from_env()?;
    let catalog = config.load_catalog()?;
    let store = Arc::new(FileStore::open(config.data_dir.clone())?);
    let notifier = Arc::new(RecordingNotifier::new());

    let mut session = StorefrontSession::mount(store, notifier.clone(), catalog, &config)?;
    let outcome = execute(&mut session, cli.command);
    let closed = session.close();

    commands::print_toasts(&notifier.drain());
    outcome?;
    closed
}

fn execute(session: &mut StorefrontSession, command: Commands) -> Result<()> {
    match command {
        Commands::Products { action } => match action {
            ProductsAction::List { category } => {
                commands::products::list(session, category.as_deref());
            }
            ProductsAction::Show { id } => commands::products::show(session, &id)?,
            ProductsAction::Search { query } => commands::products::search(session, &query),
            ProductsAction::Categories => commands::products::categories(session),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(session)?,
            CartAction::Add {
                id,
                color,
                size,
                quantity,
            } => commands::cart::add(session, &id, color.as_deref(), size.as_deref(), quantity)?,
            CartAction::Remove { id, color, size } => {
                commands::cart::remove(session, &id, color.as_deref(), size.as_deref())?;
            }
            CartAction::Update {
                id,
                quantity,
                color,
                size,
            } => {
                commands::cart::update(session, &id, quantity, color.as_deref(), size.as_deref())?;
            }
            CartAction::Clear => session.cart_mut().clear_cart()?,
            CartAction::Activity { limit } => commands::cart::activity(session, limit)?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(session)?,
            WishlistAction::Add { id } => commands::wishlist::add(session, &id)?,
            WishlistAction::Remove { id } => commands::wishlist::remove(session, &id)?,
            WishlistAction::Toggle { id } => commands::wishlist::toggle(session, &id)?,
            WishlistAction::Clear => commands::wishlist::clear(session)?,
            WishlistAction::ToCart => {
                session.add_wishlist_to_cart()?;
            }
        },
        Commands::Auth { action } => match action {
            AuthAction::SignUp {
                name,
                email,
                password,
            } => {
                session.auth_mut().sign_up(&name, &email, &password)?;
            }
            AuthAction::SignIn { email, password } => {
                session.auth_mut().sign_in(&email, &password)?;
            }
            AuthAction::SignOut => session.auth_mut().sign_out()?,
            AuthAction::Whoami => commands::auth::whoami(session),
            AuthAction::ForgotPassword { email } => {
                commands::auth::forgot_password(session, &email)?;
            }
            AuthAction::ResetPassword { token, password } => {
                session.auth_mut().reset_password(&token, &password)?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Register {
                name,
                email,
                password,
                code,
                role,
            } => {
                session
                    .auth_mut()
                    .register_admin(&name, &email, &password, &code, role)?;
            }
            AdminAction::SignIn { email, password } => {
                session.auth_mut().admin_sign_in(&email, &password)?;
            }
        },
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
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "tindahan", "cart", "add", "4", "--color", "Olive", "-s", "M", "-q", "2",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Add { quantity: 2, .. }
            }
        ));
    }

    #[test]
    fn test_parse_admin_role() {
        let cli = Cli::try_parse_from([
            "tindahan", "admin", "register", "-n", "Ana", "-e", "ana@shop.ph", "-p", "mabuhay123",
            "-c", "k7Qz-4mWp-9xRt", "-r", "super_admin",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Register {
                    role: AdminRole::SuperAdmin,
                    ..
                }
            }
        ));
        assert!(
            Cli::try_parse_from([
                "tindahan", "admin", "register", "-n", "A", "-e", "a@b", "-p", "x", "-c", "y", "-r",
                "owner",
            ])
            .is_err()
        );
    }
}
