//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use watchshop_core::config::CredentialBackend;
use watchshop_core::models::WatchType;
use watchshop_core::CatalogQuery;

#[derive(Debug, Parser)]
#[command(name = "watchshop", version, about = "Browse and buy watches from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
    },
    /// Create an account (sign in separately afterwards)
    Register {
        username: String,
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is active
    Status,
    /// Newest, premium and affordable watches
    Home,
    /// Browse the catalog with filters
    Catalog(CatalogArgs),
    /// Show one watch
    Product {
        id: i64,
    },
    /// List brands
    Brands,
    /// Manage the cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Validate delivery details and summarize the order
    Checkout(CheckoutArgs),
    /// Edit or delete catalog entries
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Show or change the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Name of the view this command stands for, used in logs.
    pub fn view_name(&self) -> &'static str {
        match self {
            Command::Login { .. } | Command::Register { .. } | Command::Logout | Command::Status => "auth",
            Command::Home => "home",
            Command::Catalog(_) | Command::Brands => "catalog",
            Command::Product { .. } => "product",
            Command::Cart(_) => "cart",
            Command::Checkout(_) => "checkout",
            Command::Admin(_) => "admin",
            Command::Config(_) => "config",
        }
    }
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Exact brand name
    #[arg(long)]
    pub brand: Option<String>,
    /// ANALOG, DIGITAL or SMART
    #[arg(long = "type", value_parser = parse_watch_type)]
    pub watch_type: Option<WatchType>,
    /// Only watches in stock
    #[arg(long)]
    pub in_stock: bool,
    /// Free text search
    #[arg(long)]
    pub search: Option<String>,
    /// Sort field, prefix with - for descending (e.g. -price)
    #[arg(long)]
    pub ordering: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u64,
}

impl CatalogArgs {
    pub fn to_query(&self) -> CatalogQuery {
        CatalogQuery::default()
            .with_brand(self.brand.as_deref().unwrap_or_default())
            .with_watch_type(self.watch_type)
            .with_in_stock(self.in_stock)
            .with_search(self.search.as_deref().unwrap_or_default())
            .with_ordering(self.ordering.as_deref().unwrap_or_default())
            .with_page(self.page)
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show cart contents and total
    Show,
    /// Add a watch to the cart
    Add {
        watch_id: i64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line
    Update {
        item_id: i64,
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        item_id: i64,
    },
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List watches page by page
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// Edit a watch; unspecified fields keep their current value
    Edit(EditArgs),
    /// Delete a watch
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub brand_id: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long = "type", value_parser = parse_watch_type)]
    pub watch_type: Option<WatchType>,
    #[arg(long)]
    pub in_stock: Option<bool>,
    /// New image file (5MB max)
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Store the API base URL
    SetUrl {
        url: String,
    },
    /// Choose where the session token is kept
    SetBackend {
        #[arg(value_enum)]
        backend: BackendArg,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum BackendArg {
    File,
    Keyring,
    Memory,
}

impl From<BackendArg> for CredentialBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::File => CredentialBackend::File,
            BackendArg::Keyring => CredentialBackend::Keyring,
            BackendArg::Memory => CredentialBackend::Memory,
        }
    }
}

fn parse_watch_type(s: &str) -> Result<WatchType, String> {
    WatchType::parse(s).ok_or_else(|| format!("unknown watch type '{}', expected ANALOG, DIGITAL or SMART", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_catalog_filters() {
        let cli = Cli::try_parse_from([
            "watchshop", "catalog", "--brand", "Omega", "--type", "smart", "--in-stock", "--page", "2",
        ])
        .expect("valid args");
        let Command::Catalog(args) = cli.command else {
            panic!("expected catalog command");
        };
        let query = args.to_query();
        assert_eq!(query.brand_name.as_deref(), Some("Omega"));
        assert_eq!(query.watch_type, Some(WatchType::Smart));
        assert!(query.in_stock);
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_unknown_watch_type_rejected() {
        assert!(Cli::try_parse_from(["watchshop", "catalog", "--type", "sundial"]).is_err());
    }

    #[test]
    fn test_parse_cart_update() {
        let cli = Cli::try_parse_from(["watchshop", "cart", "update", "10", "3"]).expect("valid args");
        assert!(matches!(
            cli.command,
            Command::Cart(CartCommand::Update { item_id: 10, quantity: 3 })
        ));
        assert_eq!(cli.command.view_name(), "cart");
    }

    #[test]
    fn test_parse_admin_edit() {
        let cli = Cli::try_parse_from([
            "watchshop", "admin", "edit", "7", "--price", "99.90", "--in-stock", "false",
        ])
        .expect("valid args");
        let Command::Admin(AdminCommand::Edit(args)) = cli.command else {
            panic!("expected admin edit");
        };
        assert_eq!(args.id, 7);
        assert_eq!(args.price.as_deref(), Some("99.90"));
        assert_eq!(args.in_stock, Some(false));
        assert!(args.name.is_none());
    }
}
