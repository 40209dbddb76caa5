//! Command dispatch for the WatchShop CLI.
//!
//! `App` owns the configuration and the session. Every screen of the
//! storefront maps to one handler here; rendering lives in `render`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use watchshop_core::models::{CheckoutDetails, ImageUpload, WatchForm};
use watchshop_core::{CatalogQuery, Config, Session, SessionState};

use crate::cli::{AdminCommand, CartCommand, CheckoutArgs, Command, ConfigCommand, EditArgs};
use crate::render;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

pub struct App {
    config: Config,
    session: Session,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let session = config.open_session()?;
        debug!(authenticated = session.is_authenticated(), "Session restored");
        Ok(Self { config, session })
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        let signing_out = matches!(command, Command::Logout);
        let mut subscription = self.session.subscribe();

        let result = self.dispatch(command).await;

        // A rejected token signs the session out inside the gateway;
        // tell the user instead of failing silently next time.
        if !signing_out && subscription.has_changed() {
            if let Some(SessionState::Anonymous) = subscription.changed().await {
                warn!("Session ended by the server");
                eprintln!("Your session has expired. Run `watchshop login <username>` to sign in again.");
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Login { username } => self.login(&username).await,
            Command::Register { username, email } => self.register(&username, &email).await,
            Command::Logout => {
                self.session.logout();
                println!("Signed out.");
                Ok(())
            }
            Command::Status => {
                render::status(&self.session.state(), &self.config);
                Ok(())
            }
            Command::Home => {
                let shelves = self.session.client().home_shelves().await?;
                render::home(&shelves);
                Ok(())
            }
            Command::Catalog(args) => self.catalog(&args.to_query()).await,
            Command::Product { id } => {
                let watch = self.session.client().get_watch(id).await?;
                render::watch_details(&watch);
                Ok(())
            }
            Command::Brands => {
                let brands = self.session.client().list_brands().await?;
                render::brands(&brands);
                Ok(())
            }
            Command::Cart(cart) => self.cart(cart).await,
            Command::Checkout(args) => self.checkout(args).await,
            Command::Admin(admin) => self.admin(admin).await,
            Command::Config(cmd) => self.configure(cmd),
        }
    }

    // ===== Auth =====

    async fn login(&self, username: &str) -> Result<()> {
        validate_username(username)?;
        let password = prompt_password("Password: ")?;

        self.session
            .login(username, &password)
            .await
            .context("Sign in failed")?;
        println!("Signed in as {}.", username);
        Ok(())
    }

    async fn register(&self, username: &str, email: &str) -> Result<()> {
        validate_username(username)?;
        let password = prompt_password("Password: ")?;
        let confirm = prompt_password("Repeat password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        self.session.register(username, email, &password).await?;
        println!("Account created. Run `watchshop login {}` to sign in.", username);
        Ok(())
    }

    // ===== Catalog =====

    async fn catalog(&self, query: &CatalogQuery) -> Result<()> {
        let client = self.session.client();
        let (page, brands) = futures::join!(client.list_watches(query), client.list_brands_or_empty());
        let page = page.context("Failed to load the catalog")?;
        render::catalog(&page, query, &brands);
        Ok(())
    }

    // ===== Cart =====

    async fn cart(&self, command: CartCommand) -> Result<()> {
        let client = self.session.client();
        if !self.session.is_authenticated() {
            bail!("Sign in to use the cart: watchshop login <username>");
        }

        match command {
            CartCommand::Show => {}
            CartCommand::Add { watch_id, quantity } => {
                client.add_to_cart(watch_id, quantity).await.context("Failed to add to cart")?;
                println!("Added to cart.");
            }
            CartCommand::Update { item_id, quantity } => {
                client
                    .update_cart_item(item_id, quantity)
                    .await
                    .context("Failed to update quantity")?;
            }
            CartCommand::Remove { item_id } => {
                client.remove_cart_item(item_id).await.context("Failed to remove item")?;
            }
        }

        // Refetch only after the mutation has completed
        let cart = client.my_cart().await.context("Failed to load the cart")?;
        render::cart(&cart);
        Ok(())
    }

    async fn checkout(&self, args: CheckoutArgs) -> Result<()> {
        let details = CheckoutDetails {
            full_name: args.full_name,
            phone: args.phone,
            email: args.email,
            address: args.address,
        };
        details.validate()?;

        let cart = self.session.client().my_cart().await.context("Failed to load the cart")?;
        if cart.is_empty() {
            bail!("Your cart is empty");
        }
        render::checkout(&details, &cart);
        Ok(())
    }

    // ===== Admin =====

    async fn admin(&self, command: AdminCommand) -> Result<()> {
        let client = self.session.client();
        match command {
            AdminCommand::List { page } => {
                let query = CatalogQuery::default().with_page(page);
                let listing = client.list_watches(&query).await.context("Failed to load watches")?;
                render::admin_list(&listing, query.page);
            }
            AdminCommand::Edit(args) => {
                let watch = client.get_watch(args.id).await?;
                let form = apply_edits(WatchForm::from_watch(&watch), args)?;
                let updated = client.update_watch(&form).await.context("Failed to update the watch")?;
                println!("Watch updated.");
                render::watch_details(&updated);
            }
            AdminCommand::Delete { id, yes } => {
                if !yes && !confirm(&format!("Delete watch {}? [y/N] ", id))? {
                    println!("Cancelled.");
                    return Ok(());
                }
                client.delete_watch(id).await.context("Failed to delete the watch")?;
                println!("Watch deleted.");
            }
        }
        Ok(())
    }

    // ===== Config =====

    fn configure(&self, command: ConfigCommand) -> Result<()> {
        match command {
            ConfigCommand::Show => {
                render::config(&self.config, &Config::config_path()?);
            }
            ConfigCommand::SetUrl { url } => {
                let mut config = self.config.clone();
                config.api_url = url;
                config.save()?;
                info!(api_url = %config.api_url, "API URL saved");
                println!("API URL set to {}.", config.api_url);
            }
            ConfigCommand::SetBackend { backend } => {
                let mut config = self.config.clone();
                config.credential_backend = backend.into();
                config.save()?;
                println!("Credential backend set to {:?}.", config.credential_backend);
            }
        }
        Ok(())
    }
}

fn apply_edits(mut form: WatchForm, args: EditArgs) -> Result<WatchForm> {
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(brand_id) = args.brand_id {
        form.brand_id = brand_id;
    }
    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(price) = args.price {
        form.price = price;
    }
    if let Some(watch_type) = args.watch_type {
        form.watch_type = watch_type;
    }
    if let Some(in_stock) = args.in_stock {
        form.in_stock = in_stock;
    }
    if let Some(path) = args.image {
        form.image = Some(ImageUpload::from_path(path)?);
    }
    Ok(form)
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        bail!("Username must be 1-{} characters", MAX_USERNAME_LENGTH);
    }
    if username.chars().any(char::is_control) {
        bail!("Username contains control characters");
    }
    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    if password.is_empty() || password.chars().count() > MAX_PASSWORD_LENGTH {
        bail!("Password must be 1-{} characters", MAX_PASSWORD_LENGTH);
    }
    Ok(password)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
