//! Plain text rendering of storefront data.

use std::path::Path;

use watchshop_core::api::HomeShelves;
use watchshop_core::models::{Brand, Cart, CheckoutDetails, Page, Watch};
use watchshop_core::utils::{format_price, format_rubles, truncate_string};
use watchshop_core::{CatalogQuery, Config, SessionState};

/// Width of the name column in listings
const NAME_WIDTH: usize = 32;

/// Width of the brand column in listings
const BRAND_WIDTH: usize = 16;

pub fn status(state: &SessionState, config: &Config) {
    match state {
        SessionState::Authenticated(_) => println!("Signed in ({})", config.api_url),
        SessionState::Anonymous => println!("Not signed in ({})", config.api_url),
    }
}

fn watch_row(watch: &Watch) -> String {
    format!(
        "{:>5}  {:<name$}  {:<brand$}  {:>14}  {}",
        watch.id,
        truncate_string(&watch.name, NAME_WIDTH),
        truncate_string(&watch.brand.name, BRAND_WIDTH),
        format_price(&watch.price),
        if watch.in_stock { "" } else { "(out of stock)" },
        name = NAME_WIDTH,
        brand = BRAND_WIDTH,
    )
}

fn watch_rows(watches: &[Watch]) {
    if watches.is_empty() {
        println!("  nothing here yet");
    }
    for watch in watches {
        println!("{}", watch_row(watch));
    }
}

pub fn home(shelves: &HomeShelves) {
    println!("New arrivals");
    watch_rows(&shelves.newest);
    println!("\nPremium");
    watch_rows(&shelves.premium);
    println!("\nAffordable");
    watch_rows(&shelves.affordable);
}

/// Navigation hint for the pages around `current`.
fn pager_hint<T>(page: &Page<T>, current: u64) -> Option<String> {
    let mut links = Vec::new();
    if page.has_previous() {
        links.push(format!("previous: --page {}", current.saturating_sub(1).max(1)));
    }
    if page.has_next() {
        links.push(format!("next: --page {}", current + 1));
    }
    (!links.is_empty()).then(|| links.join(", "))
}

pub fn catalog(page: &Page<Watch>, query: &CatalogQuery, brands: &[Brand]) {
    if !brands.is_empty() {
        let names: Vec<&str> = brands.iter().map(|b| b.name.as_str()).collect();
        println!("Brands: {}\n", names.join(", "));
    }
    if page.results.is_empty() {
        println!("No watches match these filters.");
        return;
    }
    watch_rows(&page.results);
    println!(
        "\nPage {} of {} ({} watches)",
        query.page,
        page.total_pages(),
        page.count
    );
    if let Some(hint) = pager_hint(page, query.page) {
        println!("{}", hint);
    }
}

pub fn admin_list(page: &Page<Watch>, current: u64) {
    watch_rows(&page.results);
    println!("\nPage {} of {}", current, page.total_pages());
    if let Some(hint) = pager_hint(page, current) {
        println!("{}", hint);
    }
}

pub fn watch_details(watch: &Watch) {
    println!("{} ({})", watch.name, watch.brand.name);
    println!("  Price:    {}", format_price(&watch.price));
    println!("  Type:     {}", watch.watch_type);
    println!("  Status:   {}", watch.availability());
    println!("  Added:    {}", watch.created_at.format("%d.%m.%Y"));
    if let Some(ref image) = watch.image {
        println!("  Image:    {}", image);
    }
    if !watch.description.is_empty() {
        println!("\n{}", watch.description);
    }
}

pub fn brands(brands: &[Brand]) {
    for brand in brands {
        match brand.description.as_deref() {
            Some(description) if !description.is_empty() => {
                println!("{:>5}  {}: {}", brand.id, brand.name, description)
            }
            _ => println!("{:>5}  {}", brand.id, brand.name),
        }
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        println!(
            "{:>5}  {:<name$}  {:>3} x {:>12}  = {:>14}",
            item.id,
            truncate_string(&item.watch.name, NAME_WIDTH),
            item.quantity,
            format_price(&item.watch.price),
            format_price(&item.total_price),
            name = NAME_WIDTH,
        );
    }
    println!("\nTotal: {}", format_rubles(cart.total_cents()));
}

pub fn checkout(details: &CheckoutDetails, cart: &Cart) {
    println!("Order for {}", details.full_name);
    println!("  Phone:    {}", details.phone);
    println!("  Email:    {}", details.email);
    println!("  Deliver:  {}", details.address);
    println!(
        "\n{} item(s), total {}",
        cart.item_count(),
        format_rubles(cart.total_cents())
    );
}

pub fn config(config: &Config, path: &Path) {
    println!("# {}", path.display());
    match serde_json::to_string_pretty(config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render config: {}", e),
    }
}
