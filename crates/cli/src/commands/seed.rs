//! Seed the catalog from a YAML fixture.
//!
//! Fixture format:
//!
//! ```yaml
//! categories:
//!   - title: Main Courses
//!     slug: mains
//! menu_items:
//!   - title: Greek Salad
//!     price: "7.50"
//!     inventory: 20
//!     category: mains
//!     featured: true
//! ```
//!
//! Seeding is idempotent: categories are matched by slug and menu items by
//! title, and existing rows are left untouched.

use std::str::FromStr;

use bistro_core::types::{Money, Slug, Title};
use bistro_server::db::{CategoryRepository, MenuItemRepository};
use bistro_server::models::NewMenuItem;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    categories: Vec<CategoryFixture>,
    #[serde(default)]
    menu_items: Vec<MenuItemFixture>,
}

#[derive(Debug, Deserialize)]
struct CategoryFixture {
    title: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct MenuItemFixture {
    title: String,
    price: String,
    #[serde(default)]
    inventory: i64,
    /// Slug of the owning category, which must appear in `categories` or
    /// already exist.
    category: String,
    #[serde(default)]
    featured: bool,
}

/// Load a fixture file into the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// category is unknown, or a database write fails.
#[allow(clippy::print_stdout)]
pub async fn run(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(file)?;
    let fixture: Fixture = serde_yaml::from_str(&raw)?;

    let pool = super::open_pool().await?;
    let categories = CategoryRepository::new(&pool);
    let menu_items = MenuItemRepository::new(&pool);

    let mut created_categories = 0_usize;
    for entry in &fixture.categories {
        let slug = Slug::parse(&entry.slug)?;
        if categories.get_by_slug(&slug).await?.is_some() {
            continue;
        }
        let title = Title::parse_category(&entry.title)?;
        categories.create(&title, &slug).await?;
        created_categories += 1;
    }

    let mut created_items = 0_usize;
    for entry in &fixture.menu_items {
        let title = Title::parse_menu_item(&entry.title)?;
        if menu_items.find_by_title(&title).await?.is_some() {
            continue;
        }

        let slug = Slug::parse(&entry.category)?;
        let category = categories
            .get_by_slug(&slug)
            .await?
            .ok_or_else(|| format!("unknown category slug: {slug}"))?;
        let price = Money::parse(Decimal::from_str(&entry.price)?)?;
        if entry.inventory < 0 {
            return Err(format!("negative inventory for {title}").into());
        }

        menu_items
            .create(&NewMenuItem {
                title,
                price,
                inventory: entry.inventory,
                category: category.id,
                featured: entry.featured,
            })
            .await?;
        created_items += 1;
    }

    println!(
        "Seeded {created_categories} categor(ies) and {created_items} menu item(s)."
    );
    Ok(())
}
