//! Catalog browsing commands.

use tindahan_core::ProductId;
use tindahan_storefront::Result;
use tindahan_storefront::models::Product;
use tindahan_storefront::session::StorefrontSession;

/// List products, optionally within one category.
#[allow(clippy::print_stdout)]
pub fn list(session: &StorefrontSession, category: Option<&str>) {
    let catalog = session.catalog();
    let products: Vec<&Product> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.products().iter().collect(),
    };

    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        print_row(product);
    }
}

/// Show one product with its color and size options.
#[allow(clippy::print_stdout)]
pub fn show(session: &StorefrontSession, id: &str) -> Result<()> {
    let product = session.catalog().require(&ProductId::new(id))?;

    println!("{} ({})", product.name, product.id);
    println!("  Category: {}", product.category);
    println!("  Price:    {}", product.price);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    if !product.colors.is_empty() {
        let colors: Vec<String> = product
            .colors
            .iter()
            .map(|c| format!("{} ({})", c.name, c.value))
            .collect();
        println!("  Colors:   {}", colors.join(", "));
    }
    if !product.sizes.is_empty() {
        println!("  Sizes:    {}", product.sizes.join(", "));
    }
    Ok(())
}

/// Search names and descriptions.
#[allow(clippy::print_stdout)]
pub fn search(session: &StorefrontSession, query: &str) {
    let results = session.catalog().search(query);
    if results.is_empty() {
        println!("No products match {query:?}.");
        return;
    }
    for product in results {
        print_row(product);
    }
}

/// List categories.
#[allow(clippy::print_stdout)]
pub fn categories(session: &StorefrontSession) {
    for category in session.catalog().categories() {
        println!("{category}");
    }
}

#[allow(clippy::print_stdout)]
fn print_row(product: &Product) {
    println!(
        "{:>4}  {:<32} {:>12}  {}",
        product.id.as_str(),
        product.name,
        product.price.to_string(),
        product.category
    );
}
