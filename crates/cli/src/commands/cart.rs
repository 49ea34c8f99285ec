//! Cart commands.

use tindahan_core::ProductId;
use tindahan_storefront::Result;
use tindahan_storefront::session::StorefrontSession;

/// Show cart lines, item count and subtotal.
#[allow(clippy::print_stdout)]
pub fn show(session: &StorefrontSession) -> Result<()> {
    let cart = session.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for item in cart.items() {
        let variant = item
            .variant_label()
            .map(|label| format!(" ({label})"))
            .unwrap_or_default();
        println!(
            "{:>4}  {}{variant} × {}  {}",
            item.id.as_str(),
            item.name,
            item.quantity,
            item.line_total()?
        );
    }
    println!();
    println!("Items:    {}", cart.total_items());
    println!("Subtotal: {}", cart.subtotal()?);
    Ok(())
}

/// Add a catalog product to the cart.
pub fn add(
    session: &mut StorefrontSession,
    id: &str,
    color: Option<&str>,
    size: Option<&str>,
    quantity: u32,
) -> Result<()> {
    let item = session
        .catalog()
        .require(&ProductId::new(id))?
        .to_cart_item(color, size)?;
    session.cart_mut().add_item(item, Some(quantity))?;
    Ok(())
}

/// Remove the first matching line.
#[allow(clippy::print_stdout)]
pub fn remove(
    session: &mut StorefrontSession,
    id: &str,
    color: Option<&str>,
    size: Option<&str>,
) -> Result<()> {
    let id = ProductId::new(id);
    let color = resolve_color(session, &id, color);
    if session
        .cart_mut()
        .remove_item(&id, color.as_deref(), size)?
        .is_none()
    {
        println!("Nothing in your cart matches {id}.");
    }
    Ok(())
}

/// Set the quantity of matching lines.
#[allow(clippy::print_stdout)]
pub fn update(
    session: &mut StorefrontSession,
    id: &str,
    quantity: u32,
    color: Option<&str>,
    size: Option<&str>,
) -> Result<()> {
    let id = ProductId::new(id);
    let color = resolve_color(session, &id, color);
    let updated = session
        .cart_mut()
        .update_quantity(&id, quantity, color.as_deref(), size)?;
    if updated > 0 {
        println!("Updated {updated} line(s) to quantity {quantity}.");
    }
    Ok(())
}

/// Show the most recent cart activity records.
#[allow(clippy::print_stdout)]
pub fn activity(session: &StorefrontSession, limit: usize) -> Result<()> {
    let activities = session.cart().activities()?;
    if activities.is_empty() {
        println!("No cart activity recorded.");
        return Ok(());
    }

    for record in activities.iter().take(limit) {
        let items: u32 = record
            .items
            .iter()
            .fold(0_u32, |total, i| total.saturating_add(i.quantity));
        println!(
            "{}  {:<16} {:?}  {} item(s)",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.user_name,
            record.action,
            items
        );
    }
    Ok(())
}

/// Map a color name to the stored swatch value when the product is known.
fn resolve_color(
    session: &StorefrontSession,
    id: &ProductId,
    color: Option<&str>,
) -> Option<String> {
    let color = color?;
    let resolved = session
        .catalog()
        .get(id)
        .and_then(|p| {
            p.colors
                .iter()
                .find(|c| c.value == color || c.name.eq_ignore_ascii_case(color))
        })
        .map_or(color, |c| c.value.as_str());
    Some(resolved.to_owned())
}
