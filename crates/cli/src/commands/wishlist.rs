//! Wishlist commands.

use tindahan_core::ProductId;
use tindahan_storefront::Result;
use tindahan_storefront::session::StorefrontSession;

#[allow(clippy::print_stdout)]
pub fn show(session: &mut StorefrontSession) -> Result<()> {
    if !session.auth().is_signed_in() {
        println!("Sign in to see your wishlist.");
        return Ok(());
    }

    let items = session.wishlist_mut().items()?;
    if items.is_empty() {
        println!("Your wishlist is empty.");
        return Ok(());
    }
    for item in items {
        println!("{:>4}  {:<32} {:>12}", item.id.as_str(), item.name, item.price.to_string());
    }
    Ok(())
}

pub fn add(session: &mut StorefrontSession, id: &str) -> Result<()> {
    let item = session
        .catalog()
        .require(&ProductId::new(id))?
        .to_wishlist_item();
    if_signed_out_hint(session);
    session.wishlist_mut().add_item(item)?;
    Ok(())
}

pub fn remove(session: &mut StorefrontSession, id: &str) -> Result<()> {
    if_signed_out_hint(session);
    session.wishlist_mut().remove_item(&ProductId::new(id))?;
    Ok(())
}

pub fn toggle(session: &mut StorefrontSession, id: &str) -> Result<()> {
    let item = session
        .catalog()
        .require(&ProductId::new(id))?
        .to_wishlist_item();
    if_signed_out_hint(session);
    session.wishlist_mut().toggle(item)?;
    Ok(())
}

pub fn clear(session: &mut StorefrontSession) -> Result<()> {
    if_signed_out_hint(session);
    session.wishlist_mut().clear_wishlist()?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn if_signed_out_hint(session: &StorefrontSession) {
    if !session.auth().is_signed_in() {
        println!("Sign in to use your wishlist.");
    }
}
