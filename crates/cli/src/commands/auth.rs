//! Account commands.

use tindahan_storefront::Result;
use tindahan_storefront::session::StorefrontSession;

/// Show the signed-in user.
#[allow(clippy::print_stdout)]
pub fn whoami(session: &StorefrontSession) {
    match session.auth().current_user() {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            if let Some(role) = user.admin_role {
                println!("Admin role: {role}");
            }
        }
        None => println!("Not signed in."),
    }
}

/// Request a password reset.
///
/// There is no mail delivery, so the token is printed directly.
#[allow(clippy::print_stdout)]
pub fn forgot_password(session: &mut StorefrontSession, email: &str) -> Result<()> {
    if let Some(token) = session.auth_mut().request_password_reset(email)? {
        println!("Reset token: {token}");
        println!(
            "Run `tindahan auth reset-password --token {token} --password <new>` within the hour."
        );
    }
    Ok(())
}
