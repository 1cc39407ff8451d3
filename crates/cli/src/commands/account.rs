//! Sign-in commands.

use ayanavita_storefront::auth::AuthWatcher;
use ayanavita_storefront::cart::SharedCart;
use ayanavita_storefront::config::StorefrontConfig;
use secrecy::SecretString;
use tracing::{info, warn};

use super::{CommandError, Output, Page};

/// Store the access token, then merge the guest cart into the account cart.
///
/// # Errors
///
/// Returns an error if the token or the guest cart cannot be written.
pub async fn login(page: &mut Page, token: String) -> Result<(), CommandError> {
    let token = SecretString::from(token);
    page.credentials.sign_in(&token)?;
    info!("Access token stored");

    let total_items = page.cart.set_authenticated(true).await?.total_items();
    info!(mode = %page.cart.mode(), total_items, "Signed in");
    Ok(())
}

/// Clear the access token and switch back to the guest cart.
///
/// # Errors
///
/// Returns an error if the token or the guest cart cannot be accessed.
pub async fn logout(page: &mut Page) -> Result<(), CommandError> {
    page.credentials.sign_out()?;
    page.cart.set_authenticated(false).await?;
    info!("Signed out");
    Ok(())
}

/// Print the cart now and after every sign-in change until Ctrl-C.
///
/// Sign-in changes made by other processes sharing the data directory (for
/// example `ayv-cli login` in another terminal) are picked up by polling.
///
/// # Errors
///
/// Returns an error if the initial cart cannot be printed or the Ctrl-C
/// handler cannot be installed.
pub async fn watch(
    page: Page,
    config: &StorefrontConfig,
    output: Output,
) -> Result<(), CommandError> {
    output.cart(&page)?;

    let watcher = AuthWatcher::spawn(page.credentials.clone(), config.auth_poll_interval);
    let cart = SharedCart::new(page.cart);
    let follower = cart.follow_auth(watcher.subscribe(), move |reconciler| {
        if let Err(e) = output.reconciler(reconciler) {
            warn!(error = %e, "Failed to print cart");
        }
    });
    info!(interval = ?config.auth_poll_interval, "Watching sign-in changes (Ctrl-C to stop)");

    tokio::signal::ctrl_c().await?;

    watcher.shutdown();
    follower.abort();
    info!("Stopped watching");
    Ok(())
}
