//! Language and saved-post commands.
//!
//! These only touch the local store; no cart is loaded.

use ayanavita_core::PostId;
use ayanavita_storefront::config::StorefrontConfig;
use ayanavita_storefront::preferences::{Language, Preferences};
use ayanavita_storefront::storage::FileStore;

use super::CommandError;

fn open(config: &StorefrontConfig) -> Result<Preferences<FileStore>, CommandError> {
    Ok(Preferences::new(FileStore::open(&config.data_dir)?))
}

/// Print the current language, switching to `code` first if given.
///
/// # Errors
///
/// Returns an error if `code` is not a supported language or the store fails.
pub fn language(config: &StorefrontConfig, code: Option<&str>) -> Result<(), CommandError> {
    let prefs = open(config)?;
    if let Some(code) = code {
        let language: Language = code.parse()?;
        prefs.set_language(language)?;
        tracing::info!(%language, "Language updated");
    }

    let current = prefs.language()?;
    #[allow(clippy::print_stdout)]
    {
        println!("{current}");
    }
    Ok(())
}

/// Print saved post IDs, one per line.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_saved_posts(config: &StorefrontConfig) -> Result<(), CommandError> {
    let posts = open(config)?.saved_posts()?;
    #[allow(clippy::print_stdout)]
    {
        if posts.is_empty() {
            println!("(no saved posts)");
        }
        for post in posts {
            println!("{post}");
        }
    }
    Ok(())
}

/// Save or unsave a post.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn toggle_saved_post(config: &StorefrontConfig, post_id: i64) -> Result<(), CommandError> {
    let post_id = PostId::new(post_id);
    let saved = open(config)?.toggle_saved_post(post_id)?;
    #[allow(clippy::print_stdout)]
    {
        if saved {
            println!("Saved post {post_id}");
        } else {
            println!("Removed post {post_id}");
        }
    }
    Ok(())
}
