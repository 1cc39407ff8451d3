//! Cart commands.

use ayanavita_core::{NewCartItem, Price, ProductId};
use tracing::info;

use super::{CommandError, Page};

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if the item is invalid or the guest cart cannot be saved.
pub async fn add(
    page: &mut Page,
    product_id: i64,
    name: String,
    price: u64,
    quantity: u32,
    image: Option<String>,
) -> Result<(), CommandError> {
    let mut item = NewCartItem::new(
        ProductId::new(product_id),
        name,
        Price::from_dong(price),
        quantity,
    );
    if let Some(image) = image {
        item = item.with_image(image);
    }

    let state = page.cart.add_item(item).await?;
    info!(product_id, quantity, total_items = state.total_items(), "Added to cart");
    Ok(())
}

/// Set a product's quantity; zero or below removes the line.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the guest cart cannot
/// be saved.
pub async fn update(page: &mut Page, product_id: i64, quantity: i64) -> Result<(), CommandError> {
    let state = page
        .cart
        .update_quantity(ProductId::new(product_id), quantity)
        .await?;
    info!(product_id, quantity, total_items = state.total_items(), "Updated cart line");
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the guest cart cannot
/// be saved.
pub async fn remove(page: &mut Page, product_id: i64) -> Result<(), CommandError> {
    let state = page.cart.remove_item(ProductId::new(product_id)).await?;
    info!(product_id, total_items = state.total_items(), "Removed from cart");
    Ok(())
}
