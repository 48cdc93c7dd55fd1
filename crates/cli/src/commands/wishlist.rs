//! `vastraverse wishlist ...`

use clap::Subcommand;

use vastraverse_core::ProductId;
use vastraverse_storefront::Storefront;
use vastraverse_storefront::error::AppError;

use super::rupees;

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Save a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product
    Remove {
        /// Product ID
        product_id: ProductId,
    },
}

pub async fn run(storefront: &Storefront, action: WishlistAction) -> Result<(), AppError> {
    let wishlist = storefront.wishlist();
    wishlist.refresh().await?;

    match action {
        WishlistAction::Show => {}
        WishlistAction::Add { product_id } => wishlist.add(product_id).await?,
        WishlistAction::Remove { product_id } => wishlist.remove_product(product_id).await?,
    }

    if !storefront.auth().is_authenticated() {
        return Ok(());
    }
    let items = wishlist.items();
    if items.is_empty() {
        println!("Your wishlist is empty.");
    }
    for item in &items {
        println!(
            "{:>5}  {:<40} {:>12}",
            item.product_id,
            item.name,
            rupees(item.price)
        );
    }
    Ok(())
}
