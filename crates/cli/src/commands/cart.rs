//! `vastraverse cart ...`

use clap::Subcommand;

use vastraverse_core::{CartItemId, ProductId};
use vastraverse_storefront::Storefront;
use vastraverse_storefront::error::AppError;

use super::rupees;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity
    Update {
        /// Cart item ID (from `cart show`)
        item_id: CartItemId,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Cart item ID (from `cart show`)
        item_id: CartItemId,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(storefront: &Storefront, action: CartAction) -> Result<(), AppError> {
    let cart = storefront.cart();
    cart.refresh().await?;

    match action {
        CartAction::Show => {}
        CartAction::Add {
            product_id,
            quantity,
        } => cart.add(product_id, quantity).await?,
        CartAction::Update { item_id, quantity } => {
            cart.update_quantity(item_id, quantity).await?;
        }
        CartAction::Remove { item_id } => cart.remove(item_id).await?,
        CartAction::Clear => cart.clear().await?,
    }

    if storefront.auth().is_authenticated() {
        print_cart(storefront);
    }
    Ok(())
}

fn print_cart(storefront: &Storefront) {
    let summary = storefront.cart().summary();
    if summary.items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &summary.items {
        println!(
            "{:>5}  {:<40} {:>3} × {:>10} = {:>12}",
            item.id,
            item.name,
            item.quantity,
            rupees(item.price),
            rupees(item.line_total())
        );
    }
    println!("\n{} items, total {}", summary.count, rupees(summary.total));
}
