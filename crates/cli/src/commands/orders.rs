//! `vastraverse orders ...` and `vastraverse checkout`

use clap::Subcommand;

use vastraverse_core::OrderId;
use vastraverse_storefront::Storefront;
use vastraverse_storefront::api::Order;
use vastraverse_storefront::error::AppError;

use super::rupees;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List past orders
    List,
    /// Show one order
    Show {
        /// Order ID
        id: OrderId,
    },
}

pub async fn run(storefront: &Storefront, action: OrdersAction) -> Result<(), AppError> {
    let checkout = storefront.checkout();

    match action {
        OrdersAction::List => {
            let orders = checkout.orders().await?;
            if orders.is_empty() {
                println!("No orders yet.");
            }
            for order in &orders {
                println!(
                    "#{:<6} {}  {:<10} {:>12}",
                    order.id,
                    order.created_at.format("%Y-%m-%d"),
                    order.status,
                    rupees(order.total_amount)
                );
            }
        }
        OrdersAction::Show { id } => print_order(&checkout.order(id).await?),
    }
    Ok(())
}

pub async fn checkout(storefront: &Storefront, address: &str) -> Result<(), AppError> {
    storefront.cart().refresh().await?;
    let order = storefront.checkout().place_order(address).await?;
    print_order(&order);
    Ok(())
}

fn print_order(order: &Order) {
    println!("Order #{} ({})", order.id, order.status);
    println!("Placed:   {}", order.created_at.format("%Y-%m-%d %H:%M"));
    println!("Ship to:  {}", order.shipping_address);
    for item in &order.items {
        let name = item
            .name
            .clone()
            .unwrap_or_else(|| format!("Product #{}", item.product_id));
        println!(
            "  {:<40} {:>3} × {:>10}",
            name,
            item.quantity,
            rupees(item.price)
        );
    }
    println!("Total:    {}", rupees(order.total_amount));
}
