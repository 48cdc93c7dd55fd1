//! Subcommand implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use vastraverse_core::Price;

/// Render a price in rupees.
fn rupees(price: Price) -> String {
    format!("₹{price}")
}
