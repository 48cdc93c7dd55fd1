//! `vastraverse products ...`

use clap::Subcommand;

use vastraverse_core::ProductId;
use vastraverse_storefront::Storefront;
use vastraverse_storefront::api::{Page, Product, ProductPage, ProductQuery};
use vastraverse_storefront::error::AppError;

use super::rupees;

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,

        /// Page offset
        #[arg(short, long)]
        offset: Option<u32>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
}

pub async fn run(storefront: &Storefront, action: ProductsAction) -> Result<(), AppError> {
    let catalog = storefront.catalog();

    match action {
        ProductsAction::List {
            category,
            search,
            limit,
            offset,
        } => {
            // Category listings have their own endpoint unless combined with a search
            let page = match (category, search) {
                (Some(category), None) => {
                    catalog
                        .by_category(&category, Page { limit, offset })
                        .await?
                }
                (category, search) => {
                    catalog
                        .products(&ProductQuery {
                            category,
                            search,
                            limit,
                            offset,
                        })
                        .await?
                }
            };
            print_page(&page);
        }
        ProductsAction::Show { id } => print_product(&catalog.product(id).await?),
        ProductsAction::Categories => {
            for category in catalog.categories().await? {
                println!("{category}");
            }
        }
    }
    Ok(())
}

fn print_page(page: &ProductPage) {
    if page.products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in &page.products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "out of stock".to_owned()
        };
        println!(
            "{:>5}  {:<40} {:>12}  {:<12} {stock}",
            product.id,
            product.name,
            rupees(product.price),
            product.category
        );
    }
    if let Some(total) = page.total {
        println!("\n{} of {total} products", page.products.len());
    }
}

fn print_product(product: &Product) {
    println!("{} (#{})", product.name, product.id);
    println!("Price:    {}", rupees(product.price));
    println!("Category: {}", product.category);
    println!("Stock:    {}", product.stock);
    if let Some(image) = &product.image {
        println!("Image:    {image}");
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
}
