//! `vastraverse login|register|whoami`

use clap::Args;

use vastraverse_storefront::Storefront;
use vastraverse_storefront::api::{Registration, User};
use vastraverse_storefront::error::AppError;

#[derive(Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(short, long)]
    name: String,

    /// Account email address
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(short, long)]
    password: String,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,

    /// Default shipping address
    #[arg(long)]
    address: Option<String>,
}

pub async fn login(storefront: &Storefront, email: &str, password: &str) -> Result<(), AppError> {
    let user = storefront.auth().login(email, password).await?;
    println!("Welcome back, {}!", user.name);
    Ok(())
}

pub async fn register(storefront: &Storefront, args: RegisterArgs) -> Result<(), AppError> {
    let user = storefront
        .auth()
        .register(Registration {
            name: args.name,
            email: args.email,
            password: args.password,
            phone: args.phone,
            address: args.address,
        })
        .await?;
    println!("Welcome to Vastraverse, {}!", user.name);
    Ok(())
}

pub async fn whoami(storefront: &Storefront, refresh: bool) -> Result<(), AppError> {
    let auth = storefront.auth();
    let user = if refresh {
        Some(auth.refresh_profile().await?)
    } else {
        auth.user()
    };

    match user {
        Some(user) => print_user(&user),
        None => println!("Not logged in."),
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}> (#{})", user.name, user.email, user.id);
    if let Some(phone) = &user.phone {
        println!("Phone:   {phone}");
    }
    if let Some(address) = &user.address {
        println!("Address: {address}");
    }
}
