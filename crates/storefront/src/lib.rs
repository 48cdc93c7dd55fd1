//! Vastraverse storefront client library.
//!
//! Talks to the Vastraverse REST backend and keeps the shopper's session,
//! cart and wishlist in sync with it. Front-ends (the CLI, tests) build a
//! [`state::Storefront`] and drive its state holders.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod ui;

pub use state::Storefront;
