//! Vastraverse Core - Shared types library.
//!
//! This crate provides common types used across all Vastraverse components:
//! - `storefront` - API client and client-side state holders
//! - `cli` - Terminal storefront front-end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere, including
//! WASM front-ends.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
