//! Rosella Core - Shared types library.
//!
//! This crate provides common types used across all Rosella components:
//! - `app` - Storefront state and sync engine
//! - `cli` - Command-line tools for seeding and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no backend access. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, widgets, products, articles, and the
//!   public profile

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
