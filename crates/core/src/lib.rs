//! vApteke Core - Shared domain types.
//!
//! This crate provides common types used across the vApteke customers
//! service components:
//! - `server` - HTTP API over the primary customer store
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, phones, emails and names
//! - [`favorites`] - The ordered, size-tracked favorites list

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod favorites;
pub mod types;

pub use favorites::{FavoritesData, FavoritesList};
pub use types::*;
