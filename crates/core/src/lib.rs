//! RocketShoes Core - Shared types library.
//!
//! This crate provides the domain types used across the RocketShoes cart
//! components:
//! - `cart` - Cart store, catalog client and storage backends
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Cart values are immutable: every mutation returns a new [`Cart`].
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog payloads and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
