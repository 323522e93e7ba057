//! RocketShoes Storefront library.
//!
//! This crate provides the cart store and its adapters as a library,
//! allowing the server binary, the CLI, and the integration tests to share
//! them.
//!
//! # Modules
//!
//! - [`cart`] - Cart operations and the persisted [`cart::CartStore`]
//! - [`catalog`] - Product and stock lookups against the catalog API
//! - [`storage`] - Key-value slots the cart is persisted to
//! - [`notify`] - User-facing notices for failed cart operations
//! - [`routes`] - JSON cart API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;
