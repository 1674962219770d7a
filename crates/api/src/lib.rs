//! Threadcart API - cart, catalog, checkout, and payment-webhook service.
//!
//! # Architecture
//!
//! - Axum handlers returning a `{success, message, data}` envelope
//! - `PostgreSQL` via sqlx for carts, catalog, addresses, and orders
//! - Moka in-process cache for filtered catalog reads
//! - Stripe over plain REST (checkout sessions) plus a signed webhook that
//!   materializes orders from the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
