//! Client for a storefront platform's cart endpoints.
//!
//! # Overview
//! Fetch the cart, update quantities, change a single line, add items, clear
//! the cart, and run the two-step shipping-rate calculation. The platform
//! owns all cart state; this crate forwards requests and returns its JSON.
//!
//! # Design
//! - `CartClient` is stateless and does no I/O: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `CartApi` drives those over a `Transport` as async operations, logging
//!   failures through `tracing` before returning them.
//! - `UreqTransport` is the shipped transport; tests script their own.
//! - Cart documents stay opaque `serde_json::Value`s.

pub mod api;
pub mod client;
pub mod config;
mod encode;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::CartApi;
pub use client::CartClient;
pub use config::{ConfigError, PlatformConfig, SectionLoad};
pub use error::CartError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{AddItem, Cart, ChangeLineItem, LineLocator, LineUpdates, ShippingRates, UpdateCart};
