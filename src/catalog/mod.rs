//! Read-only access to the show catalog, split the same way the requests
//! flow: wire decoding, the HTTP source, and the caching client in front.

mod client;
mod error;
mod http;
mod single_flight;
mod wire;

pub use client::{CatalogClient, CatalogSource};
pub use error::CatalogUnavailable;
pub use http::HttpCatalog;

#[cfg(test)]
pub(crate) use client::testing;
