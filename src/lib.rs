//! Core library surface for the TV show browser.
//!
//! The catalog client, the filter and selection helpers, and the view-state
//! controller carry all of the logic; `ui` only turns key presses into
//! controller inputs and draws what the controller reports as visible.
pub mod catalog;
pub mod config;
pub mod controller;
pub mod filter;
pub mod logging;
pub mod models;
pub mod selection;
pub mod ui;

/// Catalog access: the caching client and the HTTP source behind it.
pub use catalog::{CatalogClient, CatalogSource, CatalogUnavailable, HttpCatalog};

pub use config::Config;

/// The view-state machine and its vocabulary.
pub use controller::{Effect, Fetched, Input, RenderView, View, ViewController};

/// The two domain types that other layers manipulate.
pub use models::{Episode, Show};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
