//! Ratatui front-end. `app` holds the key dispatch and drawing, `screens`
//! the small bits of per-list UI state, `terminal` the event loop.

mod app;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
