/// OneHand - crowdfunding client (TUI Edition)
///
/// Core library providing the campaign creation wizard, the typed client
/// for the OneHand backend API, and the terminal front-end.

pub mod api;
pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
