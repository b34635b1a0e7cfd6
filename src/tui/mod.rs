//! Terminal front-end.
//!
//! Elm-style loop in [`app::AppState`]: terminal input, ticks and results of
//! spawned backend calls all arrive as [`events::AppEvent`]s and are handled
//! on one task.

pub mod app;
pub mod events;
pub mod layout;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;
