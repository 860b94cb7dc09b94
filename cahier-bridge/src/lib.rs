//! # Cahier Bridge
//! The terminal front end: drawing, key handling and the event loop that
//! drives a [`cahier_core::NotebookEngine`].

pub mod app;
pub mod config;
pub mod export;
pub mod keyboard;
pub mod logging;
pub mod renderer;
