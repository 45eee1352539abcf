//! Client-side data layer for a faculty scheduling system.
//!
//! Reads go to a local cache first, then the scheduling API, then older
//! cached data, and finally a bundled snapshot. Writes always go to the API
//! and are then patched into the cache.

pub mod api;
pub mod app;
pub mod cache;
pub mod commands;
pub mod config;
pub mod fallback;
pub mod init;
pub mod logging;
pub mod model;
pub mod render;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;
