//! CodeVault backend: users store and share code projects through one JSON
//! action endpoint backed by a two-table record store.

pub mod actions;
pub mod app;
pub mod client;
pub mod config;
pub mod projects;
pub mod state;
pub mod store;
mod timestamp;
pub mod users;
