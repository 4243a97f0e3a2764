//! Core domain + application logic for the router MAC filter bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the router
//! backend live behind ports (traits) implemented in adapter crates.

pub mod auth;
pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod name_cache;
pub mod ports;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
