#![deny(missing_docs)]
//! Discord transport adapter for the announce bot.

/// Discord-specific bot implementation.
pub mod bot;
/// Discord transport configuration.
pub mod config;
/// Discord runtime entrypoint.
pub mod runner;
