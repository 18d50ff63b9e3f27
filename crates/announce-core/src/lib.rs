#![deny(missing_docs)]
//! Announce bot core library.
//!
//! Platform-agnostic logic for the `announce` command: argument parsing,
//! role resolution, the mentionable toggle/send/revert sequence and edit
//! propagation through a bounded correlation cache.

/// Bounded insertion-order cache linking command messages to announcements.
pub mod cache;
/// Configuration management.
pub mod config;
/// Announcement text rendering.
pub mod composer;
/// Edit propagation for cached announcements.
pub mod edit;
/// User-facing error taxonomy.
pub mod error;
/// Command argument parsing.
pub mod parser;
/// Chat platform collaborator interface and domain types.
pub mod platform;
/// Who may announce and which roles are announceable.
pub mod policy;
/// Role lookup by name.
pub mod resolver;
/// The announce command workflow.
pub mod workflow;

/// Test fixtures and mock helpers.
#[cfg(test)]
pub mod testing;

pub use cache::CorrelationCache;
pub use composer::{AnnouncementRenderer, MentionRenderer};
pub use edit::EditOutcome;
pub use error::AnnounceError;
pub use platform::{ChatPlatform, PlatformError};
pub use policy::{AnnouncerPolicy, GuildPolicy, PolicyStore};
pub use workflow::{AnnounceWorkflow, CommandOutcome};
