/// Prefix command recognition
pub mod commands;
/// Gateway event handler
pub mod handler;
/// `ChatPlatform` implementation over serenity
pub mod platform;

pub use handler::AnnounceHandler;
pub use platform::SerenityPlatform;
