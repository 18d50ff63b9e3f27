//! Argument parsing for `announce role_name [ | channel_mention] | text`

use crate::error::AnnounceError;
use crate::platform::ChannelId;
use lazy_regex::regex;

/// Maximum number of pipe-delimited fields; extra pipes stay in the body.
pub const MAX_FIELDS: usize = 3;

/// Where the announcement should be posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The channel the command was issued in
    Source,
    /// The first channel mentioned in the command message
    Mentioned,
}

/// Parsed `announce` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceArgs {
    /// Name of the role to mention, trimmed
    pub role_name: String,
    /// Target channel selector
    pub target: Target,
    /// Announcement body, trimmed
    pub body: String,
}

/// Split `raw` on whitespace-padded pipes into at most `limit` fields.
///
/// Like a bounded split: the last field keeps any remaining delimiters.
#[must_use]
pub fn split_fields(raw: &str, limit: usize) -> Vec<&str> {
    regex!(r"\s*\|\s*").splitn(raw, limit).collect()
}

/// Parse the argument string of an `announce` command.
///
/// # Errors
///
/// Returns [`AnnounceError::Syntax`] if fewer than two fields are present.
pub fn parse_announce_args(args: &str) -> Result<AnnounceArgs, AnnounceError> {
    if args.is_empty() {
        return Err(AnnounceError::Syntax);
    }

    match split_fields(args, MAX_FIELDS).as_slice() {
        [role, body] => Ok(AnnounceArgs {
            role_name: role.trim().to_string(),
            target: Target::Source,
            body: body.trim().to_string(),
        }),
        [role, _channel, body] => Ok(AnnounceArgs {
            role_name: role.trim().to_string(),
            target: Target::Mentioned,
            body: body.trim().to_string(),
        }),
        _ => Err(AnnounceError::Syntax),
    }
}

/// Body text of an edited command message: the last pipe-delimited field.
#[must_use]
pub fn edited_body(raw: &str) -> String {
    split_fields(raw, MAX_FIELDS)
        .last()
        .map(|body| body.trim().to_string())
        .unwrap_or_default()
}

/// Channel ids mentioned as `<#id>` in `raw`, in order of appearance.
#[must_use]
pub fn extract_channel_mentions(raw: &str) -> Vec<ChannelId> {
    regex!(r"<#(\d+)>")
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1))
        .filter_map(|id| id.as_str().parse::<u64>().ok())
        .map(ChannelId)
        .collect()
}
