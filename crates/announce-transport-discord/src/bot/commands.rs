//! Prefix command recognition.
//!
//! Only `announce` is understood; every other message is ignored.

/// Name of the single supported command.
pub const ANNOUNCE: &str = "announce";

/// Argument string of an `announce` command in `content`, if it is one.
///
/// The command name is matched case-insensitively and must be followed by
/// whitespace or the end of the message.
#[must_use]
pub fn announce_args<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let name_len = rest
        .find(char::is_whitespace)
        .unwrap_or(rest.len());
    let (name, args) = rest.split_at(name_len);
    name.eq_ignore_ascii_case(ANNOUNCE).then(|| args.trim())
}
