//! Announcement permissions
//!
//! Decides who may use `announce` and which roles may be announced to.

use crate::platform::{GuildId, Member, Role, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings-store interface consulted by the workflow
pub trait AnnouncerPolicy: Send + Sync {
    /// Whether `member` may issue announcements
    fn is_announcer(&self, member: &Member) -> bool;
    /// Whether `role` may be the target of an announcement
    fn is_announcement_role(&self, role: &Role) -> bool;
}

const fn default_allow_administrators() -> bool {
    true
}

/// Per-guild announcement settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildPolicy {
    /// Role ids whose holders may announce
    #[serde(default)]
    pub announcer_roles: Vec<u64>,
    /// Role ids that may be announced to
    #[serde(default)]
    pub announcement_roles: Vec<u64>,
    /// Administrators may announce without holding an announcer role
    #[serde(default = "default_allow_administrators")]
    pub allow_administrators: bool,
}

impl Default for GuildPolicy {
    fn default() -> Self {
        Self {
            announcer_roles: Vec::new(),
            announcement_roles: Vec::new(),
            allow_administrators: default_allow_administrators(),
        }
    }
}

impl AnnouncerPolicy for GuildPolicy {
    fn is_announcer(&self, member: &Member) -> bool {
        if self.allow_administrators && member.is_administrator {
            return true;
        }
        member
            .role_ids
            .iter()
            .any(|RoleId(id)| self.announcer_roles.contains(id))
    }

    fn is_announcement_role(&self, role: &Role) -> bool {
        self.announcement_roles.contains(&role.id.get())
    }
}

/// Guild policies keyed by guild id
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    guilds: HashMap<GuildId, GuildPolicy>,
    fallback: GuildPolicy,
}

impl PolicyStore {
    /// Build a store from configuration, where keys are guild ids as strings.
    ///
    /// Keys that are not numeric are skipped with a warning.
    #[must_use]
    pub fn from_config(guilds: &HashMap<String, GuildPolicy>) -> Self {
        let guilds = guilds
            .iter()
            .filter_map(|(key, policy)| match key.trim().parse::<u64>() {
                Ok(id) => Some((GuildId(id), policy.clone())),
                Err(_) => {
                    tracing::warn!("Ignoring policy for non-numeric guild key {key:?}");
                    None
                }
            })
            .collect();
        Self {
            guilds,
            fallback: GuildPolicy::default(),
        }
    }

    /// Register or replace the policy of a guild.
    pub fn insert(&mut self, guild: GuildId, policy: GuildPolicy) {
        self.guilds.insert(guild, policy);
    }

    /// Policy for `guild`, or the default policy if none is configured.
    #[must_use]
    pub fn policy_for(&self, guild: GuildId) -> &GuildPolicy {
        self.guilds.get(&guild).unwrap_or(&self.fallback)
    }

    /// Number of configured guilds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    /// Whether no guild is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}
