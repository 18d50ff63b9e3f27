//! Role lookup by name, restricted to announceable roles

use crate::platform::Role;

/// Result of resolving a role name to exactly one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleResolution {
    /// Exactly one announceable role matched
    Found(Role),
    /// No announceable role matched
    NotFound,
    /// Several announceable roles share the name
    Ambiguous(usize),
}

/// Roles whose name equals `query` (case-insensitive, trimmed) and that
/// satisfy `is_announcement_role`, in the order of `roles`.
#[must_use]
pub fn resolve<F>(roles: &[Role], query: &str, is_announcement_role: F) -> Vec<Role>
where
    F: Fn(&Role) -> bool,
{
    let query = query.trim().to_lowercase();
    roles
        .iter()
        .filter(|role| role.name.to_lowercase() == query)
        .filter(|role| is_announcement_role(role))
        .cloned()
        .collect()
}

/// Resolve `query` and require a single surviving match.
pub fn resolve_single<F>(roles: &[Role], query: &str, is_announcement_role: F) -> RoleResolution
where
    F: Fn(&Role) -> bool,
{
    let mut matches = resolve(roles, query, is_announcement_role);
    match matches.len() {
        0 => RoleResolution::NotFound,
        1 => matches
            .pop()
            .map_or(RoleResolution::NotFound, RoleResolution::Found),
        n => RoleResolution::Ambiguous(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RoleId;

    fn role(id: u64, name: &str) -> Role {
        Role {
            id: RoleId(id),
            name: name.to_string(),
            mentionable: false,
            position: 1,
        }
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let roles = vec![role(1, "vip"), role(2, "vip")];
        assert_eq!(
            resolve_single(&roles, "vip", |_| true),
            RoleResolution::Ambiguous(2)
        );
    }

    #[test]
    fn test_no_roles_not_found() {
        assert_eq!(resolve_single(&[], "vip", |_| true), RoleResolution::NotFound);
    }

    #[test]
    fn test_single_match_found() {
        let roles = vec![role(1, "vip"), role(2, "members")];
        assert_eq!(
            resolve_single(&roles, "vip", |_| true),
            RoleResolution::Found(role(1, "vip"))
        );
    }

    #[test]
    fn test_predicate_filters_duplicates() {
        let roles = vec![role(1, "vip"), role(2, "vip")];
        assert_eq!(
            resolve_single(&roles, "vip", |r| r.id == RoleId(2)),
            RoleResolution::Found(role(2, "vip"))
        );
        assert_eq!(
            resolve_single(&roles, "vip", |_| false),
            RoleResolution::NotFound
        );
    }

    #[test]
    fn test_name_match_ignores_case_and_padding() {
        let roles = vec![role(1, "Game Night"), role(2, "Gamers")];
        let found = resolve(&roles, "  game night ", |_| true);
        assert_eq!(found, vec![role(1, "Game Night")]);
    }

    #[test]
    fn test_preserves_input_order() {
        let roles = vec![role(3, "news"), role(1, "News"), role(2, "other")];
        let ids: Vec<_> = resolve(&roles, "news", |_| true)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![RoleId(3), RoleId(1)]);
    }
}
