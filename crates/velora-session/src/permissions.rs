//! Role hierarchy checks and the static route permission table.

use std::collections::HashMap;

use velora_core::types::{User, UserRole};

/// Whether `user` carries at least the privileges of `required`.
///
/// Absence of a user is always a denial, including for `Guest`.
pub fn has_permission(user: Option<&User>, required: UserRole) -> bool {
    user.is_some_and(|u| u.role.satisfies(required))
}

/// Static route → allowed-roles table with ancestor-prefix lookup.
///
/// A route with no entry (and no ancestor entry) is public. A listed route
/// is permitted only to the roles in its set, so an anonymous caller is
/// denied on every listed route.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    /// Normalized route prefix → roles allowed under it.
    rules: HashMap<String, Vec<UserRole>>,
}

impl RoutePolicy {
    /// An empty table: every route is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// The marketplace's protected areas.
    pub fn marketplace_defaults() -> Self {
        let mut policy = Self::new();
        policy.allow("/admin", &[UserRole::Admin]);
        policy.allow("/sell", &[UserRole::Seller, UserRole::Dealer, UserRole::Admin]);
        policy.allow("/dealer", &[UserRole::Dealer, UserRole::Admin]);
        policy.allow(
            "/account",
            &[UserRole::Seller, UserRole::Dealer, UserRole::Admin],
        );
        policy.allow(
            "/appraisals",
            &[UserRole::Dealer, UserRole::Admin],
        );
        policy
    }

    /// Restrict `route` (and everything under it) to `roles`.
    pub fn allow(&mut self, route: &str, roles: &[UserRole]) {
        self.rules.insert(normalize(route), roles.to_vec());
    }

    /// Whether `user` may access `route`.
    pub fn can_access(&self, user: Option<&User>, route: &str) -> bool {
        match self.lookup(route) {
            None => true,
            Some(allowed) => user.is_some_and(|u| allowed.contains(&u.role)),
        }
    }

    /// Find the most specific rule covering `route`, walking up its
    /// ancestor prefixes (`/admin/review/42` matches a `/admin` rule).
    fn lookup(&self, route: &str) -> Option<&Vec<UserRole>> {
        let mut current = normalize(route);
        loop {
            if let Some(roles) = self.rules.get(&current) {
                return Some(roles);
            }
            match current.rfind('/') {
                Some(0) | None => return self.rules.get("/"),
                Some(idx) => current.truncate(idx),
            }
        }
    }
}

fn normalize(route: &str) -> String {
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use velora_core::types::User;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@example.com".into(),
            display_name: None,
            role,
        }
    }

    #[test]
    fn test_permission_follows_hierarchy() {
        assert!(has_permission(Some(&user(UserRole::Seller)), UserRole::Guest));
        assert!(!has_permission(Some(&user(UserRole::Guest)), UserRole::Admin));
        assert!(has_permission(Some(&user(UserRole::Admin)), UserRole::Dealer));
    }

    #[test]
    fn test_no_user_is_always_denied() {
        assert!(!has_permission(None, UserRole::Guest));
    }

    #[test]
    fn test_unlisted_route_is_public() {
        let policy = RoutePolicy::marketplace_defaults();
        assert!(policy.can_access(None, "/listings/42"));
        assert!(policy.can_access(Some(&user(UserRole::Guest)), "/public/anything"));
    }

    #[test]
    fn test_listed_route_denies_anonymous_and_wrong_role() {
        let policy = RoutePolicy::marketplace_defaults();
        assert!(!policy.can_access(None, "/admin"));
        assert!(!policy.can_access(Some(&user(UserRole::Seller)), "/admin"));
        assert!(policy.can_access(Some(&user(UserRole::Admin)), "/admin"));
    }

    #[test]
    fn test_prefix_lookup_covers_nested_routes() {
        let policy = RoutePolicy::marketplace_defaults();
        assert!(!policy.can_access(Some(&user(UserRole::Seller)), "/admin/review/42"));
        assert!(policy.can_access(Some(&user(UserRole::Seller)), "/sell/listings/new"));
        assert!(policy.can_access(Some(&user(UserRole::Dealer)), "/dealer/inventory/"));
    }
}
