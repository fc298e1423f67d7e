//! User roles.
//!
//! Roles are resolved by an external collaborator per request; this crate
//! only consumes the resolved set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum_macros::{Display, EnumString};

/// A role attached to a user by the role resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Moderator,
    BetaTester,
    Regular,
}

/// The resolved role set for one request.
pub type RoleSet = HashSet<Role>;

/// Convenience constructor for a role set.
pub fn role_set(roles: &[Role]) -> RoleSet {
    roles.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parses_from_snake_case() {
        assert_eq!(Role::from_str("beta_tester").unwrap(), Role::BetaTester);
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn role_set_deduplicates() {
        let roles = role_set(&[Role::Admin, Role::Admin, Role::Regular]);
        assert_eq!(roles.len(), 2);
    }
}
