//! Parties and roles in a handover transaction.
//!
//! Every transaction has exactly two parties: the provider, who owns the
//! item and discloses the meeting location, and the requester, who asked
//! for it. Roles are fixed at creation and never swap.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A reference to one of the two users involved in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Opaque user identifier, owned by the external user system.
    pub user_id: String,

    /// Display name embedded for rendering without a user lookup.
    pub display_name: String,
}

impl Party {
    /// Create a new party reference.
    pub fn new(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// The role a party plays in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The party handing the item over. Owns the exact address.
    Provider,

    /// The party receiving the item.
    Requester,
}

impl Role {
    /// The other side of the exchange.
    pub fn counterpart(&self) -> Role {
        match self {
            Role::Provider => Role::Requester,
            Role::Requester => Role::Provider,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Provider => write!(f, "provider"),
            Role::Requester => write!(f, "requester"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provider" => Ok(Role::Provider),
            "requester" => Ok(Role::Requester),
            other => Err(Error::ParseError(format!("unknown role: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart() {
        assert_eq!(Role::Provider.counterpart(), Role::Requester);
        assert_eq!(Role::Requester.counterpart(), Role::Provider);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Provider, Role::Requester] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
