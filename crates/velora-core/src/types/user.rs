//! User snapshot and role hierarchy types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketplace role hierarchy, lowest to highest.
///
/// The hierarchy is strictly monotonic: a role carries every privilege of
/// the roles below it. `Guest < Seller < Dealer < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Unauthenticated or browse-only visitor.
    Guest,
    /// Private seller with own listings.
    Seller,
    /// Professional dealer with inventory management.
    Dealer,
    /// Platform administrator (review workflows, verification).
    Admin,
}

impl UserRole {
    /// Maps the role to a numeric level for hierarchy comparison.
    pub fn level(&self) -> u8 {
        match self {
            Self::Guest => 0,
            Self::Seller => 1,
            Self::Dealer => 2,
            Self::Admin => 3,
        }
    }

    /// Returns whether this role carries at least the privileges of `required`.
    pub fn satisfies(&self, required: UserRole) -> bool {
        self.level() >= required.level()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Seller => write!(f, "seller"),
            Self::Dealer => write!(f, "dealer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "seller" => Ok(Self::Seller),
            "dealer" => Ok(Self::Dealer),
            "admin" => Ok(Self::Admin),
            other => Err(crate::error::AppError::session(format!(
                "Unknown role: {other}"
            ))),
        }
    }
}

/// Snapshot of the authenticated user, cached alongside the tokens.
///
/// This is not the authoritative account record; the auth backend owns that.
/// The snapshot exists so guards can answer role questions without a network
/// round trip, and is re-synced on forced validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Display name shown in the UI.
    pub display_name: Option<String>,
    /// Role at the time the snapshot was taken.
    pub role: UserRole,
}
