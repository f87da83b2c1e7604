//! Session-stored identity types.
//!
//! Session establishment (login, credential verification) happens outside
//! this service; handlers only ever read the stored identity.

use serde::{Deserialize, Serialize};

use saltbox_core::{Email, UserId, UserRole};

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the logged-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account's database ID.
    pub id: UserId,
    /// Account's email address.
    pub email: Email,
    /// Account's display name.
    pub name: String,
    /// Account's role/permission level.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this account may administer payments and settings.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in account.
    pub const CURRENT_USER: &str = "current_user";
}
