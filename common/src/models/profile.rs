//! User profile models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display name used when a profile has neither first nor last name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A registered user, as written by the identity platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: String,
    pub created_at: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Profile {
    /// "First Last", trimmed; [`UNKNOWN_NAME`] when both parts are empty.
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

pub fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    let joined = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Profile row in the admin user list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserListItem {
    #[serde(flatten)]
    pub profile: Profile,
    pub full_name: String,
}

impl From<Profile> for UserListItem {
    fn from(profile: Profile) -> Self {
        Self {
            full_name: profile.full_name(),
            profile,
        }
    }
}
