//! User account types

use serde::{Deserialize, Serialize};

/// A user account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login e-mail
    pub email: String,
    /// Avatar file name, relative to the image host
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Body of `PUT users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Account being updated
    pub user_id: String,
    /// New display name
    pub name: String,
    /// New password, only when changing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Current password, required by the backend to change it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
}

impl ProfileUpdate {
    /// Creates an update that only changes the display name.
    #[must_use]
    pub fn rename(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            password: None,
            old_password: None,
        }
    }

    /// Adds a password change to the update.
    #[must_use]
    pub fn with_password(
        mut self,
        old_password: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.old_password = Some(old_password.into());
        self.password = Some(password.into());
        self
    }

    /// Applies the update to a cached user record.
    pub fn apply_to(&self, user: &mut UserDto) {
        user.name.clone_from(&self.name);
    }
}

/// Body of `POST users` (account creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login e-mail
    pub email: String,
    /// Initial password
    pub password: String,
}
