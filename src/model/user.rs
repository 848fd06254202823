//! The user entity, keyed by its natural `uid` instead of a backend-assigned
//! key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{Draft, Patch, Record};
use crate::error::ValidationError;

/// Role of a storefront user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A storefront user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    /// Natural key supplied by the identity provider.
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub blocked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Returns true for admin users.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const ID_FIELD: &'static str = "uid";

    type Draft = UserDraft;
    type Patch = UserPatch;

    fn id(&self) -> &str {
        &self.uid
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(blocked) = patch.blocked {
            self.blocked = blocked;
        }
    }

    fn touch(&mut self, at_millis: i64) {
        self.updated_at = at_millis;
    }
}

/// Creation input for a user. New users are unblocked customers unless stated
/// otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub blocked: bool,
}

impl UserDraft {
    /// Builds a customer draft.
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            role: UserRole::Customer,
            blocked: false,
        }
    }

    /// Overrides the role.
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

impl Draft for UserDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.uid.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "uid" });
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "email" });
        }
        Ok(())
    }
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

impl UserPatch {
    /// Sets the blocked flag.
    #[must_use]
    pub const fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = Some(blocked);
        self
    }

    /// Sets the role.
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Patch for UserPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = &self.email {
            if email.trim().is_empty() {
                return Err(ValidationError::EmptyField { field: "email" });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_requires_uid_and_email() {
        assert!(UserDraft::new("u1", "Ada", "ada@example.com")
            .validate()
            .is_ok());
        assert!(matches!(
            UserDraft::new("", "Ada", "ada@example.com").validate(),
            Err(ValidationError::EmptyField { field: "uid" })
        ));
        assert!(UserDraft::new("u1", "Ada", " ").validate().is_err());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Admin).unwrap(),
            "\"admin\""
        );
        let role: UserRole = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(role, UserRole::Customer);
    }

    #[test]
    fn test_patch_apply() {
        let mut user = User {
            uid: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Customer,
            blocked: false,
            created_at: 1,
            updated_at: 1,
        };
        user.apply_patch(&UserPatch::default().with_blocked(true).with_role(UserRole::Admin));
        assert!(user.blocked);
        assert!(user.is_admin());
        assert_eq!(user.name, "Ada");
    }
}
