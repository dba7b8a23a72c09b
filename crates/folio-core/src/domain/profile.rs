use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rules::normalize_email;
use crate::error::DomainError;

/// Access level of an admin-capable account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Editor,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Editor => "editor",
            Role::User => "user",
        }
    }

    /// Masters and editors may create, edit and delete content.
    pub fn can_edit_content(&self) -> bool {
        matches!(self, Role::Master | Role::Editor)
    }

    /// Only masters manage the allow-list.
    pub fn can_manage_access(&self) -> bool {
        matches!(self, Role::Master)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "editor" => Ok(Role::Editor),
            "user" => Ok(Role::User),
            other => Err(DomainError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Profile entity - an authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile with generated ID and timestamps.
    pub fn new(email: &str, name: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Allow-list entry gating sign-in for one email address.
///
/// `invited_by` is a weak reference to the inviting profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedEmail {
    pub email: String,
    pub role: Role,
    pub invited_by: Option<Uuid>,
    pub is_login_allowed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllowedEmail {
    pub fn invite(email: &str, role: Role, invited_by: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            email: normalize_email(email),
            role,
            invited_by,
            is_login_allowed: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the allow-list gate, returning the role granted on success.
    pub fn admit(&self) -> Result<Role, DomainError> {
        if !self.is_login_allowed {
            return Err(DomainError::Forbidden(format!(
                "sign-in disabled for {}",
                self.email
            )));
        }
        Ok(self.role)
    }
}

/// Resolve sign-in for `email` against its allow-list entry, if any.
pub fn admit_sign_in(email: &str, entry: Option<&AllowedEmail>) -> Result<Role, DomainError> {
    match entry {
        Some(entry) => entry.admit(),
        None => Err(DomainError::Forbidden(format!(
            "{} is not on the allow-list",
            normalize_email(email)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_and_permissions() {
        assert_eq!("editor".parse::<Role>().unwrap(), Role::Editor);
        assert!("owner".parse::<Role>().is_err());
        assert!(Role::Editor.can_edit_content());
        assert!(!Role::Editor.can_manage_access());
        assert!(!Role::User.can_edit_content());
        assert_eq!(serde_json::to_string(&Role::Master).unwrap(), "\"master\"");
    }

    #[test]
    fn test_gate_requires_entry() {
        let err = admit_sign_in("stranger@example.com", None).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn test_gate_respects_revocation() {
        let mut entry = AllowedEmail::invite("Editor@Example.com", Role::Editor, None);
        assert_eq!(entry.email, "editor@example.com");
        assert_eq!(admit_sign_in("editor@example.com", Some(&entry)).unwrap(), Role::Editor);

        entry.is_login_allowed = false;
        assert!(matches!(
            admit_sign_in("editor@example.com", Some(&entry)),
            Err(DomainError::Forbidden(_))
        ));
    }
}
