//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_host: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new guest account (no host or admin privileges)
    pub fn new(id: Uuid, email: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            bio: None,
            phone: None,
            avatar_url: None,
            is_admin: false,
            is_host: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Hosts and admins may publish listings
    pub fn can_host(&self) -> bool {
        self.is_host || self.is_admin
    }
}

/// Profile fields a user may change on their own account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

/// Privilege flags only an admin may change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivilegeUpdate {
    pub is_admin: Option<bool>,
    pub is_host: Option<bool>,
}

/// User response (safe to return to the account owner or an admin)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "guest@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_host: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Present only for soft-deleted accounts (admin views)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            bio: user.bio,
            phone: user.phone,
            avatar_url: user.avatar_url,
            is_admin: user.is_admin,
            is_host: user.is_host,
            created_at: user.created_at,
            deleted_at: user.deleted_at,
        }
    }
}

/// Public profile shown to other users
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicProfile {
    pub id: Uuid,
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_host: bool,
    /// Account creation timestamp
    pub joined_at: DateTime<Utc>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            is_host: user.is_host,
            joined_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_plain_guest() {
        let user = User::new(
            Uuid::new_v4(),
            "guest@example.com".to_string(),
            "hash".to_string(),
            "Guest".to_string(),
        );
        assert!(!user.is_admin);
        assert!(!user.is_host);
        assert!(!user.can_host());
        assert!(user.is_active());
    }

    #[test]
    fn test_admin_can_host() {
        let mut user = User::new(
            Uuid::new_v4(),
            "admin@example.com".to_string(),
            "hash".to_string(),
            "Admin".to_string(),
        );
        user.is_admin = true;
        assert!(user.can_host());
    }

    #[test]
    fn test_public_profile_hides_contact_details() {
        let mut user = User::new(
            Uuid::new_v4(),
            "host@example.com".to_string(),
            "hash".to_string(),
            "Host".to_string(),
        );
        user.phone = Some("+15551234567".to_string());
        let json = serde_json::to_value(PublicProfile::from(user)).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("phone").is_none());
    }
}
