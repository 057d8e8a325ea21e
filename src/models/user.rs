use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role carried in every session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    Customer,
    Coordinator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Coordinator => "Coordinator",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub url: String,
    pub public_id: String,
}

/// User account (armazenado no MongoDB, collection `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    /// Unix timestamp (ms)
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_role() -> Role {
    Role::Customer
}

impl User {
    pub fn new(full_name: &str, email: &str, password_hash: String, role: Role) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        User {
            id: None,
            full_name: full_name.trim().to_string(),
            email: email.trim().to_string(),
            password: password_hash,
            role,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Compact user shape returned by register/login/role changes
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id_hex(),
            full_name: user.full_name.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
        }
    }
}

/// Profile and listing shape (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id_hex(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            created_at: chrono::DateTime::from_timestamp_millis(user.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_as_plain_name() {
        assert_eq!(serde_json::to_string(&Role::Coordinator).unwrap(), "\"Coordinator\"");
        let role: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_profile_never_exposes_password() {
        let mut user = User::new(" Nimal Perera ", "nimal@example.com", "$2b$hash".into(), Role::Customer);
        user.id = Some(ObjectId::new());

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Nimal Perera");
        assert_eq!(json["role"], "Customer");
    }
}
