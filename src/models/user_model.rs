use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Manager,
    Admin,
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Manager | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Locked,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Locked => "locked",
            UserStatus::Suspended => "suspended",
        }
    }
}

/// Stored shape of a user document, password hash and OTP state
/// included. Never returned to clients; see [`UserResponse`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_requested_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Client-facing projection of a user document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserStatusPatch {
    pub status: UserStatus,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "$2b$12$secret".into(),
            role: Role::Customer,
            status: UserStatus::Active,
            otp_code: Some("123456".into()),
            otp_expires_at: Some(DateTime::now()),
            otp_requested_at: Some(DateTime::now()),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn stored_document_keeps_the_password_hash() {
        let doc = mongodb::bson::to_document(&sample_user()).unwrap();
        assert_eq!(doc.get_str("password").unwrap(), "$2b$12$secret");
        assert_eq!(doc.get_str("otp_code").unwrap(), "123456");
    }

    #[test]
    fn response_never_carries_credentials() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("otp_code").is_none());
        assert_eq!(json["role"], "customer");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn staff_levels_pass_the_staff_gate_only() {
        assert!(!Role::Customer.is_staff());
        assert!(Role::Staff.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Manager.is_admin());
        assert!(Role::Admin.is_admin());
    }
}
