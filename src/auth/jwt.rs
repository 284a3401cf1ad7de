use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::user_model::{Role, User};

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id (ObjectId hex).
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(user: &User, secret: &str) -> Result<String, ApiError> {
    let id = user
        .id
        .ok_or_else(|| ApiError::Internal("user without id".to_string()))?;
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: id.to_hex(),
        username: user.username.clone(),
        role: user.role,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))
}

pub fn subject_id(claims: &Claims) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("invalid token subject".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_model::UserStatus;
    use mongodb::bson::DateTime;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            username: "cashier1".into(),
            email: "cashier1@example.com".into(),
            password: "hash".into(),
            role: Role::Staff,
            status: UserStatus::Active,
            otp_code: None,
            otp_expires_at: None,
            otp_requested_at: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let user = sample_user();
        let token = issue_token(&user, "a-long-enough-secret").unwrap();
        let claims = decode_token(&token, "a-long-enough-secret").unwrap();
        assert_eq!(claims.sub, user.id.unwrap().to_hex());
        assert_eq!(claims.username, "cashier1");
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(subject_id(&claims).unwrap(), user.id.unwrap());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&sample_user(), "a-long-enough-secret").unwrap();
        assert!(decode_token(&token, "a-different-secret-here").is_err());
    }
}
