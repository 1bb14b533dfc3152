use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Registration body. Fields are optional so the validator can collect every
/// missing-field error in one pass instead of failing at deserialization.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Self-update body. Carrying an email is a validation error, not a silent
/// drop; any other unknown field is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// External representation of a user: never the digest, never the timestamps.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_flattens_user_and_adds_token() {
        let response = LoginResponse {
            user: PublicUser {
                id: 3,
                name: "A".into(),
                email: "a@a.com".into(),
            },
            token: "jwt".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["email"], "a@a.com");
        assert_eq!(json["token"], "jwt");
        assert!(json.get("password").is_none());
    }
}
