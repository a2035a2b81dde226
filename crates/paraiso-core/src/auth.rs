//! Identity types shared by the auth backends and the session context.

use serde::{Deserialize, Serialize};

use crate::forms::{ValidationError, require, validate_email};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// An authenticated session. The access token is sent as the bearer token
/// on every backend call made on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials() {
        assert!(Credentials::new("ana@example.org", "secret").validate().is_ok());
    }

    #[test]
    fn short_password_rejected() {
        let err = Credentials::new("ana@example.org", "12345")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort { min: 6 });
    }

    #[test]
    fn bad_email_rejected() {
        let err = Credentials::new("ana.example.org", "secret123")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }

    #[test]
    fn session_json_roundtrip() {
        let session = Session {
            access_token: "tok".into(),
            user: User {
                id: "u1".into(),
                email: "ana@example.org".into(),
            },
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
