//! Email/password auth over `/auth/v1`.

use std::sync::Arc;

use async_trait::async_trait;
use paraiso_core::{Credentials, Session, User};
use paraiso_store::{Authenticator, StoreError};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::RemoteError;
use crate::conn::Connection;
use crate::error::check;

pub struct RestAuth {
    conn: Arc<Connection>,
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserPayload,
}

/// Sign-up answers with the bare user when email confirmation is on, or with
/// a full session (`{access_token, user}`) when it is off.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: UserPayload },
    User(UserPayload),
}

impl SignUpResponse {
    fn into_user(self, fallback_email: &str) -> User {
        let payload = match self {
            SignUpResponse::Session { user } => user,
            SignUpResponse::User(user) => user,
        };
        User {
            id: payload.id,
            email: payload.email.unwrap_or_else(|| fallback_email.to_string()),
        }
    }
}

fn credentials_body(credentials: &Credentials) -> serde_json::Value {
    json!({ "email": credentials.email.trim(), "password": credentials.password })
}

/// Map auth-specific rejections onto [`StoreError`] variants callers can act on.
fn auth_error(err: RemoteError, email: &str) -> StoreError {
    match err {
        RemoteError::Server { status: 400, body }
            if body.contains("invalid_grant") || body.contains("invalid_credentials") =>
        {
            StoreError::InvalidCredentials
        }
        RemoteError::Server { status: 400 | 422, body }
            if body.to_ascii_lowercase().contains("already registered") =>
        {
            StoreError::UserExists(email.to_string())
        }
        RemoteError::Server { status: 401 | 403, .. } => StoreError::InvalidSession,
        other => other.into(),
    }
}

impl RestAuth {
    pub(crate) fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = self.conn.endpoint(path);
        let mut req = self
            .conn
            .client
            .post(&url)
            .header("apikey", &self.conn.config.anon_key)
            .json(body);
        req = match bearer {
            Some(token) => req.bearer_auth(token),
            None => req.bearer_auth(&self.conn.config.anon_key),
        };
        check(req.send().await?).await
    }
}

#[async_trait]
impl Authenticator for RestAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, StoreError> {
        let email = credentials.email.trim();
        let resp = self
            .post("auth/v1/signup", &credentials_body(credentials), None)
            .await
            .map_err(|e| auth_error(e, email))?;
        let parsed: SignUpResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::from(RemoteError::from(e)))?;
        let user = parsed.into_user(email);
        info!(user_id = %user.id, "signed up");
        Ok(user)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError> {
        let email = credentials.email.trim();
        let resp = self
            .post(
                "auth/v1/token?grant_type=password",
                &credentials_body(credentials),
                None,
            )
            .await
            .map_err(|e| auth_error(e, email))?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::from(RemoteError::from(e)))?;
        let session = Session {
            access_token: token.access_token,
            user: User {
                id: token.user.id,
                email: token.user.email.unwrap_or_else(|| email.to_string()),
            },
        };
        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), StoreError> {
        self.post(
            "auth/v1/logout",
            &json!({}),
            Some(session.access_token.as_str()),
        )
        .await
        .map_err(|e| auth_error(e, &session.user.email))?;
        info!(user_id = %session.user.id, "signed out");
        Ok(())
    }

    fn session_changed(&self, session: Option<&Session>) {
        self.conn
            .set_access_token(session.map(|s| s.access_token.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::test_connection;

    #[test]
    fn sign_up_bare_user() {
        let json = r#"{"id":"u1","email":"ana@example.org","aud":"authenticated"}"#;
        let parsed: SignUpResponse = serde_json::from_str(json).unwrap();
        let user = parsed.into_user("fallback@example.org");
        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "ana@example.org");
    }

    #[test]
    fn sign_up_with_session() {
        let json = r#"{"access_token":"t","token_type":"bearer","user":{"id":"u2"}}"#;
        let parsed: SignUpResponse = serde_json::from_str(json).unwrap();
        let user = parsed.into_user("bia@example.org");
        assert_eq!(user.id, "u2");
        assert_eq!(user.email, "bia@example.org");
    }

    #[test]
    fn token_response_parses() {
        let json = r#"{"access_token":"abc","expires_in":3600,"user":{"id":"u1","email":"ana@example.org"}}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.user.id, "u1");
    }

    #[test]
    fn invalid_grant_is_invalid_credentials() {
        let err = auth_error(
            RemoteError::Server {
                status: 400,
                body: r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
                    .into(),
            },
            "ana@example.org",
        );
        assert!(matches!(err, StoreError::InvalidCredentials));
    }

    #[test]
    fn already_registered_is_user_exists() {
        let err = auth_error(
            RemoteError::Server {
                status: 422,
                body: r#"{"msg":"User already registered"}"#.into(),
            },
            "ana@example.org",
        );
        assert!(matches!(err, StoreError::UserExists(e) if e == "ana@example.org"));
    }

    #[test]
    fn other_server_errors_pass_through() {
        let err = auth_error(
            RemoteError::Server {
                status: 500,
                body: "boom".into(),
            },
            "ana@example.org",
        );
        assert!(matches!(err, StoreError::Backend { status: 500, .. }));
    }

    #[test]
    fn session_change_sets_bearer() {
        let conn = test_connection();
        let auth = RestAuth::new(conn.clone());
        let session = Session {
            access_token: "user-token".into(),
            user: User {
                id: "u1".into(),
                email: "ana@example.org".into(),
            },
        };
        auth.session_changed(Some(&session));
        assert_eq!(conn.bearer(), "user-token");
        auth.session_changed(None);
        assert_eq!(conn.bearer(), "anon-key");
    }
}
