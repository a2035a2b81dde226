//! Session context: the signed-in user, shared by every service.
//!
//! Built once at start-up around an [`Authenticator`]. Every change of the
//! current session is forwarded to the authenticator so that backend calls
//! carry the right bearer token.

use std::sync::{Arc, RwLock};

use paraiso_core::{Credentials, Session, User};
use paraiso_store::{Authenticator, StoreError};
use tracing::{info, warn};

use crate::AppError;
use crate::notify::{Notification, Notifier};

pub struct SessionContext {
    auth: Arc<dyn Authenticator>,
    notifier: Arc<dyn Notifier>,
    current: RwLock<Option<Session>>,
}

fn auth_message(err: &StoreError) -> String {
    match err {
        StoreError::InvalidCredentials => "Wrong email or password.".to_string(),
        StoreError::UserExists(email) => format!("{email} is already registered."),
        other => other.to_string(),
    }
}

impl SessionContext {
    pub fn new(auth: Arc<dyn Authenticator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth,
            notifier,
            current: RwLock::new(None),
        }
    }

    /// Adopt a session persisted by an earlier run.
    pub fn restore(&self, session: Session) {
        info!(user_id = %session.user.id, "restored session");
        self.set(Some(session));
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_session().map(|s| s.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Gate for private screens.
    pub fn require_user(&self) -> Result<User, AppError> {
        self.current_user().ok_or(AppError::NotAuthenticated)
    }

    fn set(&self, session: Option<Session>) {
        self.auth.session_changed(session.as_ref());
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    /// Validate before any I/O. A mistake is reported like a failed attempt.
    fn checked(
        &self,
        email: &str,
        password: &str,
        title: &str,
    ) -> Result<Credentials, AppError> {
        let credentials = Credentials::new(email, password);
        if let Err(e) = credentials.validate() {
            self.notifier.notify(Notification::error(title, e.to_string()));
            return Err(e.into());
        }
        Ok(credentials)
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AppError> {
        let credentials = self.checked(email, password, "Sign-up failed")?;
        match self.auth.sign_up(&credentials).await {
            Ok(user) => {
                self.notifier.notify(Notification::info(
                    "Account created",
                    "Check your email to confirm the registration.",
                ));
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "sign-up failed");
                self.notifier
                    .notify(Notification::error("Sign-up failed", auth_message(&e)));
                Err(e.into())
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let credentials = self.checked(email, password, "Sign-in failed")?;
        match self.auth.sign_in(&credentials).await {
            Ok(session) => {
                self.set(Some(session.clone()));
                self.notifier.notify(Notification::info(
                    "Welcome back",
                    format!("Signed in as {}.", session.user.email),
                ));
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                self.notifier
                    .notify(Notification::error("Sign-in failed", auth_message(&e)));
                Err(e.into())
            }
        }
    }

    /// End the session. The local session is dropped even when the remote
    /// call fails; an already-expired session is not an error.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let result = self.auth.sign_out(&session).await;
        self.set(None);
        match result {
            Ok(()) | Err(StoreError::InvalidSession) => Ok(()),
            Err(e) => {
                warn!(error = %e, "sign-out failed remotely");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::testing::harness;
    use async_trait::async_trait;
    use paraiso_core::ValidationError;
    use paraiso_store::MemoryAuth;
    use std::sync::Mutex;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let h = harness();
        let session = h.app.session();
        assert!(!session.is_signed_in());

        let user = session.sign_up("Ana@Example.org", "secret1").await.unwrap();
        assert!(!session.is_signed_in());

        let signed = session.sign_in("ana@example.org", "secret1").await.unwrap();
        assert_eq!(signed.user, user);
        assert_eq!(session.current_user(), Some(user));
        assert_eq!(h.auth.active_sessions(), 1);
    }

    #[tokio::test]
    async fn short_password_rejected_before_io() {
        let h = harness();
        let err = h.app.session().sign_in("ana@example.org", "12345").await;
        assert!(matches!(
            err,
            Err(AppError::Validation(ValidationError::PasswordTooShort { min: 6 }))
        ));
        assert_eq!(h.auth.active_sessions(), 0);
        let errors = h.notes.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].title, "Sign-in failed");
        assert_eq!(
            errors[0].description,
            ValidationError::PasswordTooShort { min: 6 }.to_string()
        );
        assert!(!errors[0].blocking);
    }

    #[tokio::test]
    async fn invalid_sign_up_is_reported() {
        let h = harness();
        let err = h.app.session().sign_up("not-an-email", "secret1").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
        let errors = h.notes.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].title, "Sign-up failed");
    }

    #[tokio::test]
    async fn wrong_password_notifies() {
        let h = harness();
        let session = h.app.session();
        session.sign_up("ana@example.org", "secret1").await.unwrap();
        let err = session.sign_in("ana@example.org", "secret2").await;
        assert!(matches!(
            err,
            Err(AppError::Store(StoreError::InvalidCredentials))
        ));
        assert!(!session.is_signed_in());
        let errors = h.notes.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].description, "Wrong email or password.");
    }

    #[tokio::test]
    async fn duplicate_sign_up() {
        let h = harness();
        let session = h.app.session();
        session.sign_up("ana@example.org", "secret1").await.unwrap();
        assert!(matches!(
            session.sign_up("ana@example.org", "other12").await,
            Err(AppError::Store(StoreError::UserExists(_)))
        ));
    }

    #[tokio::test]
    async fn sign_out_clears_session() {
        let h = harness();
        let session = h.app.session();
        session.sign_up("ana@example.org", "secret1").await.unwrap();
        session.sign_in("ana@example.org", "secret1").await.unwrap();
        session.sign_out().await.unwrap();
        assert!(!session.is_signed_in());
        assert_eq!(h.auth.active_sessions(), 0);
        // Signing out twice is harmless.
        session.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn restored_stale_session_signs_out_quietly() {
        let h = harness();
        let session = h.app.session();
        session.restore(Session {
            access_token: "expired".into(),
            user: User {
                id: "u1".into(),
                email: "ana@example.org".into(),
            },
        });
        assert!(session.require_user().is_ok());
        session.sign_out().await.unwrap();
        assert!(matches!(
            session.require_user(),
            Err(AppError::NotAuthenticated)
        ));
    }

    /// Records every session change pushed to the authenticator.
    struct Tracking {
        inner: MemoryAuth,
        seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl Authenticator for Tracking {
        async fn sign_up(&self, c: &Credentials) -> Result<User, StoreError> {
            self.inner.sign_up(c).await
        }
        async fn sign_in(&self, c: &Credentials) -> Result<Session, StoreError> {
            self.inner.sign_in(c).await
        }
        async fn sign_out(&self, s: &Session) -> Result<(), StoreError> {
            self.inner.sign_out(s).await
        }
        fn session_changed(&self, session: Option<&Session>) {
            self.seen
                .lock()
                .unwrap()
                .push(session.map(|s| s.access_token.clone()));
        }
    }

    #[tokio::test]
    async fn authenticator_follows_session() {
        let auth = Arc::new(Tracking {
            inner: MemoryAuth::new(),
            seen: Mutex::new(Vec::new()),
        });
        let ctx = SessionContext::new(auth.clone(), Arc::new(RecordingNotifier::new()));
        ctx.sign_up("ana@example.org", "secret1").await.unwrap();
        let session = ctx.sign_in("ana@example.org", "secret1").await.unwrap();
        ctx.sign_out().await.unwrap();
        assert_eq!(
            *auth.seen.lock().unwrap(),
            vec![Some(session.access_token), None]
        );
    }
}
