use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::domain::UserId;

pub const NOT_AUTHENTICATED: &str =
    "You are not authenticated.\nPlease use\n\n/login PASSWORD\n\nto authenticate";
pub const LOGIN_USAGE: &str = "Please use\n\n/login PASSWORD\n\nto authenticate";
pub const LOGIN_OK: &str = "Login successful";
pub const LOGIN_WRONG: &str = "Wrong password";

/// Result of the authentication guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    /// Reply to send when access is denied.
    pub fn denial_message(self) -> Option<&'static str> {
        match self {
            Access::Allow => None,
            Access::Deny => Some(NOT_AUTHENTICATED),
        }
    }
}

/// Shared-secret login gate.
///
/// Once a user logs in they stay authenticated until the process exits:
/// there is no expiry, logout, or attempt counting.
pub struct CredentialGate {
    secret: String,
    authenticated: Mutex<HashSet<UserId>>,
}

impl CredentialGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            authenticated: Mutex::new(HashSet::new()),
        }
    }

    /// Compare `supplied` to the configured secret; on match mark `user` as authenticated.
    pub async fn authenticate(&self, user: UserId, supplied: &str) -> bool {
        if supplied != self.secret {
            return false;
        }
        self.authenticated.lock().await.insert(user);
        true
    }

    pub async fn is_authenticated(&self, user: UserId) -> bool {
        self.authenticated.lock().await.contains(&user)
    }

    pub async fn require_authenticated(&self, user: UserId) -> Access {
        if self.is_authenticated(user).await {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    /// Handle the argument string of `/login` and return the reply text.
    ///
    /// The whole trimmed argument is the secret, so passwords may contain spaces.
    pub async fn login(&self, user: UserId, args: &str) -> &'static str {
        let secret = args.trim();
        if secret.is_empty() {
            return LOGIN_USAGE;
        }

        if self.authenticate(user, secret).await {
            tracing::info!(user_id = user.0, "login succeeded");
            LOGIN_OK
        } else {
            tracing::warn!(user_id = user.0, "login failed: wrong password");
            LOGIN_WRONG
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unauthenticated_by_default() {
        let gate = CredentialGate::new("s3cret");
        assert!(!gate.is_authenticated(UserId(1)).await);
        assert_eq!(gate.require_authenticated(UserId(1)).await, Access::Deny);
        assert_eq!(Access::Deny.denial_message(), Some(NOT_AUTHENTICATED));
    }

    #[tokio::test]
    async fn wrong_password_after_login_keeps_session() {
        let gate = CredentialGate::new("s3cret");
        assert!(!gate.authenticate(UserId(1), "nope").await);
        assert!(!gate.is_authenticated(UserId(1)).await);

        assert!(gate.authenticate(UserId(1), "s3cret").await);
        assert!(!gate.authenticate(UserId(1), "nope").await);
        assert!(gate.is_authenticated(UserId(1)).await);
        assert_eq!(gate.require_authenticated(UserId(1)).await, Access::Allow);

        // Other identities are unaffected.
        assert!(!gate.is_authenticated(UserId(2)).await);
    }

    #[tokio::test]
    async fn login_parses_arguments() {
        let gate = CredentialGate::new("s3cret");
        assert_eq!(gate.login(UserId(7), "").await, LOGIN_USAGE);
        assert_eq!(gate.login(UserId(7), "   ").await, LOGIN_USAGE);
        assert!(!gate.is_authenticated(UserId(7)).await);

        assert_eq!(gate.login(UserId(7), "S3CRET").await, LOGIN_WRONG);
        assert_eq!(gate.login(UserId(7), " s3cret ").await, LOGIN_OK);
        assert!(gate.is_authenticated(UserId(7)).await);
    }

    #[tokio::test]
    async fn login_accepts_secret_with_spaces() {
        let gate = CredentialGate::new("two words");
        assert_eq!(gate.login(UserId(3), "two").await, LOGIN_WRONG);
        assert_eq!(gate.login(UserId(3), "two words extra").await, LOGIN_WRONG);
        assert!(!gate.is_authenticated(UserId(3)).await);

        assert_eq!(gate.login(UserId(3), "two words").await, LOGIN_OK);
        assert!(gate.is_authenticated(UserId(3)).await);
    }
}
