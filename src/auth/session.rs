use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::forms::LoginForm;
use super::{CredentialVerifier, SessionError, StoragePort, User};

/// Storage key of the persisted `{token, user}` record
pub const STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedAuth {
    token: Option<String>,
    user: Option<User>,
}

/// The signed-in state of one running application.
///
/// Built once at start-up with its storage and verifier; call `restore()`
/// to pick up a previously persisted login.
pub struct Session {
    storage: Arc<dyn StoragePort>,
    verifier: Arc<dyn CredentialVerifier>,
    token: Option<String>,
    user: Option<User>,
    checking: bool,
}

impl Session {
    pub fn new(storage: Arc<dyn StoragePort>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            storage,
            verifier,
            token: None,
            user: None,
            checking: true,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// True until the first `restore()` has finished
    pub fn is_checking(&self) -> bool {
        self.checking
    }

    /// Reload the persisted record; unknown or missing tokens log out.
    pub fn restore(&mut self) -> Result<(), SessionError> {
        self.checking = true;
        let result = self.restore_inner();
        self.checking = false;
        result
    }

    fn restore_inner(&mut self) -> Result<(), SessionError> {
        let persisted = match self.storage.load(STORAGE_KEY)? {
            Some(raw) => serde_json::from_str::<PersistedAuth>(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable auth record: {}", e);
                PersistedAuth::default()
            }),
            None => PersistedAuth::default(),
        };

        let token = match persisted.token {
            Some(token) if !token.is_empty() && token != "undefined" => token,
            _ => return self.logout(),
        };

        match self.verifier.restore(&token) {
            Some(user) => {
                info!("Restored session for {}", user.email);
                self.token = Some(token);
                self.user = Some(user);
                Ok(())
            }
            None => {
                info!("Persisted token not recognised, logging out");
                self.logout()
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, SessionError> {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
        .validate()
        .map_err(SessionError::Invalid)?;

        let (token, user) = self
            .verifier
            .verify(email, password)
            .ok_or(SessionError::InvalidCredentials)?;

        let record = PersistedAuth {
            token: Some(token.clone()),
            user: Some(user.clone()),
        };
        self.storage
            .save(STORAGE_KEY, &serde_json::to_string(&record)?)?;

        info!("Logged in as {} ({})", user.email, user.role);
        self.token = Some(token);
        self.checking = false;
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(user) = &self.user {
            info!("Logging out {}", user.email);
        }
        self.token = None;
        self.user = None;
        self.storage.remove(STORAGE_KEY)
    }

    #[cfg(test)]
    pub(crate) fn set_user_for_tests(&mut self, user: User) {
        self.token = Some("test-token".to_string());
        self.user = Some(user);
        self.checking = false;
    }
}
