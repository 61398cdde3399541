//! Signed-in session, its persistence and the auth page forms.

pub mod forms;
pub mod session;
pub mod storage;
pub mod verifier;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationErrors;

pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use verifier::{CredentialVerifier, DemoVerifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("auth storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("auth record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("Email yoki parol noto'g'ri")]
    InvalidCredentials,
}
