use chrono::Utc;
use subtle::{Choice, ConstantTimeEq};

use super::User;

/// Checks credentials and recognises previously issued tokens.
pub trait CredentialVerifier: Send + Sync {
    /// A token and the signed-in user, or `None` for bad credentials.
    fn verify(&self, email: &str, password: &str) -> Option<(String, User)>;

    /// The user behind a persisted token, or `None` if it is not recognised.
    fn restore(&self, token: &str) -> Option<User>;
}

pub const DEMO_EMAIL: &str = "admin@gmail.com";
pub const DEMO_PASSWORD: &str = "admin123";
const DEMO_TOKEN_PREFIX: &str = "demo-token-";

/// Offline verifier with one hardcoded SuperAdmin account.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoVerifier;

impl DemoVerifier {
    pub fn demo_user() -> User {
        User {
            id: "demo-user-001".to_string(),
            email: DEMO_EMAIL.to_string(),
            first_name: Some("Admin".to_string()),
            last_name: Some("Demo".to_string()),
            role: "SuperAdmin".to_string(),
        }
    }
}

/// Constant-time check of an email/password pair. Both halves are always
/// compared.
fn credentials_match(
    email: &str,
    password: &str,
    expected_email: &str,
    expected_password: &str,
) -> bool {
    let email_ok = bytes_equal(email, expected_email);
    let password_ok = bytes_equal(password, expected_password);
    (email_ok & password_ok).into()
}

fn bytes_equal(given: &str, expected: &str) -> Choice {
    // Slices of different length compare unequal
    given.as_bytes().ct_eq(expected.as_bytes())
}

impl CredentialVerifier for DemoVerifier {
    fn verify(&self, email: &str, password: &str) -> Option<(String, User)> {
        if !credentials_match(email, password, DEMO_EMAIL, DEMO_PASSWORD) {
            return None;
        }

        let token = format!("{}{}", DEMO_TOKEN_PREFIX, Utc::now().timestamp_millis());
        Some((token, Self::demo_user()))
    }

    fn restore(&self, token: &str) -> Option<User> {
        token
            .starts_with(DEMO_TOKEN_PREFIX)
            .then(Self::demo_user)
    }
}
