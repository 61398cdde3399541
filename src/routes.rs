//! Dashboard routes and the access guard in front of them.

use std::fmt;

use crate::auth::Session;
use crate::entities::EntityKind;

/// Role required for managing admin accounts
pub const SUPER_ADMIN: &str = "SuperAdmin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
    Dashboard,
    CreateAdmin,
    List(EntityKind),
    New(EntityKind),
    Edit(EntityKind, String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::VerifyOtp => "/verify-otp".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::CreateAdmin => "/admins/create".to_string(),
            Route::List(kind) => format!("/{}", kind.resource()),
            Route::New(kind) => format!("/{}/new", kind.resource()),
            Route::Edit(kind, id) => format!("/{}/{}", kind.resource(), id),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Dashboard,
            ["login"] => Route::Login,
            ["forgot-password"] => Route::ForgotPassword,
            ["verify-otp"] => Route::VerifyOtp,
            ["reset-password"] => Route::ResetPassword,
            ["admins", "create"] => Route::CreateAdmin,
            [entity] => Route::List(entity.parse().ok()?),
            [entity, "new"] => Route::New(entity.parse().ok()?),
            [entity, id] => Route::Edit(entity.parse().ok()?, id.to_string()),
            _ => return None,
        };
        Some(route)
    }

    /// Reachable without logging in
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::ForgotPassword | Route::VerifyOtp | Route::ResetPassword
        )
    }

    pub fn required_roles(&self) -> &'static [&'static str] {
        match self {
            Route::CreateAdmin => &[SUPER_ADMIN],
            _ => &[],
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Route),
}

/// Decide whether the session may open `route`.
///
/// Not logged in sends the user to the login page; a role mismatch sends
/// them to the dashboard. Roles compare case-insensitively.
pub fn guard(session: &Session, route: &Route) -> Access {
    if route.is_public() {
        return Access::Granted;
    }

    let Some(user) = session.current_user() else {
        return Access::Redirect(Route::Login);
    };

    let roles = route.required_roles();
    if !roles.is_empty()
        && !roles
            .iter()
            .any(|role| role.eq_ignore_ascii_case(&user.role))
    {
        return Access::Redirect(Route::Dashboard);
    }

    Access::Granted
}
