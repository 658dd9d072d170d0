//! Route definitions and the navigation seam

use std::fmt;

/// Screens the auth flows can send the user to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    /// Registration, optionally pre-filled with local phone digits.
    Register { phone: Option<String> },
    Kyc,
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/auth/login",
            Route::Register { .. } => "/auth/register",
            Route::Kyc => "/auth/kyc",
            Route::Home => "/app/home",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transitions the displayed screen. `replace` drops the current entry from
/// history instead of pushing a new one.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route, replace: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Landing.to_string(), "/");
        assert_eq!(Route::Login.to_string(), "/auth/login");
        assert_eq!(
            Route::Register {
                phone: Some("241234567".to_string())
            }
            .path(),
            "/auth/register"
        );
        assert_eq!(Route::Kyc.path(), "/auth/kyc");
        assert_eq!(Route::Home.path(), "/app/home");
    }
}
