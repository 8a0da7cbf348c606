//! Session state: where the front end must navigate after the backend rejected us.

use fileshare_core::constants::LOGIN_PATH;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Navigation {
    Login { path: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    login_path: String,
    navigation: Option<Navigation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl Session {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            navigation: None,
        }
    }

    /// Record the redirect to the login page. Repeated 401s keep a single redirect.
    pub fn redirect_to_login(&mut self) -> &Navigation {
        if self.navigation.is_none() {
            tracing::warn!(path = %self.login_path, "Authentication required, redirecting to login");
        }
        self.navigation.get_or_insert_with(|| Navigation::Login {
            path: self.login_path.clone(),
        })
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    pub fn needs_login(&self) -> bool {
        matches!(self.navigation, Some(Navigation::Login { .. }))
    }
}
