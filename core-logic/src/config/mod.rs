use serde::{Deserialize, Serialize};

/// A proxy endpoint plus optional basic-auth credentials.
///
/// `url` carries only scheme, host and port; credentials are kept separate so
/// HTTP clients can attach them through their own auth mechanisms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn has_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}
