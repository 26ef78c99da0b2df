use tz_core::config::SessionConfig;

/// Builds and reads the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl From<&SessionConfig> for SessionCookie {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.ttl_secs,
            secure: config.secure,
        }
    }
}

impl SessionCookie {
    /// `Set-Cookie` value for `session_id`.
    pub fn set_cookie(&self, session_id: &str) -> String {
        let mut value = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, session_id, self.max_age_secs
        );
        if self.secure {
            value.push_str("; Secure");
        }
        value
    }

    /// Session id from a `Cookie` request header.
    pub fn find<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|v| !v.is_empty())
    }
}
