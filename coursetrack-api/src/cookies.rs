/// Session cookie attributes
///
/// The cookie is `HttpOnly`, `SameSite=Lax`, scoped to `/`, and lives as long
/// as the server-side session. `Secure` is added in production.
///
/// ```text
/// Set-Cookie: sid=<token>.<signature>; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800
/// ```

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,

    /// Matches the session TTL
    pub max_age: Duration,

    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.session.cookie_name.clone(),
            max_age: Duration::seconds(config.session.ttl_seconds as i64),
            secure: config.api.production,
        }
    }

    /// `Set-Cookie` value carrying a signed session token
    pub fn set(&self, value: &str) -> String {
        self.build(value.to_string(), self.max_age)
    }

    /// `Set-Cookie` value that removes the cookie
    pub fn clear(&self) -> String {
        self.build(String::new(), Duration::ZERO)
    }

    fn build(&self, value: String, max_age: Duration) -> String {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(max_age)
            .build()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secure: bool) -> CookieSettings {
        CookieSettings {
            name: "sid".to_string(),
            max_age: Duration::days(7),
            secure,
        }
    }

    #[test]
    fn test_set_cookie() {
        assert_eq!(
            settings(false).set("abc.def"),
            "sid=abc.def; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800"
        );
    }

    #[test]
    fn test_clear_cookie() {
        assert_eq!(
            settings(false).clear(),
            "sid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn test_secure_in_production() {
        assert!(settings(true).set("v").contains("; Secure"));
        assert!(settings(true).clear().contains("; Secure"));
        assert!(!settings(false).set("v").contains("Secure"));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::for_memory("0123456789abcdef0123456789abcdef");
        config.session.cookie_name = "coursetrack.sid".to_string();
        config.session.ttl_seconds = 60;

        let cookies = CookieSettings::from_config(&config);
        assert_eq!(cookies.name, "coursetrack.sid");
        assert_eq!(cookies.max_age, Duration::seconds(60));
        assert!(!cookies.secure);
    }
}
