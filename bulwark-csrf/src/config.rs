use crate::error::{CsrfError, Result};
use crate::secret::Secret;
use bulwark_config::{ConfigError, ConfigManager};
use std::sync::Arc;

/// Default cookie carrying the wire token
pub const DEFAULT_COOKIE_NAME: &str = "csrf";

/// Default request header echoing the wire token
pub const DEFAULT_HEADER_NAME: &str = "x-csrf-token";

/// Configuration key for the signing secret (`CSRF_SECRET` in the environment)
pub const SECRET_KEY: &str = "csrf_secret";

/// CSRF protection configuration
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Signing secret shared by every component
    pub secret: Arc<Secret>,

    /// Attributes of the issued cookie
    pub cookie: CookieOptions,

    /// Header name the client mirrors the cookie into
    pub header_name: String,

    /// Methods the guard lets through without checking
    pub safe_methods: Vec<String>,
}

/// Attributes for the `Set-Cookie` written on issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    /// Must stay off for the double-submit pattern: client script reads the cookie
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: false,
            same_site: SameSite::Strict,
        }
    }
}

impl CookieOptions {
    /// Render a `Set-Cookie` header value. No expiry is set, so the
    /// cookie lives for the browser session.
    pub fn to_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, value, self.path);

        if let Some(ref domain) = self.domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }

        if self.secure {
            cookie.push_str("; Secure");
        }

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }

        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie
    }
}

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl CsrfConfig {
    /// Create a configuration with defaults around an explicit secret
    pub fn new(secret: Secret) -> Self {
        Self {
            secret: Arc::new(secret),
            cookie: CookieOptions::default(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            safe_methods: vec![
                "GET".to_string(),
                "HEAD".to_string(),
                "OPTIONS".to_string(),
            ],
        }
    }

    /// Build from loaded configuration.
    ///
    /// Reads `csrf_secret` (required) and the optional `csrf_cookie_name`,
    /// `csrf_header_name` and `csrf_cookie_secure` keys.
    pub fn from_config(config: &ConfigManager) -> Result<Self> {
        let secret = match config.get_string(SECRET_KEY) {
            Ok(secret) if !secret.is_empty() => secret,
            Ok(_) | Err(ConfigError::KeyNotFound(_)) => return Err(CsrfError::MissingSecret),
            Err(e) => return Err(e.into()),
        };

        let mut csrf = Self::new(Secret::new(secret)?);

        if let Ok(name) = config.get_string("csrf_cookie_name") {
            csrf = csrf.with_cookie_name(name);
        }

        if let Ok(name) = config.get_string("csrf_header_name") {
            csrf = csrf.with_header_name(name);
        }

        if config.has("csrf_cookie_secure") {
            csrf = csrf.with_cookie_secure(config.get_bool("csrf_cookie_secure")?);
        }

        Ok(csrf)
    }

    /// Build from the process environment (`CSRF_SECRET`, ...)
    pub fn from_env() -> Result<Self> {
        let config = ConfigManager::new();
        config.load_env()?;
        Self::from_config(&config)
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie.name = name.into();
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie.path = path.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    pub fn with_cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.same_site = same_site;
        self
    }

    /// Replace the methods the guard skips; an empty list guards everything
    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret {
        Secret::new("test-secret").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = CsrfConfig::new(secret());

        assert_eq!(config.cookie.name, "csrf");
        assert_eq!(config.header_name, "x-csrf-token");
        assert_eq!(config.cookie.path, "/");
        assert!(config.cookie.secure);
        assert!(!config.cookie.http_only);
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.cookie.domain, None);
        assert_eq!(config.safe_methods, vec!["GET", "HEAD", "OPTIONS"]);
    }

    #[test]
    fn test_builder() {
        let config = CsrfConfig::new(secret())
            .with_cookie_name("_csrf")
            .with_header_name("X-XSRF-TOKEN")
            .with_cookie_secure(false)
            .with_cookie_same_site(SameSite::Lax)
            .with_cookie_domain("example.com")
            .with_safe_methods(vec![]);

        assert_eq!(config.cookie.name, "_csrf");
        assert_eq!(config.header_name, "X-XSRF-TOKEN");
        assert!(!config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert_eq!(config.cookie.domain.as_deref(), Some("example.com"));
        assert!(config.safe_methods.is_empty());
    }

    #[test]
    fn test_default_set_cookie() {
        let cookie = CookieOptions::default().to_set_cookie("abc.def");
        assert_eq!(cookie, "csrf=abc.def; Path=/; Secure; SameSite=Strict");
    }

    #[test]
    fn test_set_cookie_with_all_attributes() {
        let options = CookieOptions {
            name: "_csrf".to_string(),
            path: "/app".to_string(),
            domain: Some("example.com".to_string()),
            secure: false,
            http_only: true,
            same_site: SameSite::None,
        };
        assert_eq!(
            options.to_set_cookie("v"),
            "_csrf=v; Path=/app; Domain=example.com; HttpOnly; SameSite=None"
        );
    }

    #[test]
    fn test_same_site_enum() {
        assert_eq!(SameSite::Strict.as_str(), "Strict");
        assert_eq!(SameSite::Lax.as_str(), "Lax");
        assert_eq!(SameSite::None.as_str(), "None");
    }

    #[test]
    fn test_from_config_missing_secret() {
        let manager = ConfigManager::new();
        assert!(matches!(
            CsrfConfig::from_config(&manager),
            Err(CsrfError::MissingSecret)
        ));
    }

    #[test]
    fn test_from_config_empty_secret() {
        let manager = ConfigManager::new();
        manager.set(SECRET_KEY, "").unwrap();
        assert!(matches!(
            CsrfConfig::from_config(&manager),
            Err(CsrfError::MissingSecret)
        ));
    }

    #[test]
    fn test_from_config_reads_overrides() {
        let manager = ConfigManager::new();
        manager.set(SECRET_KEY, "e2e-secret").unwrap();
        manager.set("csrf_cookie_name", "xsrf").unwrap();
        manager.set("csrf_header_name", "x-xsrf-token").unwrap();
        manager.set("csrf_cookie_secure", "false").unwrap();

        let config = CsrfConfig::from_config(&manager).unwrap();
        assert_eq!(config.cookie.name, "xsrf");
        assert_eq!(config.header_name, "x-xsrf-token");
        assert!(!config.cookie.secure);
    }

    #[test]
    fn test_from_config_bad_bool() {
        let manager = ConfigManager::new();
        manager.set(SECRET_KEY, "e2e-secret").unwrap();
        manager.set("csrf_cookie_secure", "sometimes").unwrap();

        assert!(matches!(
            CsrfConfig::from_config(&manager),
            Err(CsrfError::Config(_))
        ));
    }
}
