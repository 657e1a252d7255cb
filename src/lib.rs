// Bulwark - stateless CSRF protection for async HTTP services
//
// Double-submit cookie tokens signed with HMAC-SHA256, a middleware that
// hands them out and a guard that checks them on state-changing routes.

// Re-export core functionality
pub use bulwark_core::*;

pub use bulwark_config;
pub use bulwark_csrf;

#[cfg(feature = "testing")]
pub use bulwark_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Application, Error, Guard, GuardContext, HttpMethod, HttpRequest, HttpResponse,
        HttpStatus, LoggerMiddleware, Middleware, Next, Route, Router, handler,
    };

    pub use bulwark_config::ConfigManager;

    pub use bulwark_csrf::{
        AccessDecision, CsrfConfig, CsrfCookieMiddleware, CsrfError, CsrfGuard, CsrfProtection,
        DenyReason, Secret, WireToken,
    };

    pub use bulwark_core::logging::{LogConfig, LogFormat, LogLevel};
}
