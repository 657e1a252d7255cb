//! Demo service with one public and one CSRF-protected endpoint.
//!
//! ```text
//! CSRF_SECRET=change-me cargo run --bin csrf-demo
//! curl -i http://localhost:3000/public              # receives Set-Cookie: csrf=...
//! curl -i -X POST http://localhost:3000/protected \
//!      -H 'Cookie: csrf=<token>' -H 'x-csrf-token: <token>'
//! ```

use bulwark::prelude::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> ExitCode {
    // Held until main returns so buffered lines, the fatal one included, are flushed
    let _guard = LogConfig::new()
        .level(LogLevel::Info)
        .format(LogFormat::Compact)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "csrf-demo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = ConfigManager::new();
    config
        .load_dotenv(None)
        .map_err(|e| Error::Internal(e.to_string()))?;

    let router = build_router(&config)?;
    let port = config
        .get_string("port")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    info!(port, "Starting csrf-demo");
    Application::new(router).listen(port).await
}

/// Routes of the demo; fails when no CSRF secret is configured
fn build_router(config: &ConfigManager) -> Result<Router, Error> {
    let csrf = CsrfProtection::new(CsrfConfig::from_config(config)?);

    Ok(Router::new()
        .use_middleware(Arc::new(LoggerMiddleware))
        .use_middleware(Arc::new(csrf.middleware()))
        .get(
            "/public",
            handler(|_req| async {
                HttpResponse::ok().with_json(&serde_json::json!({ "ok": true }))
            }),
        )
        .route_with(
            Route::new(
                HttpMethod::POST,
                "/protected",
                handler(|_req| async {
                    HttpResponse::created().with_json(&serde_json::json!({ "success": true }))
                }),
            )
            .with_guard(Arc::new(csrf.guard())),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_fails_startup() {
        let config = ConfigManager::new();
        let err = build_router(&config).err().unwrap();

        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("CSRF secret is missing or empty"));
    }

    #[tokio::test]
    async fn test_configured_router_serves_routes() {
        let config = ConfigManager::new();
        config.set("csrf_secret", "demo-secret").unwrap();
        let router = build_router(&config).unwrap();

        let public = router.route(HttpRequest::new("GET", "/public")).await.unwrap();
        assert_eq!(public.status, 200);
        assert_eq!(public.cookies.len(), 1);

        let denied = router.route(HttpRequest::new("POST", "/protected")).await.unwrap();
        assert_eq!(denied.status, 403);
    }
}
