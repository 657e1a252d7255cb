//! Fuzz target for cookie lookup and the guard on arbitrary requests.

#![no_main]

use arbitrary::Arbitrary;
use bulwark_core::{Guard, GuardContext, HttpRequest};
use bulwark_csrf::{CsrfConfig, CsrfProtection, Secret};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    method: String,
    cookie_header: String,
    csrf_header: Option<String>,
}

fuzz_target!(|data: FuzzRequest| {
    let mut req = HttpRequest::new(data.method, "/protected")
        .with_header("Cookie", data.cookie_header);
    if let Some(value) = data.csrf_header {
        req = req.with_header("x-csrf-token", value);
    }

    // Lookups must never panic, whatever the header holds
    let _ = req.cookie("csrf");
    let _ = req.cookie("");

    let csrf = CsrfProtection::new(CsrfConfig::new(Secret::new("fuzz-secret").unwrap()));
    let guard = csrf.guard();
    let context = GuardContext::new(&req);

    let runtime = match tokio_runtime() {
        Some(rt) => rt,
        None => return,
    };
    if let Ok(allowed) = runtime.block_on(guard.can_activate(&context)) {
        // Only safe methods get through with untrusted input
        assert!(allowed);
        assert!(!guard.needs_protection(context.method()));
    }
});

fn tokio_runtime() -> Option<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().build().ok()
}
