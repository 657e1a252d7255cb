//! Fuzz target for the double-submit access check.

#![no_main]

use arbitrary::Arbitrary;
use bulwark_csrf::{AccessDecision, CsrfConfig, CsrfProtection, DenyReason, Secret};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cookie: Option<String>,
    header: Option<String>,
    /// Use a genuine token for both values, with a suffix appended to the header
    genuine: bool,
    suffix: String,
}

fn protection() -> &'static CsrfProtection {
    static CSRF: OnceLock<CsrfProtection> = OnceLock::new();
    CSRF.get_or_init(|| {
        CsrfProtection::new(CsrfConfig::new(Secret::new("fuzz-secret").unwrap()))
    })
}

fuzz_target!(|input: FuzzInput| {
    let csrf = protection();
    let access = csrf.access();

    if input.genuine {
        let Ok(token) = csrf.codec().generate() else {
            return;
        };
        let header = format!("{}{}", token, input.suffix);
        let decision = access.check(Some(token.as_str()), Some(&header));

        if input.suffix.is_empty() {
            assert_eq!(decision, AccessDecision::Allow);
        } else {
            assert_eq!(decision, AccessDecision::Deny(DenyReason::Mismatch));
        }
        return;
    }

    let decision = access.check(input.cookie.as_deref(), input.header.as_deref());
    assert!(!decision.is_allowed());
});
