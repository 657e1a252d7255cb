//! Fuzz target for wire token splitting and verification.
//!
//! Arbitrary strings must never panic and never verify.

#![no_main]

use bulwark_csrf::{CsrfConfig, CsrfProtection, Secret, split};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn protection() -> &'static CsrfProtection {
    static CSRF: OnceLock<CsrfProtection> = OnceLock::new();
    CSRF.get_or_init(|| {
        CsrfProtection::new(CsrfConfig::new(Secret::new("fuzz-secret").unwrap()))
    })
}

fuzz_target!(|data: &str| {
    let csrf = protection();

    if let Ok((token, signature)) = split(data) {
        assert!(!token.is_empty());
        assert!(!signature.is_empty());
        assert!(!signature.contains('.'));
    }

    // Forging an HMAC by chance is not something a fuzzer finds
    assert!(!csrf.verifier().verify(data));
});
