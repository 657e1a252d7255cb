use crate::token::{TokenCodec, split};
use subtle::ConstantTimeEq;

/// Checks that a wire token carries a valid signature for its own raw value
#[derive(Clone, Debug)]
pub struct Verifier {
    codec: TokenCodec,
}

impl Verifier {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// `true` only for a well-formed token whose signature matches.
    ///
    /// Never panics; malformed or forged input is just `false`.
    pub fn verify(&self, wire: &str) -> bool {
        let Ok((token, signature)) = split(wire) else {
            return false;
        };

        let expected = self.codec.sign(token);
        constant_time_eq(expected.as_bytes(), signature.as_bytes())
    }
}

/// Compare two byte strings in time independent of where they differ.
///
/// Lengths are compared first; signatures are fixed-length hex so a length
/// mismatch reveals nothing an attacker does not already know.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;
    use std::sync::Arc;

    fn setup() -> (TokenCodec, Verifier) {
        let codec = TokenCodec::new(Arc::new(Secret::new("test-secret").unwrap()));
        let verifier = Verifier::new(codec.clone());
        (codec, verifier)
    }

    /// Replace the character at `index` with a different hex digit
    fn mutate_at(s: &str, index: usize) -> String {
        s.char_indices()
            .map(|(i, c)| {
                if i == index {
                    if c == '0' { '1' } else { '0' }
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn test_generated_tokens_verify() {
        let (codec, verifier) = setup();
        for _ in 0..100 {
            let token = codec.generate().unwrap();
            assert!(verifier.verify(token.as_str()));
        }
    }

    #[test]
    fn test_every_token_character_matters() {
        let (codec, verifier) = setup();
        let wire = codec.generate().unwrap().into_string();
        let (raw, signature) = split(&wire).unwrap();

        for index in 0..raw.len() {
            let tampered = format!("{}.{}", mutate_at(raw, index), signature);
            assert!(!verifier.verify(&tampered), "token index {}", index);
        }
    }

    #[test]
    fn test_every_signature_character_matters() {
        let (codec, verifier) = setup();
        let wire = codec.generate().unwrap().into_string();
        let (raw, signature) = split(&wire).unwrap();

        for index in 0..signature.len() {
            let tampered = format!("{}.{}", raw, mutate_at(signature, index));
            assert!(!verifier.verify(&tampered), "signature index {}", index);
        }
    }

    #[test]
    fn test_prefix_tamper_rejected() {
        let (codec, verifier) = setup();
        let wire = codec.generate().unwrap().into_string();
        let (raw, signature) = split(&wire).unwrap();

        let tampered = format!("deadbeef{}.{}", &raw[8..], signature);
        assert!(!verifier.verify(&tampered));
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let (codec, verifier) = setup();
        let wire = codec.generate().unwrap().into_string();
        let (raw, signature) = split(&wire).unwrap();

        let shouted = format!("{}.{}", raw, signature.to_uppercase());
        if shouted != wire {
            assert!(!verifier.verify(&shouted));
        }
    }

    #[test]
    fn test_malformed_rejected() {
        let (_, verifier) = setup();
        assert!(!verifier.verify(""));
        assert!(!verifier.verify("abc"));
        assert!(!verifier.verify("a.b.c"));
        assert!(!verifier.verify("."));
        assert!(!verifier.verify("token."));
        assert!(!verifier.verify(".signature"));
        assert!(!verifier.verify("token.signature"));
    }

    #[test]
    fn test_truncated_and_extended_signature_rejected() {
        let (codec, verifier) = setup();
        let wire = codec.generate().unwrap().into_string();

        assert!(!verifier.verify(&wire[..wire.len() - 1]));
        assert!(!verifier.verify(&format!("{}0", wire)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let (codec, _) = setup();
        let other = Verifier::new(TokenCodec::new(Arc::new(
            Secret::new("another-secret").unwrap(),
        )));

        let token = codec.generate().unwrap();
        assert!(!other.verify(token.as_str()));
    }

    #[test]
    fn test_arbitrary_token_with_correct_signature_verifies() {
        // Any raw text is accepted as long as its signature matches
        let (codec, verifier) = setup();
        let signature = codec.sign("not-hex-at-all");
        assert!(verifier.verify(&format!("not-hex-at-all.{}", signature)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }
}
