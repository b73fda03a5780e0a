//! Keyed SHA-256 hashes over processor fields.
//!
//! The processor authenticates messages with a hash built from an ordered
//! subset of fields followed by the shared key:
//!
//! 1. Concatenate the recipe's field values in order (absent fields are empty)
//! 2. Append the shared key
//! 3. URL-encode (form encoding) and lowercase the result
//! 4. SHA-256, rendered as lowercase hex

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::errors::NotificationError;
use super::trust::TrustContext;

/// Field recipe selecting which values are hashed and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignaturePurpose {
    /// `Hash` field of a browser Return message.
    ReturnHash,

    /// `Hash` parameter of an outbound authorization request.
    AuthRequest,
}

impl SignaturePurpose {
    /// Ordered field names hashed for this purpose.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            SignaturePurpose::ReturnHash => &[
                "ReturnCode",
                "PayResult",
                "FacTradeSeq",
                "PaymentType",
                "Amount",
                "Currency",
                "MyCardTradeNo",
                "MyCardType",
                "PromoCode",
            ],
            SignaturePurpose::AuthRequest => &[
                "FacServiceId",
                "FacTradeSeq",
                "TradeType",
                "CustomerId",
                "ProductName",
                "Amount",
                "Currency",
                "SandBoxMode",
            ],
        }
    }
}

/// Computes and checks processor hashes with the shared key.
#[derive(Clone)]
pub struct SignatureComputer {
    secret: Option<SecretString>,
}

impl SignatureComputer {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    pub fn from_context(context: &TrustContext) -> Self {
        Self::new(context.signing_secret().cloned())
    }

    /// Computes the hash for `purpose` over `fields`.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Configuration` if no shared key is configured.
    pub fn compute_signature(
        &self,
        fields: &BTreeMap<String, String>,
        purpose: SignaturePurpose,
    ) -> Result<String, NotificationError> {
        let secret = self
            .secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NotificationError::Configuration("missing signing secret".to_string()))?;

        let mut pre_hash: String = purpose
            .fields()
            .iter()
            .map(|name| fields.get(*name).map(String::as_str).unwrap_or_default())
            .collect();
        pre_hash.push_str(secret);

        let encoded = form_url_encode(&pre_hash).to_lowercase();
        Ok(hex::encode(Sha256::digest(encoded.as_bytes())))
    }

    /// Checks a supplied hash against the recomputed one.
    ///
    /// Hex case is ignored; the comparison is constant-time.
    pub fn verify(
        &self,
        fields: &BTreeMap<String, String>,
        purpose: SignaturePurpose,
        supplied: &str,
    ) -> Result<bool, NotificationError> {
        let expected = self.compute_signature(fields, purpose)?;
        Ok(constant_time_compare(
            expected.as_bytes(),
            supplied.trim().to_ascii_lowercase().as_bytes(),
        ))
    }
}

impl std::fmt::Debug for SignatureComputer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureComputer")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Form-style URL encoding: `A-Za-z0-9-_.` pass through, space becomes `+`.
fn form_url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "Key 1/2";

    fn computer() -> SignatureComputer {
        SignatureComputer::new(Some(SecretString::new(TEST_KEY.to_string())))
    }

    fn return_fields() -> BTreeMap<String, String> {
        [
            ("ReturnCode", "1"),
            ("PayResult", "3"),
            ("FacTradeSeq", "ABC123"),
            ("PaymentType", "INGAME"),
            ("Amount", "150"),
            ("Currency", "TWD"),
            ("MyCardTradeNo", "MC001"),
            ("MyCardType", "1"),
            ("PromoCode", ""),
            ("ReturnMsg", "Success"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    // ══════════════════════════════════════════════════════════════
    // Encoding Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn encoding_keeps_unreserved_characters() {
        assert_eq!(form_url_encode("Abc-1_2.z"), "Abc-1_2.z");
    }

    #[test]
    fn encoding_turns_space_into_plus() {
        assert_eq!(form_url_encode("a b"), "a+b");
    }

    #[test]
    fn encoding_escapes_reserved_and_multibyte() {
        assert_eq!(form_url_encode("1/2~"), "1%2F2%7E");
        assert_eq!(form_url_encode("點"), "%E9%BB%9E");
    }

    // ══════════════════════════════════════════════════════════════
    // Digest Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn return_hash_matches_known_vector() {
        let digest = computer()
            .compute_signature(&return_fields(), SignaturePurpose::ReturnHash)
            .unwrap();

        assert_eq!(
            digest,
            "a9de5564360996014d94e95b49036771176c7b28cb4eb619ed2d4d7be88b7340"
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let fields = return_fields();
        let first = computer()
            .compute_signature(&fields, SignaturePurpose::ReturnHash)
            .unwrap();
        let second = computer()
            .compute_signature(&fields, SignaturePurpose::ReturnHash)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fields_outside_recipe_do_not_affect_digest() {
        let mut fields = return_fields();
        let before = computer()
            .compute_signature(&fields, SignaturePurpose::ReturnHash)
            .unwrap();
        fields.insert("ReturnMsg".to_string(), "changed".to_string());
        let after = computer()
            .compute_signature(&fields, SignaturePurpose::ReturnHash)
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn purposes_select_different_recipes() {
        let fields = return_fields();
        let return_hash = computer()
            .compute_signature(&fields, SignaturePurpose::ReturnHash)
            .unwrap();
        let auth_hash = computer()
            .compute_signature(&fields, SignaturePurpose::AuthRequest)
            .unwrap();
        assert_ne!(return_hash, auth_hash);
    }

    #[test]
    fn different_key_changes_digest() {
        let other = SignatureComputer::new(Some(SecretString::new("other".to_string())));
        let fields = return_fields();
        assert_ne!(
            computer()
                .compute_signature(&fields, SignaturePurpose::ReturnHash)
                .unwrap(),
            other
                .compute_signature(&fields, SignaturePurpose::ReturnHash)
                .unwrap()
        );
    }

    #[test]
    fn missing_secret_is_configuration_error() {
        let result = SignatureComputer::new(None)
            .compute_signature(&return_fields(), SignaturePurpose::ReturnHash);
        assert!(matches!(result, Err(NotificationError::Configuration(_))));
    }

    #[test]
    fn empty_secret_is_configuration_error() {
        let result = SignatureComputer::new(Some(SecretString::new(String::new())))
            .compute_signature(&return_fields(), SignaturePurpose::ReturnHash);
        assert!(matches!(result, Err(NotificationError::Configuration(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_accepts_uppercase_hex() {
        let fields = return_fields();
        let supplied = "A9DE5564360996014D94E95B49036771176C7B28CB4EB619ED2D4D7BE88B7340";
        assert!(computer()
            .verify(&fields, SignaturePurpose::ReturnHash, supplied)
            .unwrap());
    }

    #[test]
    fn verify_rejects_wrong_hash() {
        let fields = return_fields();
        assert!(!computer()
            .verify(&fields, SignaturePurpose::ReturnHash, &"a".repeat(64))
            .unwrap());
    }

    #[test]
    fn verify_rejects_empty_hash() {
        let fields = return_fields();
        assert!(!computer()
            .verify(&fields, SignaturePurpose::ReturnHash, "")
            .unwrap());
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }
}
