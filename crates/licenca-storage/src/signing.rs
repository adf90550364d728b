//! HMAC-signed object URLs for the local backend.
//!
//! A signed URL has the shape
//! `{base_url}/{key}?method={METHOD}&expires={unix_secs}&signature={hex}`
//! where the signature is HMAC-SHA256 over `"{METHOD}\n{key}\n{expires}"`.
//! The key is percent-encoded per segment in the URL but signed decoded.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::traits::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signed URL has expired")]
    Expired,
    #[error("Signed URL does not allow this method")]
    MethodMismatch,
    #[error("Invalid signature")]
    Invalid,
}

/// Query parameters carried by a signed URL
#[derive(Debug, Clone)]
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub expires: i64,
    pub signature: &'a str,
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> StorageResult<Self> {
        let secret = secret.as_ref().to_vec();
        if secret.is_empty() {
            return Err(StorageError::ConfigError(
                "Storage signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn signature(&self, method: &str, key: &str, expires: i64) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(method.as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build a URL granting `method` on `key` until `expires_at`.
    pub fn sign(&self, method: &str, key: &str, expires_at: DateTime<Utc>) -> StorageResult<String> {
        let method = method.to_ascii_uppercase();
        let expires = expires_at.timestamp();
        let signature = self.signature(&method, key, expires)?;
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/{}?method={}&expires={}&signature={}",
            self.base_url, encoded_key, method, expires, signature
        ))
    }

    /// Check a request against its signature. `actual_method` is the HTTP
    /// method the client used, which must match the signed one.
    pub fn verify(
        &self,
        actual_method: &str,
        key: &str,
        request: &SignedRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        if !request.method.eq_ignore_ascii_case(actual_method) {
            return Err(SignatureError::MethodMismatch);
        }
        let expected = self
            .signature(&request.method.to_ascii_uppercase(), key, request.expires)
            .map_err(|_| SignatureError::Invalid)?;
        let matches: bool = expected
            .as_bytes()
            .ct_eq(request.signature.to_ascii_lowercase().as_bytes())
            .into();
        if !matches {
            return Err(SignatureError::Invalid);
        }
        if now.timestamp() > request.expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn signer() -> UrlSigner {
        UrlSigner::new("0123456789abcdef0123456789abcdef", "http://localhost:3000/storage/")
            .unwrap()
    }

    fn query(url: &str) -> (String, i64, String) {
        let (_, q) = url.split_once('?').unwrap();
        let mut method = String::new();
        let mut expires = 0;
        let mut signature = String::new();
        for pair in q.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "method" => method = v.to_string(),
                "expires" => expires = v.parse().unwrap(),
                "signature" => signature = v.to_string(),
                _ => {}
            }
        }
        (method, expires, signature)
    }

    #[test]
    fn test_signed_url_shape() {
        let now = Utc::now();
        let url = signer().sign("put", "p1/contrato.pdf", now).unwrap();
        assert!(url.starts_with("http://localhost:3000/storage/p1/contrato.pdf?method=PUT&expires="));
    }

    #[test]
    fn test_verify_accepts_fresh_signature() {
        let s = signer();
        let now = Utc::now();
        let url = s.sign("PUT", "p1/a.pdf", now + Duration::hours(2)).unwrap();
        let (method, expires, signature) = query(&url);
        let req = SignedRequest { method: &method, expires, signature: &signature };
        assert_eq!(s.verify("PUT", "p1/a.pdf", &req, now), Ok(()));
    }

    #[test]
    fn test_verify_rejects_tampering_and_expiry() {
        let s = signer();
        let now = Utc::now();
        let url = s.sign("PUT", "p1/a.pdf", now + Duration::hours(2)).unwrap();
        let (method, expires, signature) = query(&url);
        let req = SignedRequest { method: &method, expires, signature: &signature };

        assert_eq!(s.verify("PUT", "p1/b.pdf", &req, now), Err(SignatureError::Invalid));
        assert_eq!(s.verify("GET", "p1/a.pdf", &req, now), Err(SignatureError::MethodMismatch));
        assert_eq!(
            s.verify("PUT", "p1/a.pdf", &req, now + Duration::hours(3)),
            Err(SignatureError::Expired)
        );

        let forged = SignedRequest { method: "PUT", expires: expires + 3600, signature: &signature };
        assert_eq!(s.verify("PUT", "p1/a.pdf", &forged, now), Err(SignatureError::Invalid));

        let other = UrlSigner::new("another-secret-another-secret-xx", "http://x").unwrap();
        assert_eq!(other.verify("PUT", "p1/a.pdf", &req, now), Err(SignatureError::Invalid));
    }

    #[test]
    fn test_key_segments_are_encoded() {
        let url = signer().sign("GET", "p1/a b.pdf", Utc::now()).unwrap();
        assert!(url.contains("/p1/a%20b.pdf?"));
    }
}
