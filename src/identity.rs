//! Service account identity verification
//!
//! A pod that runs without an explicit service account gets the namespace's
//! ambient `default` account, which rarely carries the permissions the
//! operator intended. When credentials come from in-cluster discovery, the
//! mounted token is decoded and its subject checked before any client is
//! built; a `default` identity halts startup. Operator-supplied kubeconfig
//! files never go through this check.
//!
//! The check is a heuristic: any account name other than `default` is
//! accepted as-is, with no authorization lookup behind it.

use std::path::Path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

use crate::{Error, Result};

/// Subject segment that marks a service account token
const SUBJECT_KIND: &str = "serviceaccount";

/// The ambient account name that is rejected
const DEFAULT_ACCOUNT: &str = "default";

/// Claims of interest in a service account token
#[derive(Debug, Deserialize)]
struct ServiceAccountClaims {
    /// e.g. "system:serviceaccount:dev:builder"
    #[serde(default)]
    sub: String,
}

/// Verify the service account token mounted at `token_file`
///
/// Reads the token and rejects it if its subject is the ambient `default`
/// account, or if the token is not a well-formed service account JWT.
pub fn verify_service_account(token_file: &Path) -> Result<()> {
    let token = std::fs::read_to_string(token_file).map_err(|e| {
        Error::identity(format!(
            "failed to read service account token {}: {e}",
            token_file.display()
        ))
    })?;
    verify_token(&token)
}

/// Verify a raw service account token
pub fn verify_token(token: &str) -> Result<()> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() < 3 {
        return Err(Error::identity("invalid JWT token format"));
    }

    // The payload is the second part, base64url without padding
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| Error::identity(format!("failed to decode JWT payload: {e}")))?;

    let claims: ServiceAccountClaims = serde_json::from_slice(&payload)
        .map_err(|e| Error::identity(format!("failed to parse JWT claims: {e}")))?;

    // Subject format: system:serviceaccount:<namespace>:<name>
    let segments: Vec<&str> = claims.sub.split(':').collect();
    if segments.len() != 4 || segments[1] != SUBJECT_KIND {
        return Err(Error::identity(format!(
            "unexpected JWT subject format {:?}",
            claims.sub
        )));
    }

    if segments[3] == DEFAULT_ACCOUNT {
        return Err(Error::DefaultServiceAccount {
            subject: claims.sub,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Unsigned token with the given subject; the signature part is never
    /// decoded, so a placeholder is enough
    fn token_for(sub: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_named_service_account_is_accepted() {
        verify_token(&token_for("system:serviceaccount:dev:builder")).unwrap();
        verify_token(&token_for("system:serviceaccount:kube-system:metrics-reader")).unwrap();
    }

    #[test]
    fn test_default_service_account_is_rejected() {
        let err = verify_token(&token_for("system:serviceaccount:kube-system:default"))
            .unwrap_err();
        match &err {
            Error::DefaultServiceAccount { subject } => {
                assert_eq!(subject, "system:serviceaccount:kube-system:default");
            }
            other => panic!("expected DefaultServiceAccount, got {other:?}"),
        }
        assert!(err.is_fatal());
    }

    #[test]
    fn test_default_rejected_in_any_namespace() {
        assert!(verify_token(&token_for("system:serviceaccount:dev:default")).is_err());
        assert!(verify_token(&token_for("system:serviceaccount:prod:default")).is_err());
    }

    #[test]
    fn test_two_part_token_is_malformed() {
        let err = verify_token("header.payload").unwrap_err();
        assert!(err.to_string().contains("invalid JWT token format"));
    }

    #[test]
    fn test_payload_must_be_base64url() {
        let err = verify_token("header.!!!not-base64!!!.signature").unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn test_payload_must_be_json() {
        let payload = URL_SAFE_NO_PAD.encode("plain text, not json");
        let err = verify_token(&format!("header.{payload}.signature")).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_subject_needs_exactly_four_segments() {
        // Too few
        assert!(verify_token(&token_for("system:serviceaccount:builder")).is_err());
        // Too many
        assert!(verify_token(&token_for("system:serviceaccount:dev:builder:extra")).is_err());
        // Missing sub entirely decodes to an empty subject
        let payload = URL_SAFE_NO_PAD.encode("{}");
        assert!(verify_token(&format!("header.{payload}.signature")).is_err());
    }

    #[test]
    fn test_subject_must_be_a_service_account() {
        let err = verify_token(&token_for("system:user:dev:alice")).unwrap_err();
        assert!(err.to_string().contains("subject format"));
    }

    #[test]
    fn test_token_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(token_for("system:serviceaccount:dev:builder").as_bytes())
            .unwrap();
        verify_service_account(file.path()).unwrap();
    }

    #[test]
    fn test_unreadable_token_file() {
        let err = verify_service_account(Path::new("/nonexistent/token")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
        assert!(err.is_fatal());
    }
}
