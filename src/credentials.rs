use std::fmt;
use std::time::SystemTime;

use aws_sdk_s3::config::Credentials;

use crate::error::ObjectError;

const PROVIDER_NAME: &str = "s3-put-static";

/// Access key, secret key and optional session token for one set of requests.
#[derive(Clone)]
pub struct CredentialTriple {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expires_at: Option<SystemTime>,
}

impl CredentialTriple {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Result<Self, ObjectError> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        if access_key_id.trim().is_empty() {
            return Err(ObjectError::InvalidCredentials(
                "access key id is empty".to_string(),
            ));
        }
        if secret_access_key.is_empty() {
            return Err(ObjectError::InvalidCredentials(
                "secret access key is empty".to_string(),
            ));
        }
        // an empty token from the environment means "no token"
        let session_token = session_token.filter(|t| !t.is_empty());

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
            expires_at: None,
        })
    }

    /// Marks the triple as temporary, e.g. when it comes from STS.
    pub fn with_expiry(mut self, expires_at: SystemTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn has_session_token(&self) -> bool {
        self.session_token.is_some()
    }

    pub fn into_credentials(self) -> Credentials {
        Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
            self.expires_at,
            PROVIDER_NAME,
        )
    }
}

impl fmt::Debug for CredentialTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialTriple")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Where the client gets its credentials from.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    Static(CredentialTriple),
    /// Environment, shared profile, then instance metadata.
    DefaultChain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_keys() {
        assert!(matches!(
            CredentialTriple::new("", "secret", None),
            Err(ObjectError::InvalidCredentials(_))
        ));
        assert!(matches!(
            CredentialTriple::new("AKIDEXAMPLE", "", None),
            Err(ObjectError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn empty_session_token_is_dropped() {
        let triple = CredentialTriple::new("AKIDEXAMPLE", "secret", Some(String::new())).unwrap();
        assert!(!triple.has_session_token());
    }

    #[test]
    fn debug_never_shows_secrets() {
        let triple = CredentialTriple::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI",
            Some("FwoGZXIvYXdzEBY".to_string()),
        )
        .unwrap();
        let printed = format!("{triple:?}");
        assert!(printed.contains("AKIDEXAMPLE"));
        assert!(!printed.contains("wJalrXUtnFEMI"));
        assert!(!printed.contains("FwoGZXIvYXdzEBY"));
    }

    #[test]
    fn converts_into_static_provider() {
        let triple = CredentialTriple::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI",
            Some("FwoGZXIvYXdzEBY".to_string()),
        )
        .unwrap();
        let creds = triple.into_credentials();
        assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
        assert_eq!(creds.secret_access_key(), "wJalrXUtnFEMI");
        assert_eq!(creds.session_token(), Some("FwoGZXIvYXdzEBY"));
        assert_eq!(creds.expiry(), None);
    }

    #[test]
    fn expiry_is_carried_into_the_provider() {
        let expires_at = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let creds = CredentialTriple::new("ASIAEXAMPLE", "secret", Some("token".to_string()))
            .unwrap()
            .with_expiry(expires_at)
            .into_credentials();
        assert_eq!(creds.expiry(), Some(expires_at));
    }
}
