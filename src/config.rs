use std::path::PathBuf;

use bytes::Bytes;

use crate::credentials::CredentialSource;
use crate::error::ObjectError;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "example-bucket";
pub const DEFAULT_KEY: &str = "hello.txt";
pub const DEFAULT_BODY: &str = "The quick brown fox jumps over the lazy dog";

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub region: String,
    pub credentials: CredentialSource,
    /// Overrides the resolved endpoint, e.g. a local S3-compatible server.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// A single object write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutRequest {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub content_type: Option<String>,
}

impl PutRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Result<Self, ObjectError> {
        let request = Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            content_type: None,
        };
        request.validate()?;

        Ok(request)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Anything beyond non-empty names is checked by the service.
    pub fn validate(&self) -> Result<(), ObjectError> {
        if self.bucket.is_empty() {
            return Err(ObjectError::InvalidRequest("bucket is empty".to_string()));
        }
        if self.key.is_empty() {
            return Err(ObjectError::InvalidRequest("key is empty".to_string()));
        }

        Ok(())
    }
}

impl Default for PutRequest {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            key: DEFAULT_KEY.to_string(),
            body: Bytes::from_static(DEFAULT_BODY.as_bytes()),
            content_type: None,
        }
    }
}

/// Where an object body comes from.
#[derive(Clone, Debug)]
pub enum BodySource {
    Literal(String),
    File(PathBuf),
}

impl BodySource {
    pub async fn load(self) -> Result<Bytes, ObjectError> {
        match self {
            Self::Literal(body) => Ok(Bytes::from(body)),
            Self::File(path) => tokio::fs::read(&path).await.map(Bytes::from).map_err(|e| {
                ObjectError::Io(format!("failed to read {}: {e}", path.display()))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_request_is_the_hello_object() {
        let request = PutRequest::default();
        assert_eq!(request.bucket, "example-bucket");
        assert_eq!(request.key, "hello.txt");
        assert_eq!(&request.body[..], b"The quick brown fox jumps over the lazy dog");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(
            PutRequest::new("", "hello.txt", "body"),
            Err(ObjectError::InvalidRequest("bucket is empty".to_string()))
        );
        assert_eq!(
            PutRequest::new("example-bucket", "", "body"),
            Err(ObjectError::InvalidRequest("key is empty".to_string()))
        );
    }

    #[test]
    fn empty_body_is_allowed() {
        let request = PutRequest::new("example-bucket", "empty", Bytes::new()).unwrap();
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn body_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"from disk").unwrap();

        let body = BodySource::File(file.path().to_path_buf()).load().await.unwrap();
        assert_eq!(&body[..], b"from disk");
    }

    #[tokio::test]
    async fn missing_body_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(matches!(
            BodySource::File(missing).load().await,
            Err(ObjectError::Io(_))
        ));
    }
}
