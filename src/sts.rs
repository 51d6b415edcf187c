//! Temporary write-only credentials via STS `AssumeRole`.

use std::time::{Duration, SystemTime};

use crate::credentials::CredentialTriple;
use crate::error::ObjectError;
use crate::policy::SessionPolicy;

/// Bounds the service accepts for `DurationSeconds`.
pub const MIN_SESSION_DURATION: Duration = Duration::from_secs(900);
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(43_200);

#[derive(Clone, Debug)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub principal_arn: String,
    pub session_name: String,
    pub bucket: String,
    pub owner_id: u64,
    pub key: String,
    pub duration: Duration,
}

impl AssumeRoleRequest {
    /// The external id the role's trust policy expects for this owner.
    pub fn external_id(&self) -> String {
        format!("_{}", self.owner_id)
    }

    /// The key the assumed credentials are allowed to write.
    pub fn object_key(&self) -> String {
        format!("{}/{}", self.owner_id, self.key)
    }

    fn duration_seconds(&self) -> Result<i32, ObjectError> {
        if self.duration < MIN_SESSION_DURATION || self.duration > MAX_SESSION_DURATION {
            return Err(ObjectError::InvalidRequest(format!(
                "session duration of {}s is outside {}..={}s",
                self.duration.as_secs(),
                MIN_SESSION_DURATION.as_secs(),
                MAX_SESSION_DURATION.as_secs()
            )));
        }
        Ok(self.duration.as_secs() as i32)
    }
}

pub async fn assume_role(
    client: &aws_sdk_sts::Client,
    request: &AssumeRoleRequest,
) -> Result<CredentialTriple, ObjectError> {
    let duration_seconds = request.duration_seconds()?;
    let policy = SessionPolicy::put_only(
        &request.principal_arn,
        &request.bucket,
        request.owner_id,
        &request.key,
    )?;

    let output = client
        .assume_role()
        .role_arn(&request.role_arn)
        .role_session_name(&request.session_name)
        .external_id(request.external_id())
        .duration_seconds(duration_seconds)
        .policy(policy.to_json()?)
        .send()
        .await
        .map_err(aws_sdk_sts::Error::from)?;

    let credentials = output.credentials.ok_or_else(|| {
        ObjectError::Aws(format!("no credentials returned for {}", request.role_arn))
    })?;
    let triple = CredentialTriple::new(
        credentials.access_key_id,
        credentials.secret_access_key,
        Some(credentials.session_token),
    )?;
    tracing::info!(
        role = %request.role_arn,
        access_key_id = triple.access_key_id(),
        expiration = %credentials.expiration,
        "assumed role"
    );

    Ok(match SystemTime::try_from(credentials.expiration) {
        Ok(expires_at) => triple.with_expiry(expires_at),
        Err(_) => triple,
    })
}
