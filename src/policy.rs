//! Inline session policies for handing out write-only temporary credentials.
//!
//! The document is meant to be passed as the `Policy` of an STS
//! `AssumeRole` call, so the resulting credential triple can only
//! `s3:PutObject` to a single `{bucket}/{owner_id}/{key}` location.

use serde::{Deserialize, Serialize};

use crate::error::ObjectError;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SessionPolicy {
    pub version: String,
    pub statement: Statement,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub principal: Principal,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    #[serde(rename = "AWS")]
    pub aws: String,
}

pub fn object_arn(bucket: &str, owner_id: u64, key: &str) -> String {
    format!("arn:aws:s3:::{bucket}/{owner_id}/{key}")
}

impl SessionPolicy {
    pub fn put_only(
        principal_arn: &str,
        bucket: &str,
        owner_id: u64,
        key: &str,
    ) -> Result<Self, ObjectError> {
        if bucket.is_empty() {
            return Err(ObjectError::InvalidRequest("bucket is empty".to_string()));
        }
        if key.is_empty() {
            return Err(ObjectError::InvalidRequest("key is empty".to_string()));
        }
        if !principal_arn.starts_with("arn:") {
            return Err(ObjectError::InvalidRequest(format!(
                "principal {principal_arn:?} is not an ARN"
            )));
        }

        Ok(Self {
            version: POLICY_VERSION.to_string(),
            statement: Statement {
                effect: Effect::Allow,
                principal: Principal {
                    aws: principal_arn.to_string(),
                },
                action: vec!["s3:PutObject".to_string()],
                resource: vec![object_arn(bucket, owner_id, key)],
            },
        })
    }

    pub fn to_json(&self) -> Result<String, ObjectError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ObjectError::InvalidRequest(format!("unserializable policy: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const DAVE: &str = "arn:aws:iam::123456789012:user/Dave";

    #[test]
    fn put_only_policy_has_iam_shape() {
        let policy = SessionPolicy::put_only(DAVE, "example-bucket", 42, "hello.txt").unwrap();
        let value = serde_json::to_value(&policy).unwrap();

        assert_eq!(
            value,
            json!({
                "Version": "2012-10-17",
                "Statement": {
                    "Effect": "Allow",
                    "Principal": { "AWS": DAVE },
                    "Action": ["s3:PutObject"],
                    "Resource": ["arn:aws:s3:::example-bucket/42/hello.txt"],
                }
            })
        );
    }

    #[test]
    fn rendered_json_parses_back() {
        let policy = SessionPolicy::put_only(DAVE, "example-bucket", 7, "a/b.txt").unwrap();
        let parsed: SessionPolicy = serde_json::from_str(&policy.to_json().unwrap()).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn rejects_unscoped_requests() {
        assert!(SessionPolicy::put_only(DAVE, "", 1, "k").is_err());
        assert!(SessionPolicy::put_only(DAVE, "b", 1, "").is_err());
        assert!(SessionPolicy::put_only("Dave", "b", 1, "k").is_err());
    }
}
