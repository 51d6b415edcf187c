use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};

use crate::config::PutRequest;
use crate::error::ObjectError;
use crate::upload::{check_part_size, upload_multipart, DEFAULT_PART_SIZE};

pub const DEFAULT_MULTIPART_THRESHOLD: usize = 64 << 20;

/// The parts of a write response worth reporting.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PutOutcome {
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
    pub bytes: usize,
    pub multipart: bool,
}

/// Writes one object; a call yields exactly one success or one failure.
#[async_trait]
pub trait ObjectWriter: Send + Sync {
    async fn put_object(&self, request: &PutRequest) -> Result<PutOutcome, ObjectError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadPlan {
    Single,
    Multipart,
}

impl UploadPlan {
    pub fn for_len(len: usize, multipart_threshold: usize) -> Self {
        if len < multipart_threshold {
            Self::Single
        } else {
            Self::Multipart
        }
    }
}

pub struct S3Writer {
    client: Arc<Client>,
    multipart_threshold: usize,
    part_size: usize,
}

impl S3Writer {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    pub fn with_multipart(
        mut self,
        multipart_threshold: usize,
        part_size: usize,
    ) -> Result<Self, ObjectError> {
        check_part_size(part_size)?;
        self.multipart_threshold = multipart_threshold;
        self.part_size = part_size;

        Ok(self)
    }

    async fn put_single(&self, request: &PutRequest) -> Result<PutOutcome, ObjectError> {
        let output = self
            .client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .set_content_type(request.content_type.clone())
            .body(request.body.clone().into())
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(PutOutcome {
            e_tag: output.e_tag,
            version_id: output.version_id,
            bytes: request.body.len(),
            multipart: false,
        })
    }
}

#[async_trait]
impl ObjectWriter for S3Writer {
    async fn put_object(&self, request: &PutRequest) -> Result<PutOutcome, ObjectError> {
        request.validate()?;
        match UploadPlan::for_len(request.body.len(), self.multipart_threshold) {
            UploadPlan::Single => self.put_single(request).await,
            UploadPlan::Multipart => {
                upload_multipart(self.client.clone(), request, self.part_size).await
            }
        }
    }
}

/// Reports what would be written without calling the service.
#[derive(Clone, Debug)]
pub struct DryRunWriter {
    multipart_threshold: usize,
}

impl DryRunWriter {
    /// Rejects the same part sizes a real [`S3Writer`] would.
    pub fn new(multipart_threshold: usize, part_size: usize) -> Result<Self, ObjectError> {
        check_part_size(part_size)?;
        Ok(Self {
            multipart_threshold,
        })
    }
}

#[async_trait]
impl ObjectWriter for DryRunWriter {
    async fn put_object(&self, request: &PutRequest) -> Result<PutOutcome, ObjectError> {
        request.validate()?;
        let plan = UploadPlan::for_len(request.body.len(), self.multipart_threshold);
        tracing::info!(
            "DRY RUN: would write {} bytes to s3://{}/{} ({:?})",
            request.body.len(),
            request.bucket,
            request.key,
            plan
        );

        Ok(PutOutcome {
            e_tag: None,
            version_id: None,
            bytes: request.body.len(),
            multipart: plan == UploadPlan::Multipart,
        })
    }
}
