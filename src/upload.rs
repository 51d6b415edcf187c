use std::sync::Arc;

use aws_sdk_s3::{
    types::{CompletedMultipartUpload, CompletedPart},
    Client,
};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::config::PutRequest;
use crate::error::ObjectError;
use crate::put::PutOutcome;

/// The service rejects smaller parts, except for the last one.
pub const MIN_PART_SIZE: usize = 5 << 20;
pub const DEFAULT_PART_SIZE: usize = 8 << 20;

pub struct Upload {
    client: Arc<Client>,
    bucket: String,
    key: String,
    data: BytesMut,
    upload_id: String,
    size_per_upload: usize,
    parts: Vec<String>,
    uploaded_bytes: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadInfo {
    pub bucket: String,
    pub key: String,
    pub size_per_upload: usize,

    pub upload_id: String,
    pub parts: usize,
    pub uploaded_bytes: usize,
}

pub fn check_part_size(size_per_upload: usize) -> Result<(), ObjectError> {
    if size_per_upload < MIN_PART_SIZE {
        return Err(ObjectError::InvalidRequest(format!(
            "part size {size_per_upload} is below the minimum of {MIN_PART_SIZE} bytes"
        )));
    }
    Ok(())
}

/// Splits off every full part currently buffered, leaving the remainder in `data`.
fn take_full_parts(data: &mut BytesMut, size_per_upload: usize) -> Vec<Bytes> {
    let mut parts = Vec::with_capacity(data.len() / size_per_upload);
    while data.len() >= size_per_upload {
        parts.push(data.split_to(size_per_upload).freeze());
    }
    parts
}

impl Upload {
    pub async fn new_with_size(
        client: Arc<Client>,
        bucket: String,
        key: String,
        content_type: Option<String>,
        size_per_upload: usize,
    ) -> Result<Upload, ObjectError> {
        check_part_size(size_per_upload)?;
        let upload = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key(&key)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;
        let upload_id = upload.upload_id.ok_or_else(|| {
            ObjectError::Aws(format!("no upload id returned for {bucket}/{key}"))
        })?;
        tracing::debug!(%bucket, %key, %upload_id, "created multipart upload");

        Ok(Upload {
            client,
            bucket,
            key,
            data: BytesMut::new(),
            upload_id,
            parts: Vec::new(),
            size_per_upload,
            uploaded_bytes: 0,
        })
    }

    pub fn info(&self) -> UploadInfo {
        UploadInfo {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            size_per_upload: self.size_per_upload,
            upload_id: self.upload_id.clone(),
            parts: self.parts.len(),
            uploaded_bytes: self.uploaded_bytes,
        }
    }

    async fn send_part(&mut self, to_send: Bytes) -> Result<(), ObjectError> {
        let part_num = (self.parts.len() + 1) as i32;
        let len = to_send.len();
        tracing::info!("uploading {} bytes to {} (part {})", len, self.key, part_num);
        let part_upload = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(&self.upload_id)
            .part_number(part_num)
            .body(to_send.into())
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let e_tag = part_upload.e_tag.ok_or_else(|| {
            ObjectError::Aws(format!("no e-tag returned for part {part_num} of {}", self.key))
        })?;
        self.parts.push(e_tag);
        self.uploaded_bytes += len;

        Ok(())
    }

    pub async fn send(&mut self, data: Bytes) -> Result<(), ObjectError> {
        self.data.extend_from_slice(&data);
        for part in take_full_parts(&mut self.data, self.size_per_upload) {
            self.send_part(part).await?;
        }

        Ok(())
    }

    async fn send_final(&mut self) -> Result<(), ObjectError> {
        // an empty object still needs one (empty) part to complete
        if self.data.is_empty() && !self.parts.is_empty() {
            return Ok(());
        }
        let rest = self.data.split().freeze();
        self.send_part(rest).await
    }

    pub async fn complete(&mut self) -> Result<PutOutcome, ObjectError> {
        self.send_final().await?;

        let parts: Vec<_> = self
            .parts
            .iter()
            .enumerate()
            .map(|(ix, e_tag)| {
                CompletedPart::builder()
                    .part_number((ix + 1) as i32)
                    .e_tag(e_tag)
                    .build()
            })
            .collect();

        let completed = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(&self.upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(PutOutcome {
            e_tag: completed.e_tag,
            version_id: completed.version_id,
            bytes: self.uploaded_bytes,
            multipart: true,
        })
    }

    pub async fn abort(self) -> Result<(), ObjectError> {
        tracing::warn!(
            bucket = %self.bucket,
            key = %self.key,
            upload_id = %self.upload_id,
            "aborting multipart upload"
        );
        self.client
            .abort_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(self.upload_id)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(())
    }
}

/// Writes the whole request as a multipart upload, aborting it if any step fails.
pub async fn upload_multipart(
    client: Arc<Client>,
    request: &PutRequest,
    size_per_upload: usize,
) -> Result<PutOutcome, ObjectError> {
    let mut upload = Upload::new_with_size(
        client,
        request.bucket.clone(),
        request.key.clone(),
        request.content_type.clone(),
        size_per_upload,
    )
    .await?;

    let sent = match upload.send(request.body.clone()).await {
        Ok(()) => upload.complete().await,
        Err(e) => Err(e),
    };
    match sent {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            let info = upload.info();
            if let Err(abort_err) = upload.abort().await {
                tracing::error!(?info, "failed to abort multipart upload: {abort_err}");
            }
            Err(e)
        }
    }
}
