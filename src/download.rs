use bytes::{Bytes, BytesMut};

use crate::error::ObjectError;

/// Reads a whole object back. A missing key is `Ok(None)`, not an error.
pub async fn fetch_object(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Bytes>, ObjectError> {
    let result = client.get_object().bucket(bucket).key(key).send().await;

    match result {
        Ok(o) => {
            let size = o.content_length.unwrap_or(0).max(0) as usize;
            let mut stream = o.body;
            let mut data = BytesMut::with_capacity(size);
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| ObjectError::Io(e.to_string()))?;
                data.extend_from_slice(&chunk);
            }
            tracing::debug!("read {} bytes from s3://{}/{}", data.len(), bucket, key);
            Ok(Some(data.freeze()))
        }
        Err(e) => missing_as_none(e.into()),
    }
}

fn missing_as_none(error: aws_sdk_s3::Error) -> Result<Option<Bytes>, ObjectError> {
    match error {
        aws_sdk_s3::Error::NoSuchKey(_) => Ok(None),
        _ => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::error::{NoSuchBucket, NoSuchKey};
    use aws_sdk_s3::Client;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};

    use super::*;

    #[tokio::test]
    async fn reads_the_whole_body() {
        let get = mock!(Client::get_object)
            .match_requests(|req| {
                req.bucket() == Some("example-bucket") && req.key() == Some("hello.txt")
            })
            .then_output(|| {
                GetObjectOutput::builder()
                    .content_length(43)
                    .body(ByteStream::from_static(
                        b"The quick brown fox jumps over the lazy dog",
                    ))
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&get]);

        let data = fetch_object(&client, "example-bucket", "hello.txt")
            .await
            .unwrap();
        assert_eq!(
            data.as_deref(),
            Some(&b"The quick brown fox jumps over the lazy dog"[..])
        );
    }

    #[tokio::test]
    async fn missing_object_reads_as_none() {
        let get = mock!(Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&get]);

        assert_eq!(
            fetch_object(&client, "example-bucket", "nope.txt").await,
            Ok(None)
        );
        assert_eq!(get.num_calls(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let error = aws_sdk_s3::Error::NoSuchKey(NoSuchKey::builder().build());
        assert_eq!(missing_as_none(error), Ok(None));
    }

    #[test]
    fn other_errors_propagate() {
        let error = aws_sdk_s3::Error::NoSuchBucket(
            NoSuchBucket::builder()
                .message("The specified bucket does not exist")
                .build(),
        );
        match missing_as_none(error) {
            Err(ObjectError::Aws(message)) => {
                assert!(message.contains("The specified bucket does not exist"))
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
