use std::error::Error;

use crate::config::PutRequest;
use crate::error::ObjectError;
use crate::put::PutOutcome;

/// The error followed by each of its sources, outermost first.
pub fn error_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

pub fn log_outcome(request: &PutRequest, result: &Result<PutOutcome, ObjectError>) {
    match result {
        Ok(outcome) => tracing::info!(
            bucket = %request.bucket,
            key = %request.key,
            e_tag = ?outcome.e_tag,
            version_id = ?outcome.version_id,
            bytes = outcome.bytes,
            multipart = outcome.multipart,
            "object written"
        ),
        Err(e) => {
            tracing::error!(
                bucket = %request.bucket,
                key = %request.key,
                "object write failed: {e}"
            );
            for (depth, cause) in error_chain(e).iter().enumerate().skip(1) {
                tracing::error!("  {depth}: {cause}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct Outer(#[source] Middle);

    #[derive(Debug, Error)]
    #[error("dispatch failure")]
    struct Middle(#[source] std::io::Error);

    #[test]
    fn chain_lists_every_source_in_order() {
        let error = Outer(Middle(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));
        assert_eq!(
            error_chain(&error),
            vec!["request failed", "dispatch failure", "connection refused"]
        );
    }

    #[test]
    fn flattened_errors_are_a_single_entry() {
        let error = ObjectError::Aws("AccessDenied".to_string());
        assert_eq!(error_chain(&error), vec!["An AWS error occurred AccessDenied"]);
    }

    #[test]
    fn logging_either_branch_does_not_panic() {
        let request = PutRequest::default();
        log_outcome(&request, &Ok(PutOutcome::default()));
        log_outcome(&request, &Err(ObjectError::Io("broken pipe".to_string())));
    }
}
