use aws_sdk_s3::error::DisplayErrorContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum ObjectError {
    #[error("An AWS error occurred {0}")]
    Aws(String),
    #[error("An IO error occurred {0}")]
    Io(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl From<aws_sdk_s3::Error> for ObjectError {
    fn from(value: aws_sdk_s3::Error) -> Self {
        Self::Aws(DisplayErrorContext(&value).to_string())
    }
}

impl From<aws_sdk_sts::Error> for ObjectError {
    fn from(value: aws_sdk_sts::Error) -> Self {
        Self::Aws(DisplayErrorContext(&value).to_string())
    }
}

impl From<std::io::Error> for ObjectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
