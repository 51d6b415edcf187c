//! Writes a single object to S3 (or an S3-compatible service) and reports
//! the response or the failure.

pub mod client;
pub mod config;
pub mod credentials;
pub mod download;
pub mod error;
pub mod policy;
pub mod put;
pub mod report;
pub mod sts;
pub mod upload;

pub use config::{ClientSettings, PutRequest};
pub use credentials::{CredentialSource, CredentialTriple};
pub use error::ObjectError;
pub use put::{DryRunWriter, ObjectWriter, PutOutcome, S3Writer};
