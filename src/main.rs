//! s3-put - write one object to S3 and report the response.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_put::client::{client_for, sts_client_for};
use s3_put::config::{BodySource, DEFAULT_BODY, DEFAULT_BUCKET, DEFAULT_KEY, DEFAULT_REGION};
use s3_put::download::fetch_object;
use s3_put::policy::SessionPolicy;
use s3_put::put::DEFAULT_MULTIPART_THRESHOLD;
use s3_put::report::log_outcome;
use s3_put::sts::{assume_role, AssumeRoleRequest, MIN_SESSION_DURATION};
use s3_put::upload::DEFAULT_PART_SIZE;
use s3_put::{
    ClientSettings, CredentialSource, CredentialTriple, DryRunWriter, ObjectWriter, PutRequest,
    S3Writer,
};

#[derive(Parser, Debug)]
#[command(name = "s3-put")]
#[command(about = "Write a single object to S3 and report the result", long_about = None)]
struct Args {
    /// Region to send requests to
    #[arg(long, global = true, default_value = DEFAULT_REGION, env = "AWS_REGION")]
    region: String,

    /// Endpoint override, e.g. a local S3-compatible server
    #[arg(long, global = true, env = "S3_PUT_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Use path-style addressing (bucket in the path, not the host)
    #[arg(long, global = true, env = "S3_PUT_PATH_STYLE")]
    path_style: bool,

    /// Access key id; the default credential chain is used when absent
    #[arg(long, global = true, env = "AWS_ACCESS_KEY_ID")]
    access_key_id: Option<String>,

    #[arg(long, global = true, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    #[arg(long, global = true, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "S3_PUT_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct PutArgs {
    #[arg(long, default_value = DEFAULT_BUCKET)]
    bucket: String,

    #[arg(long, default_value = DEFAULT_KEY)]
    key: String,

    /// Literal object body
    #[arg(long, default_value = DEFAULT_BODY, conflicts_with = "file")]
    body: String,

    /// Read the object body from a file instead
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long)]
    content_type: Option<String>,

    /// Bodies of at least this many bytes are sent as multipart uploads
    #[arg(long, default_value_t = DEFAULT_MULTIPART_THRESHOLD)]
    multipart_threshold: usize,

    #[arg(long, default_value_t = DEFAULT_PART_SIZE)]
    part_size: usize,

    /// Log what would be written without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an object
    Put(PutArgs),
    /// Read an object back
    Get {
        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,

        #[arg(long, default_value = DEFAULT_KEY)]
        key: String,

        /// Write the object here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a session policy that only allows writing one object
    Policy {
        #[arg(long)]
        principal: String,

        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,

        #[arg(long)]
        owner_id: u64,

        #[arg(long, default_value = DEFAULT_KEY)]
        key: String,
    },
    /// Assume a role restricted to one owner's object, then write it as `{owner-id}/{key}`
    Assume {
        #[arg(long)]
        role_arn: String,

        #[arg(long)]
        principal: String,

        #[arg(long)]
        owner_id: u64,

        /// Defaults to `s3-put-{owner-id}`
        #[arg(long)]
        session_name: Option<String>,

        #[arg(long, default_value_t = MIN_SESSION_DURATION.as_secs())]
        duration_seconds: u64,

        #[command(flatten)]
        put: PutArgs,
    },
}

impl Args {
    fn client_settings(&self) -> anyhow::Result<ClientSettings> {
        let credentials = match &self.access_key_id {
            Some(access_key_id) => {
                let secret = self
                    .secret_access_key
                    .clone()
                    .context("--secret-access-key is required with --access-key-id")?;
                CredentialSource::Static(CredentialTriple::new(
                    access_key_id.clone(),
                    secret,
                    self.session_token.clone(),
                )?)
            }
            None => CredentialSource::DefaultChain,
        };

        Ok(ClientSettings {
            region: self.region.clone(),
            credentials,
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.path_style,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("s3_put={}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &args.command {
        Command::Put(put) => {
            let settings = args.client_settings()?;
            run_put(&settings, put, put.key.clone()).await
        }
        Command::Get { bucket, key, out } => {
            let settings = args.client_settings()?;
            let client = client_for(&settings).await;
            let Some(data) = fetch_object(&client, bucket, key).await? else {
                tracing::error!("s3://{bucket}/{key} does not exist");
                return Ok(ExitCode::FAILURE);
            };
            match out {
                Some(path) => tokio::fs::write(path, &data)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&data).await?;
                    stdout.flush().await?;
                }
            }
            info!("read {} bytes from s3://{}/{}", data.len(), bucket, key);
            Ok(ExitCode::SUCCESS)
        }
        Command::Policy {
            principal,
            bucket,
            owner_id,
            key,
        } => {
            let policy = SessionPolicy::put_only(principal, bucket, *owner_id, key)?;
            println!("{}", policy.to_json()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Assume {
            role_arn,
            principal,
            owner_id,
            session_name,
            duration_seconds,
            put,
        } => {
            let settings = args.client_settings()?;
            let request = AssumeRoleRequest {
                role_arn: role_arn.clone(),
                principal_arn: principal.clone(),
                session_name: session_name
                    .clone()
                    .unwrap_or_else(|| format!("s3-put-{owner_id}")),
                bucket: put.bucket.clone(),
                owner_id: *owner_id,
                key: put.key.clone(),
                duration: Duration::from_secs(*duration_seconds),
            };
            let sts = sts_client_for(&settings).await;
            let triple = assume_role(&sts, &request).await?;

            let settings = ClientSettings {
                credentials: CredentialSource::Static(triple),
                ..settings
            };
            run_put(&settings, put, request.object_key()).await
        }
    }
}

async fn run_put(
    settings: &ClientSettings,
    put: &PutArgs,
    key: String,
) -> anyhow::Result<ExitCode> {
    let body = match &put.file {
        Some(path) => BodySource::File(path.clone()),
        None => BodySource::Literal(put.body.clone()),
    }
    .load()
    .await?;
    let mut request = PutRequest::new(put.bucket.clone(), key, body)?;
    if let Some(content_type) = &put.content_type {
        request = request.with_content_type(content_type.clone());
    }

    let writer: Box<dyn ObjectWriter> = if put.dry_run {
        Box::new(DryRunWriter::new(put.multipart_threshold, put.part_size)?)
    } else {
        let client = Arc::new(client_for(settings).await);
        Box::new(S3Writer::new(client).with_multipart(put.multipart_threshold, put.part_size)?)
    };

    info!(
        "writing {} bytes to s3://{}/{}",
        request.body.len(),
        request.bucket,
        request.key
    );
    let result = writer.put_object(&request).await;
    log_outcome(&request, &result);
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
