use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Region, StalledStreamProtectionConfig};

use crate::config::ClientSettings;
use crate::credentials::CredentialSource;

async fn load_config(settings: &ClientSettings, endpoint_url: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()));
    if let CredentialSource::Static(triple) = &settings.credentials {
        loader = loader.credentials_provider(triple.clone().into_credentials());
    }
    if let Some(endpoint_url) = endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader
        .load()
        .await
        .into_builder()
        .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
        .build()
}

pub async fn client_for(settings: &ClientSettings) -> aws_sdk_s3::Client {
    let config = load_config(settings, settings.endpoint_url.as_deref()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .force_path_style(settings.force_path_style)
        .build();

    tracing::debug!(
        region = %settings.region,
        endpoint = ?settings.endpoint_url,
        path_style = settings.force_path_style,
        "built s3 client"
    );
    aws_sdk_s3::Client::from_conf(s3_config)
}

/// STS always goes to AWS; the endpoint override only applies to S3.
pub async fn sts_client_for(settings: &ClientSettings) -> aws_sdk_sts::Client {
    let config = load_config(settings, None).await;
    tracing::debug!(region = %settings.region, "built sts client");
    aws_sdk_sts::Client::new(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialTriple;

    fn settings() -> ClientSettings {
        ClientSettings {
            region: "eu-west-2".to_string(),
            credentials: CredentialSource::Static(
                CredentialTriple::new("AKIDEXAMPLE", "secret", None).unwrap(),
            ),
            endpoint_url: Some("http://localhost:9000".to_string()),
            force_path_style: true,
        }
    }

    #[tokio::test]
    async fn client_uses_configured_region() {
        let client = client_for(&settings()).await;
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("eu-west-2")
        );
    }

    #[tokio::test]
    async fn sts_client_uses_configured_region() {
        let client = sts_client_for(&settings()).await;
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("eu-west-2")
        );
    }
}
