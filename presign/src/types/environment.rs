//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_s3::config::RequestChecksumCalculation;
use tracing::Level;

const DEFAULT_AWS_REGION: &str = "us-east-1";
const DEFAULT_BUCKET: &str = "test-harvest7777";
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 60;
const LOCALSTACK_ENDPOINT_URL: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Reads the stage from `APP_ENV`, defaulting to development
    ///
    /// `PRESIGNED_URL_EXPIRY_SECS` is honoured in development only; an
    /// unparsable value is ignored.
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` names an unknown stage
    #[must_use]
    pub fn from_env() -> Self {
        let stage = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        match stage.trim().to_lowercase().as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                presign_expiry_override: env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|secs| secs.parse().ok()),
            },
            other => panic!("Invalid environment: {other}"),
        }
    }

    /// Returns the AWS region from `AWS_REGION`, defaulting to `us-east-1`
    #[must_use]
    pub fn aws_region(&self) -> String {
        env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string())
    }

    /// Returns the S3 bucket name from `BUCKET`, defaulting to `test-harvest7777`
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        env::var("BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<String> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some(
                env::var("AWS_ENDPOINT_URL")
                    .unwrap_or_else(|_| LOCALSTACK_ENDPOINT_URL.to_string()),
            ),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.aws_region()))
            .load()
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // A checksum computed at signing time would cover an empty body and
        // make every presigned PUT fail
        builder.set_request_checksum_calculation(Some(RequestChecksumCalculation::WhenRequired));

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}
