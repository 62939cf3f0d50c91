use std::{env, sync::Arc};

use aide::openapi::OpenApi;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::RequestChecksumCalculation, Client as S3Client};
use axum::{body::Body, http::Request, response::Response, Extension, Router};
use presign::{
    authorization::{Authorizer, OwnerAuthorizer},
    issuer::PresignedAccessIssuer,
    redeem::PresignedClient,
    routes,
    types::Environment,
};
use tower::ServiceExt;
use uuid::Uuid;

use super::FakeS3;

/// Setup test environment variables and tracing
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    // LocalStack accepts any credentials
    if env::var("AWS_ACCESS_KEY_ID").is_err() {
        env::set_var("AWS_ACCESS_KEY_ID", "test");
        env::set_var("AWS_SECRET_ACCESS_KEY", "test");
    }

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client with static credentials pointed at `endpoint_url`
pub fn static_s3_client(endpoint_url: &str) -> Arc<S3Client> {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::from_keys("test", "test", None))
        .endpoint_url(endpoint_url)
        .force_path_style(true)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .build();
    Arc::new(S3Client::from_conf(config))
}

/// Issuer, redeemer and router backed by an in-process fake S3
pub struct FakeContext {
    pub fake_s3: FakeS3,
    pub issuer: Arc<PresignedAccessIssuer>,
    pub client: PresignedClient,
    pub router: Router,
}

impl FakeContext {
    pub async fn new(expiry_secs: u64) -> Self {
        Self::with_authorizer(expiry_secs, Arc::new(OwnerAuthorizer)).await
    }

    pub async fn with_authorizer(expiry_secs: u64, authorizer: Arc<dyn Authorizer>) -> Self {
        setup_test_env();

        let fake_s3 = FakeS3::start("test-harvest7777").await;
        let issuer = Arc::new(PresignedAccessIssuer::new(
            static_s3_client(&fake_s3.endpoint_url),
            fake_s3.bucket.clone(),
            expiry_secs,
            authorizer,
        ));

        let mut openapi = OpenApi::default();
        let router = routes::handler()
            .finish_api(&mut openapi)
            .layer(Extension(openapi))
            .layer(Extension(Environment::Development {
                presign_expiry_override: Some(expiry_secs),
            }))
            .layer(Extension(issuer.clone()));

        Self {
            fake_s3,
            issuer,
            client: PresignedClient::new(),
            router,
        }
    }

    /// Issuer for a bucket the fake does not serve
    pub fn issuer_for_missing_bucket(&self) -> PresignedAccessIssuer {
        PresignedAccessIssuer::new(
            static_s3_client(&self.fake_s3.endpoint_url),
            "no-such-bucket".to_string(),
            60,
            Arc::new(OwnerAuthorizer),
        )
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        caller_id: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        let mut request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(caller_id) = caller_id {
            request = request.header("Authorization", format!("Bearer {caller_id}"));
        }

        self.router
            .clone()
            .oneshot(request.body(Body::from(payload.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn send_get_request(&self, route: &str, caller_id: Option<&str>) -> Response {
        let mut request = Request::builder().uri(route).method("GET");
        if let Some(caller_id) = caller_id {
            request = request.header("Authorization", format!("Bearer {caller_id}"));
        }

        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

/// Issuer and redeemer against LocalStack, with a fresh bucket per test
pub struct LocalStackContext {
    pub s3_client: Arc<S3Client>,
    pub bucket_name: String,
    pub issuer: PresignedAccessIssuer,
    pub client: PresignedClient,
}

impl LocalStackContext {
    pub async fn new(presign_expiry_override: Option<u64>) -> Self {
        setup_test_env();

        let environment = Environment::Development {
            presign_expiry_override,
        };

        let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
        let bucket_name = format!("presign-test-{}", Uuid::new_v4().simple());

        s3_client
            .create_bucket()
            .bucket(&bucket_name)
            .send()
            .await
            .expect("Failed to create test bucket, is LocalStack running?");

        let issuer = PresignedAccessIssuer::new(
            s3_client.clone(),
            bucket_name.clone(),
            environment.presigned_url_expiry_secs(),
            Arc::new(OwnerAuthorizer),
        );

        Self {
            s3_client,
            bucket_name,
            issuer,
            client: PresignedClient::new(),
        }
    }

    /// Issuer for a bucket that was never created
    pub fn issuer_for_missing_bucket(&self) -> PresignedAccessIssuer {
        PresignedAccessIssuer::new(
            self.s3_client.clone(),
            format!("missing-{}", Uuid::new_v4().simple()),
            60,
            Arc::new(OwnerAuthorizer),
        )
    }
}
