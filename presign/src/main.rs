use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use presign::{
    authorization::OwnerAuthorizer, issuer::PresignedAccessIssuer, logging, server,
    types::Environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    logging::init(&environment);

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let issuer = Arc::new(PresignedAccessIssuer::new(
        s3_client,
        environment.s3_bucket(),
        environment.presigned_url_expiry_secs(),
        Arc::new(OwnerAuthorizer),
    ));

    server::start(environment, issuer).await
}
