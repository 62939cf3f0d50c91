//! Issues presigned PUT and DELETE URLs for one object, uploads through the
//! PUT URL, optionally deletes through the DELETE URL, then reads the object's
//! metadata back with the service credentials.

use std::{env, sync::Arc};

use anyhow::Context;
use aws_sdk_s3::Client as S3Client;
use tracing::info;

use presign::{
    authorization::OwnerAuthorizer,
    issuer::{PresignedAccessIssuer, UploadOptions},
    logging,
    object_key::ObjectKey,
    redeem::PresignedClient,
    types::Environment,
};

const DEFAULT_OBJECT_KEY: &str = "testuser12345/hello";
const DEFAULT_CONTENT: &str = "some text string";
const DEMO_OWNER_ID: &str = "uuid12394217983";
const DEMO_TAG: &str = "heyyy";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    logging::init(&environment);

    let key: ObjectKey = env::var("OBJECT_KEY")
        .unwrap_or_else(|_| DEFAULT_OBJECT_KEY.to_string())
        .parse()
        .context("OBJECT_KEY is not a valid object key")?;
    let content = env::var("UPLOAD_CONTENT").unwrap_or_else(|_| DEFAULT_CONTENT.to_string());
    let delete_after_upload = env::var("DELETE_AFTER_UPLOAD").is_ok_and(|val| val == "true");

    // The demo acts as the owner of the key
    let caller_id = key.owner_id().to_string();

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let issuer = PresignedAccessIssuer::new(
        s3_client,
        environment.s3_bucket(),
        environment.presigned_url_expiry_secs(),
        Arc::new(OwnerAuthorizer),
    );
    let client = PresignedClient::new();

    info!("Using bucket {} for {key}", issuer.bucket());

    let options = UploadOptions::new(DEMO_OWNER_ID, DEMO_TAG);
    let put_url = issuer.issue_put_token(&caller_id, &key, &options).await?;
    let delete_url = issuer.issue_delete_token(&caller_id, &key).await?;

    client.redeem_upload(&put_url, content).await?;

    if delete_after_upload {
        client.redeem_delete(&delete_url).await?;
    }

    if let Some(metadata) = issuer.fetch_metadata(&key).await {
        info!("Metadata: {metadata:?}");
    }

    Ok(())
}
