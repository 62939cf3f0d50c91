use axum::response::Response;
use http_body_util::BodyExt;
use presign::object_key::ObjectKey;
use uuid::Uuid;

pub const CALLER_ID: &str = "testuser12345";

/// Fresh key owned by `CALLER_ID`
pub fn unique_key() -> ObjectKey {
    ObjectKey::new(CALLER_ID, &format!("hello-{}", Uuid::new_v4().simple())).unwrap()
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
