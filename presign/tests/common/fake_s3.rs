use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use chrono::{NaiveDateTime, TimeDelta, Utc};

/// Object as stored by the fake
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub metadata: Vec<(String, String)>,
    pub body: Bytes,
}

#[derive(Clone)]
struct FakeS3State {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

/// In-process stand-in for the S3 object endpoints (path-style addressing)
///
/// It does not verify signatures, but it enforces what a signature binds:
/// PUT/DELETE must come through a presigned URL issued for that verb
/// (`x-id`), within its validity window, carrying every signed header.
/// HEAD is served to the SDK client directly.
pub struct FakeS3 {
    pub endpoint_url: String,
    pub bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl FakeS3 {
    pub async fn start(bucket: &str) -> Self {
        let state = FakeS3State {
            bucket: bucket.to_string(),
            objects: Arc::default(),
        };
        let objects = state.objects.clone();

        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake S3");
        let addr: SocketAddr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint_url: format!("http://{addr}"),
            bucket: bucket.to_string(),
            objects,
        }
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

async fn handle(
    State(state): State<FakeS3State>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches('/');
    let Some((bucket, key)) = path.split_once('/') else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    if bucket != state.bucket {
        return s3_error(StatusCode::NOT_FOUND, "NoSuchBucket", &method);
    }

    let query: HashMap<String, String> =
        url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect();

    match method {
        Method::PUT => {
            if let Err(response) = check_presigned(&query, &headers, "PutObject", &method) {
                return response;
            }

            let metadata = headers
                .iter()
                .filter(|(name, _)| name.as_str().starts_with("x-amz-meta-"))
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let content_type = headers
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string);

            state.objects.lock().unwrap().insert(
                key.to_string(),
                StoredObject {
                    content_type,
                    metadata,
                    body,
                },
            );
            StatusCode::OK.into_response()
        }
        Method::DELETE => {
            if let Err(response) = check_presigned(&query, &headers, "DeleteObject", &method) {
                return response;
            }

            // Deleting a missing key succeeds, as on S3
            state.objects.lock().unwrap().remove(key);
            StatusCode::NO_CONTENT.into_response()
        }
        Method::HEAD => {
            let objects = state.objects.lock().unwrap();
            let Some(object) = objects.get(key) else {
                return StatusCode::NOT_FOUND.into_response();
            };

            let mut response_headers = HeaderMap::new();
            for (name, value) in &object.metadata {
                response_headers.insert(
                    HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    HeaderValue::from_str(value).unwrap(),
                );
            }
            if let Some(content_type) = &object.content_type {
                response_headers.insert("content-type", HeaderValue::from_str(content_type).unwrap());
            }
            (StatusCode::OK, response_headers).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

#[allow(clippy::result_large_err)]
fn check_presigned(
    query: &HashMap<String, String>,
    headers: &HeaderMap,
    operation: &str,
    method: &Method,
) -> Result<(), Response> {
    if !query.contains_key("X-Amz-Signature") {
        return Err(s3_error(StatusCode::FORBIDDEN, "AccessDenied", method));
    }

    if query.get("x-id").map(String::as_str) != Some(operation) {
        return Err(s3_error(
            StatusCode::FORBIDDEN,
            "SignatureDoesNotMatch",
            method,
        ));
    }

    let signed_at = query
        .get("X-Amz-Date")
        .and_then(|date| NaiveDateTime::parse_from_str(date, "%Y%m%dT%H%M%SZ").ok())
        .map(|date| date.and_utc());
    let expires_in = query
        .get("X-Amz-Expires")
        .and_then(|secs| secs.parse::<i64>().ok())
        .map(TimeDelta::seconds);
    match (signed_at, expires_in) {
        (Some(signed_at), Some(expires_in)) if Utc::now() <= signed_at + expires_in => {}
        _ => return Err(s3_error(StatusCode::FORBIDDEN, "AccessDenied", method)),
    }

    let signed_headers = query.get("X-Amz-SignedHeaders").cloned().unwrap_or_default();
    let missing_header = signed_headers
        .split(';')
        .filter(|name| !name.is_empty() && *name != "host")
        .any(|name| !headers.contains_key(name));
    if missing_header {
        return Err(s3_error(
            StatusCode::FORBIDDEN,
            "SignatureDoesNotMatch",
            method,
        ));
    }

    Ok(())
}

fn s3_error(status: StatusCode, code: &str, method: &Method) -> Response {
    if *method == Method::HEAD {
        return status.into_response();
    }

    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Error><Code>{code}</Code><Message>{code}</Message></Error>"
    );
    (status, [("content-type", "application/xml")], body).into_response()
}
