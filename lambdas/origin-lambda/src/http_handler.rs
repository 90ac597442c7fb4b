use imagekit_shared::{AppState, CacheOutcome, DirectResponse, ImageKitError};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Serve `GET /<key>`, optionally with `?w=..&h=..&q=..&format=..` overriding
/// the key's own parameters.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path();
    tracing::info!("Origin request - Method: {} Path: {}", method, path);

    if method != Method::GET && method != Method::HEAD {
        return json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let key = match urlencoding::decode(path.trim_start_matches('/')) {
        Ok(key) => key.into_owned(),
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid path encoding"),
    };

    let handler = &state.handler;
    let source_bucket = &state.config().source_bucket;
    let query = event.uri().query().unwrap_or("");

    let result = if query.is_empty() {
        handler.handle_direct(source_bucket, &key).await
    } else {
        match handler.parse_request(&key, query) {
            Ok(params) => {
                let cache_key = params.to_key();
                handler
                    .handle_direct_params(source_bucket, &cache_key, &params)
                    .await
            }
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(response) => image_response(response, method == Method::HEAD),
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Direct request failed");
            json_error(status_for(&e), &e.to_string())
        }
    }
}

fn image_response(response: DirectResponse, head_only: bool) -> Result<Response<Body>, Error> {
    let cache_status = match response.cache {
        CacheOutcome::Hit => "Hit",
        CacheOutcome::Stored | CacheOutcome::WriteFailed(_) => "Miss",
    };

    let body = if head_only {
        Body::Empty
    } else {
        Body::Binary(Vec::from(response.data))
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", response.content_type)
        .header("Cache-Control", CACHE_CONTROL_IMMUTABLE)
        .header("X-Cache", cache_status)
        .header("Access-Control-Allow-Origin", "*")
        .body(body)
        .map_err(Box::new)?)
}

fn status_for(err: &ImageKitError) -> StatusCode {
    match err {
        ImageKitError::KeyParse(_) => StatusCode::BAD_REQUEST,
        ImageKitError::SourceNotFound { .. } => StatusCode::NOT_FOUND,
        ImageKitError::InvalidImageDimensions { .. } | ImageKitError::TranscodeFailed(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ImageKitError::Config(_) | ImageKitError::CacheWriteFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use bytes::Bytes;
    use imagekit_shared::{Config, StoreError};

    fn state() -> Arc<AppState> {
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        let config = Config {
            source_bucket: "originals".to_string(),
            cache_bucket: "optimized".to_string(),
            region: "us-east-1".to_string(),
            max_width: 2000,
            max_height: 2000,
            quality: 80,
        };
        AppState::new(config, aws_sdk_s3::Client::from_conf(s3_config))
    }

    fn request(method: &str, uri: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::Empty)
            .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_non_get() {
        let response = function_handler(request("POST", "/a.jpg"), state()).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_rejects_undecodable_path() {
        let response = function_handler(request("GET", "/%FF%FE.jpg"), state()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_file_name_is_bad_request() {
        // Fails at key parsing, before any store call
        let response = function_handler(request("GET", "/width=100/"), state()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        let not_found = ImageKitError::SourceNotFound {
            bucket: "b".to_string(),
            key: "k".to_string(),
            source: StoreError::NotFound {
                bucket: "b".to_string(),
                key: "k".to_string(),
            },
        };
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&ImageKitError::InvalidImageDimensions { width: 0, height: 0 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ImageKitError::transcode("bad")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ImageKitError::KeyParse(String::new())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_image_response_headers() {
        let response = image_response(
            DirectResponse {
                data: Bytes::from_static(b"webp"),
                content_type: "image/webp".to_string(),
                cache: CacheOutcome::Hit,
            },
            false,
        )
        .unwrap();

        assert_eq!(response.headers()["Content-Type"], "image/webp");
        assert_eq!(response.headers()["Cache-Control"], CACHE_CONTROL_IMMUTABLE);
        assert_eq!(response.headers()["X-Cache"], "Hit");
        assert_eq!(response.body(), &Body::Binary(b"webp".to_vec()));
    }

    #[test]
    fn test_head_has_no_body() {
        let response = image_response(
            DirectResponse {
                data: Bytes::from_static(b"webp"),
                content_type: "image/webp".to_string(),
                cache: CacheOutcome::Stored,
            },
            true,
        )
        .unwrap();

        assert_eq!(response.headers()["X-Cache"], "Miss");
        assert_eq!(response.body(), &Body::Empty);
    }
}
