//! Network fetcher over a pooled hyper client.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONNECTION, HOST};
use http::{Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use offline_cache_sdk::{CachedResponse, FetchRequest, Fetcher, OfflineCacheError};
use tracing::debug;

/// Plain-HTTP fetcher.
///
/// Every HTTP status is returned as a response; only transport failures are
/// errors.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build(HttpConnector::new());
        Self { client }
    }

    fn build_request(request: &FetchRequest) -> Result<Request<Full<Bytes>>, OfflineCacheError> {
        let uri: Uri = request
            .url
            .parse()
            .map_err(|e| OfflineCacheError::network_with_source(&request.url, e))?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in &request.headers {
                if name != HOST && name != CONNECTION {
                    headers.append(name, value.clone());
                }
            }
        }
        builder
            .body(Full::new(request.body.clone()))
            .map_err(|e| OfflineCacheError::network_with_source(&request.url, e))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, OfflineCacheError> {
        let outgoing = Self::build_request(request)?;
        let response = self
            .client
            .request(outgoing)
            .await
            .map_err(|e| OfflineCacheError::network_with_source(&request.url, e))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| OfflineCacheError::network_with_source(&request.url, e))?
            .to_bytes();

        debug!(url = %request.url, status = %parts.status, bytes = body.len(), "Fetched");
        Ok(CachedResponse::new(parts.status, body).with_headers(parts.headers))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body_and_headers() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/app.js");
            then.status(200)
                .header("content-type", "text/javascript")
                .body("console.log('calc')");
        });

        let fetcher = HttpFetcher::new();
        let response = fetcher
            .fetch(&FetchRequest::get(server.url("/app.js")))
            .await
            .unwrap();

        assert_eq!(response.status, http::StatusCode::OK);
        assert_eq!(response.body, "console.log('calc')");
        assert_eq!(
            response.headers.get("content-type").unwrap(),
            "text/javascript"
        );
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/missing");
            then.status(404).body("not found");
        });

        let response = HttpFetcher::new()
            .fetch(&FetchRequest::get(server.url("/missing")))
            .await
            .unwrap();

        assert_eq!(response.status, http::StatusCode::NOT_FOUND);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_forwards_method_and_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/api/echo")
                .header("content-type", "application/json")
                .body(r#"{"x":1}"#);
            then.status(201);
        });

        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        let request = FetchRequest::new(
            http::Method::POST,
            server.url("/api/echo"),
            offline_cache_sdk::RequestMode::Other,
        )
        .with_payload(headers, Bytes::from_static(br#"{"x":1}"#));

        let response = HttpFetcher::new().fetch(&request).await.unwrap();
        assert_eq!(response.status, http::StatusCode::CREATED);
        m.assert();
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = HttpFetcher::new()
            .fetch(&FetchRequest::get(format!("http://127.0.0.1:{port}/")))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let err = HttpFetcher::new()
            .fetch(&FetchRequest::get("not a url"))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
