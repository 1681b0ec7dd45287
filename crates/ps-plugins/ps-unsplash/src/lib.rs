//! # ps-unsplash
//!
//! `PhotoSearchClient` over the Unsplash search endpoint, plus a plain HTTP
//! `ImageFetcher` for the thumbnail and full-size URLs it hands out.
//! Features: single in-flight search with cancellation, error classification.

mod image_fetch;

pub use image_fetch::HttpImageFetcher;

use async_trait::async_trait;
use ps_core::error::FetchError;
use ps_core::models::PhotoSummary;
use ps_core::traits::PhotoSearchClient;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<PhotoData>,
}

#[derive(Debug, Deserialize)]
struct PhotoData {
    description: Option<String>,
    alt_description: Option<String>,
    urls: PhotoUrls,
    user: User,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    full: String,
    small: String,
}

#[derive(Debug, Deserialize)]
struct User {
    name: String,
}

impl From<PhotoData> for PhotoSummary {
    fn from(data: PhotoData) -> Self {
        PhotoSummary {
            description: data.description,
            alt_description: data.alt_description,
            thumbnail_url: data.urls.small,
            full_url: data.urls.full,
            user_name: data.user.name,
        }
    }
}

/// Maps transport failures onto the categories the UI distinguishes.
pub(crate) fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::NoConnectivity
    } else if err.is_decode() {
        FetchError::Decode(err.to_string())
    } else {
        FetchError::Unknown(err.to_string())
    }
}

pub struct UnsplashClient {
    client: reqwest::Client,
    endpoint: String,
    /// Full `Authorization` header value, `Client-ID <key>`.
    authorization: String,
    per_page: u32,
    /// The search currently in flight, tagged with a sequence number.
    pending: Mutex<Option<(u64, CancellationToken)>>,
    sequence: AtomicU64,
}

impl UnsplashClient {
    pub fn new(endpoint: String, access_key: &str, per_page: u32) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, access_key, per_page)
    }

    /// Reuses an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        endpoint: String,
        access_key: &str,
        per_page: u32,
    ) -> Self {
        Self {
            client,
            endpoint,
            authorization: format!("Client-ID {access_key}"),
            per_page,
            pending: Mutex::new(None),
            sequence: AtomicU64::new(0),
        }
    }

    async fn send(&self, query: &str) -> Result<Vec<PhotoSummary>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("per_page", self.per_page.to_string()), ("query", query.to_string())])
            .header("Accept-Version", "v1")
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        let decoded: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            log::warn!("unsplash returned an unreadable body for {query:?}: {e}");
            FetchError::Decode(e.to_string())
        })?;

        Ok(decoded.results.into_iter().map(PhotoSummary::from).collect())
    }
}

#[async_trait]
impl PhotoSearchClient for UnsplashClient {
    async fn search(&self, query: &str) -> Result<Vec<PhotoSummary>, FetchError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((seq, token.clone()));
        if let Some((_, previous)) = previous {
            previous.cancel();
        }

        let result = tokio::select! {
            _ = token.cancelled() => Err(FetchError::Cancelled),
            result = self.send(query) => result,
        };

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*pending, Some((current, _)) if current == seq) {
            *pending = None;
        }
        result
    }

    fn cancel(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((_, token)) = pending {
            token.cancel();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP response and reports the raw request text.
    pub(crate) async fn serve_once(
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
        });
        (format!("http://{addr}/search/photos"), rx)
    }

    /// Accepts connections and never answers.
    async fn stalled_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/search/photos")
    }

    const SAMPLE: &str = r#"{
        "total": 2,
        "results": [
            {
                "id": "abc",
                "description": "Foggy ridge",
                "alt_description": null,
                "urls": { "raw": "r", "full": "https://images.example/abc-full", "small": "https://images.example/abc-small" },
                "user": { "name": "Mira", "username": "mira" }
            },
            {
                "description": null,
                "alt_description": "red fox in snow",
                "urls": { "full": "https://images.example/def-full", "small": "https://images.example/def-small" },
                "user": { "name": "Jonas" }
            }
        ]
    }"#;

    #[test]
    fn decodes_search_response_ignoring_unknown_fields() {
        let decoded: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let summaries: Vec<PhotoSummary> = decoded.results.into_iter().map(Into::into).collect();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].description.as_deref(), Some("Foggy ridge"));
        assert_eq!(summaries[0].thumbnail_url, "https://images.example/abc-small");
        assert_eq!(summaries[1].alt_description.as_deref(), Some("red fox in snow"));
        assert_eq!(summaries[1].user_name, "Jonas");
    }

    #[tokio::test]
    async fn sends_versioned_authorized_query() {
        let (endpoint, request) = serve_once("application/json", SAMPLE.as_bytes().to_vec()).await;
        let client = UnsplashClient::new(endpoint, "test-key", 50);

        let summaries = client.search("red fox").await.unwrap();
        assert_eq!(summaries.len(), 2);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /search/photos?per_page=50&query=red+fox "));
        assert!(request.contains("accept-version: v1"));
        assert!(request.contains("authorization: client-id test-key"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_failure() {
        let (endpoint, _request) = serve_once("application/json", b"<html>".to_vec()).await;
        let client = UnsplashClient::new(endpoint, "k", 50);

        assert!(matches!(
            client.search("anything").await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_no_connectivity() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = UnsplashClient::new(format!("http://{addr}/search/photos"), "k", 50);

        assert_eq!(client.search("offline").await, Err(FetchError::NoConnectivity));
    }

    #[tokio::test]
    async fn new_search_cancels_pending_one() {
        let client = Arc::new(UnsplashClient::new(stalled_server().await, "k", 50));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.search("first").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.search("second").await }
        });

        let first = tokio::time::timeout(Duration::from_secs(5), first)
            .await
            .expect("first search should resolve once superseded")
            .unwrap();
        assert_eq!(first, Err(FetchError::Cancelled));

        tokio::time::sleep(Duration::from_millis(50)).await;
        client.cancel();
        let second = tokio::time::timeout(Duration::from_secs(5), second)
            .await
            .expect("explicit cancel should resolve the pending search")
            .unwrap();
        assert_eq!(second, Err(FetchError::Cancelled));
    }
}
