// Topic-discovery collaborator used by the trending topics endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Failure reported by a topic-discovery backend.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("topic discovery is not configured")]
    Unconfigured,
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("topic discovery request failed: {0}")]
    Transport(reqwest::Error),
    #[error("topic discovery returned invalid JSON: {0}")]
    Decode(serde_json::Error),
    #[error("{0}")]
    Other(String),
}

// The upstream URL is internal; keep it out of messages that reach clients.
impl From<reqwest::Error> for DiscoveryError {
    fn from(e: reqwest::Error) -> Self {
        DiscoveryError::Transport(e.without_url())
    }
}

/// External flow that finds trending topics for a platform.
#[async_trait]
pub trait TopicDiscovery: Send + Sync {
    async fn discover(&self, platform: &str) -> Result<Value, DiscoveryError>;
}

/// Placeholder backend for deployments without an upstream.
pub struct UnconfiguredTopicDiscovery;

#[async_trait]
impl TopicDiscovery for UnconfiguredTopicDiscovery {
    async fn discover(&self, _platform: &str) -> Result<Value, DiscoveryError> {
        Err(DiscoveryError::Unconfigured)
    }
}

/// Calls the topic-discovery flow over HTTP.
pub struct HttpTopicDiscovery {
    client: reqwest::Client,
    url: String,
}

impl HttpTopicDiscovery {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TopicDiscovery for HttpTopicDiscovery {
    async fn discover(&self, platform: &str) -> Result<Value, DiscoveryError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "platform": platform }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(DiscoveryError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        serde_json::from_slice(&body).map_err(DiscoveryError::Decode)
    }
}

/// Best-effort message from an upstream error body: a JSON `message` or
/// `error` field, else the raw text.
fn upstream_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    String::from_utf8_lossy(body).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    /// Serve `router` on an ephemeral local port and return the topics URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/topics")
    }

    fn client(url: &str) -> HttpTopicDiscovery {
        HttpTopicDiscovery::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_success_passes_body_through() {
        let url = spawn_upstream(Router::new().route(
            "/topics",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "platform": body["platform"], "topics": ["shorts", "live"] }))
            }),
        ))
        .await;

        let topics = client(&url).discover("youtube").await.unwrap();
        assert_eq!(
            topics,
            json!({ "platform": "youtube", "topics": ["shorts", "live"] })
        );
    }

    #[tokio::test]
    async fn test_http_error_status_maps_to_upstream() {
        let url = spawn_upstream(Router::new().route(
            "/topics",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "message": "quota" })),
                )
            }),
        ))
        .await;

        let err = client(&url).discover("youtube").await.unwrap_err();
        match err {
            DiscoveryError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "quota");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_non_json_success_is_decode_error() {
        let url = spawn_upstream(Router::new().route("/topics", post(|| async { "not json" }))).await;

        let err = client(&url).discover("youtube").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_http_unreachable_is_transport_error_without_url() {
        // Reserve a port, then close it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{addr}/topics");

        let err = client(&url).discover("youtube").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Transport(_)), "{err:?}");
        let message = err.to_string();
        assert!(!message.contains(&addr.to_string()), "{message}");
        assert!(!message.contains("/topics"), "{message}");
    }

    #[test]
    fn test_upstream_message_prefers_json_fields() {
        assert_eq!(upstream_message(br#"{"message":"quota"}"#), "quota");
        assert_eq!(upstream_message(br#"{"error":"bad key"}"#), "bad key");
        assert_eq!(upstream_message(b"  plain failure \n"), "plain failure");
        assert_eq!(upstream_message(b""), "");
    }

    #[test]
    fn test_error_display_is_the_message() {
        let err = DiscoveryError::Upstream {
            status: 502,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "boom");
        assert_eq!(DiscoveryError::Other("x".into()).to_string(), "x");
    }

    #[tokio::test]
    async fn test_unconfigured_always_fails() {
        let result = UnconfiguredTopicDiscovery.discover("youtube").await;
        assert!(matches!(result, Err(DiscoveryError::Unconfigured)));
    }
}
