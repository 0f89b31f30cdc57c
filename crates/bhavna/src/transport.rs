//! The HTTP side of an analysis: one request in, one result or one typed
//! failure out.

use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::analysis::{AnalysisRequest, AnalysisResult, BackendStatus, HealthReport};
use crate::error::{ConfigError, TransportError};

/// Something that can classify text.
///
/// The session only talks to this trait, so tests can swap in a scripted
/// fake for the real HTTP client.
pub trait Analyzer: Send + Sync + 'static {
    /// Classify `text`. Exactly one request is made; there are no retries.
    fn analyze(&self, text: String) -> BoxFuture<'static, Result<AnalysisResult, TransportError>>;

    /// Probe the service. Never fails; an unreachable service is
    /// [`BackendStatus::Offline`].
    fn health(&self) -> BoxFuture<'static, BackendStatus> {
        Box::pin(async { BackendStatus::Unknown })
    }

    /// The endpoint named in network error messages.
    fn endpoint(&self) -> &str;
}

/// [`Analyzer`] backed by a JSON HTTP service.
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: Client,
    endpoint: Url,
    root: Url,
}

impl HttpAnalyzer {
    /// Build a client for `endpoint`, which must be an absolute http(s) URL.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason,
        };
        let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }

        let mut root = url.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);

        let client = Client::builder()
            .user_agent(concat!("bhavna/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: url,
            root,
        })
    }

    /// The service root probed by [`Analyzer::health`].
    pub fn service_root(&self) -> &Url {
        &self.root
    }
}

/// Error body the service sends with 4xx/5xx replies. Internal errors add
/// the underlying cause as `message`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn detail(self) -> String {
        match self.message {
            Some(message) if !message.trim().is_empty() => {
                format!("{} ({})", self.error, message.trim())
            }
            _ => self.error,
        }
    }
}

impl Analyzer for HttpAnalyzer {
    fn analyze(&self, text: String) -> BoxFuture<'static, Result<AnalysisResult, TransportError>> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(&AnalysisRequest { text });
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let response = request.send().await.map_err(|e| {
                tracing::warn!(%endpoint, error = %e, "analysis request failed");
                TransportError::Network(e.to_string())
            })?;

            let status = response.status();
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) if !status.is_success() => {
                    tracing::warn!(status = status.as_u16(), error = %e, "error body unreadable");
                    return Err(TransportError::Http {
                        status: status.as_u16(),
                        detail: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "analysis response body unreadable");
                    return Err(TransportError::Parse(format!("unreadable body: {e}")));
                }
            };

            if !status.is_success() {
                let detail = serde_json::from_slice::<ErrorBody>(&body)
                    .ok()
                    .map(ErrorBody::detail);
                tracing::warn!(status = status.as_u16(), ?detail, "analysis service error");
                return Err(TransportError::Http {
                    status: status.as_u16(),
                    detail,
                });
            }

            let result = AnalysisResult::from_json(&body).inspect_err(|e| {
                tracing::warn!(error = %e, bytes = body.len(), "unusable analysis response");
            })?;
            tracing::debug!(emotion = %result.emotion, confidence = result.confidence, "analysis decoded");
            Ok(result)
        })
    }

    fn health(&self) -> BoxFuture<'static, BackendStatus> {
        let request = self.client.get(self.root.clone()).header(ACCEPT, "application/json");
        Box::pin(async move {
            let response = match request.send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    tracing::info!(status = response.status().as_u16(), "health check rejected");
                    return BackendStatus::Offline;
                }
                Err(e) => {
                    tracing::info!(error = %e, "backend unreachable");
                    return BackendStatus::Offline;
                }
            };
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("application/json"));
            if !is_json {
                return BackendStatus::Offline;
            }
            match response.json::<HealthReport>().await {
                Ok(report) => BackendStatus::from(report),
                Err(e) => {
                    tracing::info!(error = %e, "health response not understood");
                    BackendStatus::Offline
                }
            }
        })
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}
