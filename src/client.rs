use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_ERRORS,
    STREAM_FRAGMENTS,
};
use crate::sse::process_sse;
use crate::types::{ChatCompletionChunk, ChatCompletionRequest, Fragment};

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const APP_TITLE: &str = "TermChat";

/// A lazy, finite-until-closed sequence of response fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// The remote completion capability used by a chat session.
///
/// Given a model and the conversation so far, an implementation returns the streamed fragments of
/// the next assistant turn.  Failures that happen before the first fragment are returned from
/// `stream_chat`; failures after that arrive as `Err` items in the stream.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start streaming a completion for `request`.
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<FragmentStream>;
}

/// Client for OpenRouter and other OpenAI-compatible chat completion APIs.
#[derive(Clone)]
pub struct OpenRouter {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl OpenRouter {
    /// Create a new client for the public OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `base_url` must be an absolute URL; a trailing `/` is added when missing so that endpoint
    /// paths join onto it.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::configuration("API key must not be empty"));
        }

        let base_url = match base_url {
            Some(url) => normalize_base_url(url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and stream chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::configuration("API key contains characters not valid in a header"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, &body, request_id, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {e}"),
                Some(Box::new(e)),
            ),
        }
    }

    /// Send a chat completion request and stream the response fragments.
    pub async fn stream(&self, mut request: ChatCompletionRequest) -> Result<FragmentStream> {
        request.stream = true;
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let start = Instant::now();
        let result = self.start_stream(&request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(&err);
                }
                return Err(err);
            }
        };

        let logger = self.logger.clone();
        let fragments = process_sse(response.bytes_stream())
            .flat_map(move |chunk| stream::iter(chunk_to_fragments(chunk, logger.as_deref())))
            .inspect(|item| match item {
                Ok(_) => STREAM_FRAGMENTS.click(),
                Err(_) => STREAM_ERRORS.click(),
            });
        Ok(Box::pin(fragments))
    }

    async fn start_stream(&self, request: &ChatCompletionRequest) -> Result<Response> {
        let url = format!("{}chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }
}

impl fmt::Debug for OpenRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouter")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenRouter {
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<FragmentStream> {
        self.stream(request).await
    }
}

fn normalize_base_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    if parsed.cannot_be_a_base() {
        return Err(Error::configuration(format!(
            "base URL {url} cannot be used as a base"
        )));
    }
    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

/// Expand one parsed SSE item into fragment results, logging along the way.
fn chunk_to_fragments(
    chunk: Result<ChatCompletionChunk>,
    logger: Option<&dyn ClientLogger>,
) -> Vec<Result<Fragment>> {
    let result = chunk.and_then(|chunk| {
        if let Some(logger) = logger {
            logger.log_stream_chunk(&chunk);
        }
        chunk.into_fragments()
    });
    match result {
        Ok(fragments) => fragments.into_iter().map(Ok).collect(),
        Err(err) => {
            if let Some(logger) = logger {
                logger.log_error(&err);
            }
            vec![Err(err)]
        }
    }
}

/// Map a non-success status and its body onto an [`Error`].
fn error_from_status(
    status_code: u16,
    body: &str,
    request_id: Option<String>,
    retry_after: Option<u64>,
) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        code: Option<serde_json::Value>,
        #[serde(rename = "type")]
        error_type: Option<String>,
        param: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error);
    let message = detail
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let code = detail.as_ref().and_then(|e| {
        e.error_type.clone().or_else(|| match &e.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => None,
        })
    });
    let param = detail.as_ref().and_then(|e| e.param.clone());

    match status_code {
        400 => Error::bad_request(message, param),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message, request_id),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, code, message, request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl ClientLogger for RecordingLogger {
        fn log_request(&self, request: &ChatCompletionRequest) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("request {}", request.model));
        }

        fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("chunk {}", chunk.choices.len()));
        }

        fn log_error(&self, error: &Error) {
            self.lines.lock().unwrap().push(format!("error {error}"));
        }
    }

    #[test]
    fn client_creation() {
        let client = OpenRouter::new("test-key").unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = OpenRouter::with_options(
            "test-key",
            Some("http://localhost:8080/v1"),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_key_rejected() {
        let err = OpenRouter::new("  ").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn invalid_base_url_rejected() {
        let err = OpenRouter::with_options("test-key", Some("not a url"), None).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));

        let err = OpenRouter::with_options("test-key", Some("mailto:me@example.com"), None)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn debug_redacts_key() {
        let client = OpenRouter::new("sk-or-secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-or-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn headers_carry_bearer_token() {
        let client = OpenRouter::new("sk-or-secret").unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer sk-or-secret"
        );
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "text/event-stream");

        let client = OpenRouter::new("bad\nkey").unwrap();
        assert!(client.default_headers().unwrap_err().is_configuration());
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error":{"message":"No auth credentials found","code":401}}"#;
        let err = error_from_status(401, body, None, None);
        assert!(err.is_authentication());
        assert!(err.to_string().contains("No auth credentials found"));

        let body = r#"{"error":{"message":"temperature out of range","param":"temperature"}}"#;
        let err = error_from_status(400, body, None, None);
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("temperature"));

        let err = error_from_status(404, r#"{"error":{"message":"No endpoints found"}}"#, None, None);
        assert!(err.is_not_found());

        let err = error_from_status(429, "slow down", None, Some(12));
        assert!(err.is_rate_limit());
        assert!(err.to_string().contains("retry after 12 seconds"));

        let err = error_from_status(502, "bad gateway", None, None);
        assert!(err.is_server_error());

        let body = r#"{"error":{"message":"Insufficient credits","code":"payment_required"}}"#;
        let err = error_from_status(402, body, Some("req-9".to_string()), None);
        assert_eq!(err.status_code(), Some(402));
        assert_eq!(err.request_id(), Some("req-9"));
        assert!(err.to_string().contains("payment_required"));
    }

    #[test]
    fn chunks_expand_and_log() {
        let logger = RecordingLogger::default();
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap();
        let fragments = chunk_to_fragments(Ok(chunk), Some(&logger));
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), &Fragment::text("Hi"));

        let errored = chunk_to_fragments(Err(Error::streaming("reset", None)), Some(&logger));
        assert!(errored[0].as_ref().unwrap_err().is_streaming());

        let lines = logger.lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "chunk 1");
        assert!(lines[1].starts_with("error Streaming error"));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        // Nothing listens on port 1 of the loopback interface.
        let client = OpenRouter::with_options(
            "test-key",
            Some("http://127.0.0.1:1/api/v1"),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let request = ChatCompletionRequest::new(
            crate::DEFAULT_MODEL,
            vec![crate::Message::user("hello")],
        );
        match client.stream(request).await {
            Err(err) => assert!(err.is_connection(), "unexpected error: {err}"),
            Ok(_) => panic!("connecting to a closed port should fail"),
        }
    }

    #[tokio::test]
    #[ignore] // Requires a real API key
    async fn stream_live() {
        let Ok(api_key) = std::env::var("OPENROUTER_API_KEY") else {
            println!("Skipping stream_live: OPENROUTER_API_KEY not set");
            return;
        };
        let client = OpenRouter::new(api_key).unwrap();
        let request = ChatCompletionRequest::new(
            crate::DEFAULT_MODEL,
            vec![crate::Message::user("Reply with the single word: pong")],
        );
        let mut stream = client.stream(request).await.unwrap();
        let mut received = false;
        while let Some(fragment) = stream.next().await {
            fragment.unwrap();
            received = true;
        }
        assert!(received, "Expected to receive some fragments");
    }
}
