//! A chat service backed by an HTTP endpoint.
//!
//! Messages are posted as `{"message": ...}` to `<base-url>/chat`, and the
//! reply is read from the `reply` field of the JSON response.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use little_chat_service::{
    ChatReply, ChatRequest, ChatService, ChatServiceError, ErrorKind,
};
use mime::Mime;
use reqwest::{Client, Response, header};

pub use config::{
    BASE_URL_ENV, HttpServiceConfig, HttpServiceConfigBuilder, TIMEOUT_ENV,
};
use proto::{ErrorBody, HealthBody, ReplyBody};

/// How long [`HttpChatService::check_health`] waits for the backend.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for [`HttpChatService`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    detail: Option<String>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            detail: None,
        }
    }

    fn not_configured() -> Self {
        Self::new(
            format!("chat service base URL is not set ({BASE_URL_ENV})"),
            ErrorKind::NotConfigured,
        )
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_status() {
            ErrorKind::Status
        } else if err.is_decode() {
            ErrorKind::Decode
        } else {
            ErrorKind::Transport
        };
        Self::new(format!("{err}"), kind)
    }

    #[inline]
    fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => write!(f, "{}", self.message),
        }
    }
}

impl StdError for Error {}

impl ChatServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// HTTP chat service.
#[derive(Clone, Debug)]
pub struct HttpChatService {
    client: Client,
    config: Arc<HttpServiceConfig>,
}

impl HttpChatService {
    /// Creates a new `HttpChatService` with the given configuration.
    pub fn new(config: HttpServiceConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|err| {
            warn!("cannot apply client settings, using defaults: {err}");
            Client::new()
        });
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this service.
    #[inline]
    pub fn config(&self) -> &HttpServiceConfig {
        &self.config
    }

    /// Probes the root endpoint of the backend, which answers
    /// `{"status": "ok"}` when it is up.
    ///
    /// Gives up after [`HEALTH_CHECK_TIMEOUT`], regardless of the configured
    /// request timeout.
    #[inline]
    pub async fn check_health(&self) -> Result<(), Error> {
        self.check_health_within(HEALTH_CHECK_TIMEOUT).await
    }

    /// Like [`check_health`], but gives up after `limit`.
    ///
    /// [`check_health`]: HttpChatService::check_health
    pub async fn check_health_within(&self, limit: Duration) -> Result<(), Error> {
        let Some(url) = self.config.endpoint("") else {
            return Err(Error::not_configured());
        };
        let resp = self
            .client
            .get(url)
            .timeout(limit)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(Error::from_reqwest)?;
        let body = resp.bytes().await.map_err(Error::from_reqwest)?;
        let health: HealthBody = serde_json::from_slice(&body).map_err(|err| {
            Error::new(format!("malformed health response: {err}"), ErrorKind::Decode)
        })?;
        if health.status != "ok" {
            return Err(Error::new(
                format!("backend reports status {:?}", health.status),
                ErrorKind::Status,
            ));
        }
        debug!("chat backend is healthy");
        Ok(())
    }
}

impl ChatService for HttpChatService {
    type Error = Error;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        let resp_fut = self.config.endpoint("chat").map(|url| {
            trace!("posting a message to {url}");
            self.client
                .post(url)
                .header(header::CONTENT_TYPE, "application/json")
                .json(&proto::create_body(req))
                .send()
        });

        async move {
            let Some(resp_fut) = resp_fut else {
                return Err(Error::not_configured());
            };
            let resp = resp_fut.await.map_err(Error::from_reqwest)?;

            let status = resp.status();
            if !status.is_success() {
                // The body is only read for diagnostics here.
                let detail = resp
                    .bytes()
                    .await
                    .ok()
                    .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
                    .and_then(ErrorBody::into_detail);
                return Err(Error::new(
                    format!("server responded with {status}"),
                    ErrorKind::Status,
                )
                .with_detail(detail));
            }

            if !is_json_response(&resp) {
                debug!(
                    "unexpected content type: {:?}, decoding anyway",
                    resp.headers().get(header::CONTENT_TYPE)
                );
            }

            let body = resp.bytes().await.map_err(Error::from_reqwest)?;
            let body: ReplyBody = serde_json::from_slice(&body).map_err(|err| {
                Error::new(format!("malformed reply: {err}"), ErrorKind::Decode)
            })?;
            Ok(ChatReply { reply: body.reply })
        }
    }
}

fn is_json_response(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| {
            m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
        })
        .unwrap_or(false)
}
