use std::env;
use std::time::Duration;

/// Environment variable holding the base URL of the chat backend.
pub const BASE_URL_ENV: &str = "CHAT_API_URL";

/// Environment variable holding the request timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "CHAT_API_TIMEOUT_SECS";

/// Builder for [`HttpServiceConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpServiceConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpServiceConfigBuilder {
    /// Creates an empty builder.
    ///
    /// A configuration without a base URL is still usable, but every
    /// request made with it fails with [`ErrorKind::NotConfigured`].
    ///
    /// [`ErrorKind::NotConfigured`]: little_chat_service::ErrorKind::NotConfigured
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from [`BASE_URL_ENV`] and [`TIMEOUT_ENV`].
    ///
    /// A blank base URL counts as missing. The timeout must be a positive
    /// number of seconds, other values are logged and ignored.
    #[inline]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::new();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            builder = builder.with_base_url(base_url);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    builder = builder.with_timeout(Duration::from_secs(secs));
                }
                _ => {
                    warn!("ignoring invalid {TIMEOUT_ENV} value: {timeout:?}");
                }
            }
        }
        builder
    }

    /// Sets the base URL of the chat backend.
    ///
    /// Blank values are treated as missing.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let base_url = base_url.into();
        self.base_url = if base_url.trim().is_empty() {
            None
        } else {
            Some(base_url.trim().to_owned())
        };
        self
    }

    /// Sets a timeout for each request.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpServiceConfig {
        HttpServiceConfig {
            base_url: self.base_url,
            timeout: self.timeout,
        }
    }
}

/// Configuration for the HTTP chat service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpServiceConfig {
    pub(crate) base_url: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl HttpServiceConfig {
    /// Returns the configured base URL.
    #[inline]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the configured request timeout.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Joins `path` onto the base URL, if there is one.
    pub(crate) fn endpoint(&self, path: &str) -> Option<String> {
        let base_url = self.base_url.as_deref()?;
        Some(format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
