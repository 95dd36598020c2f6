use std::time::Duration;

use mandi_core::error::AppError;
use mandi_core::identity::IdentityRotator;
use mandi_core::traits::Fetcher;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, redirect};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,hi;q=0.8";
const SEC_CH_UA: &str = r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#;

/// HTTP fetcher using reqwest.
///
/// Sends the headers a desktop browser would send on a top-level navigation,
/// with the user-agent rotated on every request. Responses with a 2xx or 3xx
/// status are returned as text; anything else is an `HttpError`.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    identities: IdentityRotator,
    referer: Option<String>,
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::builder().build()
    }

    pub fn builder() -> ReqwestFetcherBuilder {
        ReqwestFetcherBuilder::default()
    }

    /// Same client, different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Same client, with `Referer` set to `referer` on every request.
    pub fn with_referer(&self, referer: impl Into<String>) -> Self {
        Self {
            referer: Some(referer.into()),
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn headers(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value(self.identities.next())?);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(
            header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        for (name, value) in [
            ("sec-fetch-dest", "document"),
            ("sec-fetch-mode", "navigate"),
            ("sec-fetch-site", "none"),
            ("sec-fetch-user", "?1"),
            ("sec-ch-ua", SEC_CH_UA),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"Windows\""),
        ] {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        if let Some(referer) = &self.referer {
            headers.insert(header::REFERER, header_value(referer)?);
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::HttpError(format!("Invalid header value '{value}': {e}")))
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!(%url, timeout_secs = self.timeout.as_secs(), "Fetching page");

        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout.as_secs())
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else if e.is_redirect() {
                    AppError::HttpError(format!("Too many redirects for {url}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout.as_secs())
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}

/// Builder for [`ReqwestFetcher`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcherBuilder {
    timeout: Duration,
    max_redirects: usize,
    identities: IdentityRotator,
}

impl Default for ReqwestFetcherBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(45),
            max_redirects: 5,
            identities: IdentityRotator::default(),
        }
    }
}

impl ReqwestFetcherBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn identities(mut self, identities: IdentityRotator) -> Self {
        self.identities = identities;
        self
    }

    pub fn build(self) -> Result<ReqwestFetcher, AppError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(self.max_redirects))
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(ReqwestFetcher {
            client,
            identities: self.identities,
            referer: None,
            timeout: self.timeout,
        })
    }
}
