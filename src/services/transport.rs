use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("reading response from {0}: {1}")]
    Body(String, String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Background HTTP for the CRUD flows. Implementations resolve relative urls
/// against the site origin and carry the session cookies.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;

    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        fields: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: Url, jar: Arc<Jar>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(base.to_string(), e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        self.base
            .join(url)
            .map_err(|e| TransportError::InvalidUrl(url.to_string(), e.to_string()))
    }

    fn finish(
        url: &Url,
        res: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<HttpResponse, TransportError> {
        let res = res.map_err(|e| TransportError::Request(url.to_string(), e.to_string()))?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .map_err(|e| TransportError::Body(url.to_string(), e.to_string()))?;
        tracing::debug!(%url, status, bytes = body.len(), "response");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(url)?;
        let mut req = self.client.get(url.clone());
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        Self::finish(&url, req.send())
    }

    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        fields: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(url)?;
        let mut req = self.client.post(url.clone()).form(fields);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        Self::finish(&url, req.send())
    }
}

/// Cookie jar for the site, optionally seeded with a session cookie.
pub fn cookie_jar(base: &Url, session: Option<(&str, &str)>) -> Arc<Jar> {
    let jar = Jar::default();
    if let Some((name, value)) = session {
        jar.add_cookie_str(&format!("{name}={value}; Path=/"), base);
    }
    Arc::new(jar)
}
