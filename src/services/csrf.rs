use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use url::Url;

pub const FORM_TOKEN_FIELD: &str = "csrfmiddlewaretoken";

/// Source of the CSRF token, consulted at the moment a request is built.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Reads the named cookie from the shared jar on every call.
pub struct CookieTokenProvider {
    jar: Arc<Jar>,
    url: Url,
    name: String,
}

impl CookieTokenProvider {
    pub fn new(jar: Arc<Jar>, url: Url, name: impl Into<String>) -> Self {
        Self {
            jar,
            url,
            name: name.into(),
        }
    }
}

impl TokenProvider for CookieTokenProvider {
    fn token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.name)
    }
}

/// Value of cookie `name` in a `Cookie:` header string, percent-decoded.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(^| ){}=([^;]+)", regex::escape(name))).ok()?;
    let caps = re.captures(header)?;
    let raw = caps.get(2)?.as_str();
    Some(
        urlencoding::decode(raw)
            .unwrap_or_else(|_| raw.into())
            .into_owned(),
    )
}

#[cfg(test)]
pub struct StaticToken(pub Option<String>);

#[cfg(test)]
impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}
