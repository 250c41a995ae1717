//! Portable portal cookies.
//!
//! A logged-in portal session is nothing more than its cookies. They are
//! exported as a name/value map, stored as JSON text and loaded back into a
//! fresh cookie jar on the next request.

use std::collections::BTreeMap;

use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use url::Url;

/// Cookie name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalCookies(BTreeMap<String, String>);

impl PortalCookies {
    /// Collects the cookies the jar would send to `url`.
    pub fn from_jar(jar: &Jar, url: &Url) -> Self {
        jar.cookies(url)
            .and_then(|header| header.to_str().ok().map(Self::parse_header))
            .unwrap_or_default()
    }

    /// Parses a `Cookie` header value (`a=1; b=2`).
    #[must_use]
    pub fn parse_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self(cookies)
    }

    /// Loads the cookies into `jar` for every path under `url`.
    pub fn load_into(&self, jar: &Jar, url: &Url) {
        for (name, value) in &self.0 {
            jar.add_cookie_str(&format!("{name}={value}; Path=/"), url);
        }
    }

    /// Serializes to JSON text for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses stored JSON text.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Value of one cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Adds or replaces a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
