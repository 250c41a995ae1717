//! Authenticated portal session.

use std::sync::Arc;

use easyjw_core::grades::CourseAttempt;
use reqwest::cookie::Jar;
use reqwest::header::REFERER;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::cookies::PortalCookies;
use crate::error::PortalError;
use crate::grades::{parse_grade_table, parse_semester_options};

/// A cookie-bearing client that is logged in to the portal.
#[derive(Clone)]
pub struct PortalSession {
    client: Client,
    jar: Arc<Jar>,
    config: Arc<PortalConfig>,
}

impl std::fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSession")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Builds a client with its own cookie jar.
pub(crate) fn build_client(config: &PortalConfig) -> Result<(Client, Arc<Jar>), reqwest::Error> {
    let jar = Arc::new(Jar::default());
    let client = Client::builder()
        .cookie_provider(Arc::clone(&jar))
        .user_agent(&config.user_agent)
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .build()?;
    Ok((client, jar))
}

impl PortalSession {
    pub(crate) fn new(client: Client, jar: Arc<Jar>, config: Arc<PortalConfig>) -> Self {
        Self {
            client,
            jar,
            config,
        }
    }

    /// Rebuilds a session from stored cookies. No request is made, so the
    /// cookies may turn out to be stale on first use.
    pub fn from_cookies(
        config: Arc<PortalConfig>,
        cookies: &PortalCookies,
    ) -> Result<Self, PortalError> {
        let (client, jar) = build_client(&config)?;
        let url = config.url(&config.main_page_path)?;
        cookies.load_into(&jar, &url);
        Ok(Self::new(client, jar, config))
    }

    /// Cookies to persist for later requests.
    pub fn cookies(&self) -> PortalCookies {
        match self.config.url(&self.config.main_page_path) {
            Ok(url) => PortalCookies::from_jar(&self.jar, &url),
            Err(e) => {
                warn!(error = %e, "Cannot resolve portal URL for cookie export");
                PortalCookies::default()
            }
        }
    }

    /// Fetches the grade list, optionally for one term (`YYYY-YYYY-N`).
    pub async fn fetch_grades(&self, semester: &str) -> Result<Vec<CourseAttempt>, PortalError> {
        let url = self.config.url(&self.config.grade_list_path)?;
        let referer = self.config.url(&self.config.grade_query_path)?;

        let response = self
            .client
            .post(url)
            .header(REFERER, referer.as_str())
            .form(&[("kksj", semester), ("kcxz", ""), ("kcmc", ""), ("xsfs", "all")])
            .send()
            .await?;

        let body = read_ok_body(response).await?;
        let attempts = parse_grade_table(&body).ok_or(PortalError::SessionExpired)?;

        let scope = if semester.is_empty() { "all" } else { semester };
        info!(
            semester = scope,
            count = attempts.len(),
            "Fetched grade list"
        );
        Ok(attempts)
    }

    /// Lists the term codes the grade query form offers.
    pub async fn available_semesters(&self) -> Result<Vec<String>, PortalError> {
        let url = self.config.url(&self.config.grade_query_path)?;
        let response = self.client.get(url).send().await?;

        let body = read_ok_body(response).await?;
        let semesters = parse_semester_options(&body).ok_or(PortalError::SessionExpired)?;

        debug!(count = semesters.len(), "Fetched term list");
        Ok(semesters)
    }
}

async fn read_ok_body(response: reqwest::Response) -> Result<String, PortalError> {
    let status = response.status();
    if status != StatusCode::OK {
        warn!(status = %status, "Portal returned unexpected status");
        return Err(PortalError::Unavailable(format!("portal returned {status}")));
    }
    Ok(response.text().await?)
}
