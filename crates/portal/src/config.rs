//! Portal endpoints and login behaviour.

use std::time::Duration;

use url::Url;

/// Default portal origin.
const PORTAL_BASE_URL: &str = "http://zhjw.qfnu.edu.cn";

/// Text the portal renders to signal login outcomes.
///
/// The portal answers 200 for every login, so outcomes are read from the
/// body. Kept separate so markup changes stay out of the login flow.
#[derive(Debug, Clone)]
pub struct LoginMarkers {
    /// Wrong id or password.
    pub bad_credentials: Vec<String>,
    /// Wrong captcha.
    pub bad_captcha: Vec<String>,
    /// Present only on pages behind login.
    pub authenticated: Vec<String>,
}

impl Default for LoginMarkers {
    fn default() -> Self {
        Self {
            bad_credentials: vec!["密码错误".to_string(), "用户名或密码错误".to_string()],
            bad_captcha: vec!["验证码错误".to_string(), "验证码不正确".to_string()],
            authenticated: vec!["教学一体化服务平台".to_string(), "学生个人中心".to_string()],
        }
    }
}

impl LoginMarkers {
    /// Returns true if the body reports bad credentials.
    pub fn is_bad_credentials(&self, body: &str) -> bool {
        contains_any(body, &self.bad_credentials)
    }

    /// Returns true if the body reports a wrong captcha.
    pub fn is_bad_captcha(&self, body: &str) -> bool {
        contains_any(body, &self.bad_captcha)
    }

    /// Returns true if the body is an authenticated page.
    pub fn is_authenticated(&self, body: &str) -> bool {
        contains_any(body, &self.authenticated)
    }
}

fn contains_any(body: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| body.contains(m.as_str()))
}

/// Configuration for the portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Portal origin.
    pub base_url: String,
    /// Captcha image (GET).
    pub captcha_path: String,
    /// Login form target (POST).
    pub login_path: String,
    /// Page fetched to confirm a login (GET).
    pub main_page_path: String,
    /// Grade list (POST).
    pub grade_list_path: String,
    /// Grade query form with the term selector (GET).
    pub grade_query_path: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Login attempts before giving up.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
    /// Login outcome markers.
    pub markers: LoginMarkers,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: PORTAL_BASE_URL.to_string(),
            captcha_path: "/jsxsd/verifycode.servlet".to_string(),
            login_path: "/jsxsd/xk/LoginToXkLdap".to_string(),
            main_page_path: "/jsxsd/framework/xsMain.jsp".to_string(),
            grade_list_path: "/jsxsd/kscj/cjcx_list".to_string(),
            grade_query_path: "/jsxsd/kscj/cjcx_query".to_string(),
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            markers: LoginMarkers::default(),
        }
    }
}

impl PortalConfig {
    /// Default paths against another origin.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves a configured path against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)?.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let config = PortalConfig::default();
        let url = config.url(&config.captcha_path).unwrap();
        assert_eq!(url.as_str(), "http://zhjw.qfnu.edu.cn/jsxsd/verifycode.servlet");
    }

    #[test]
    fn test_markers() {
        let markers = LoginMarkers::default();
        assert!(markers.is_bad_credentials("<font>用户名或密码错误</font>"));
        assert!(markers.is_bad_captcha("验证码错误!!"));
        assert!(markers.is_authenticated("<title>教学一体化服务平台</title>"));
        assert!(!markers.is_authenticated("<title>登录</title>"));
    }
}
