//! Client for the university teaching portal.
//!
//! - `login` - Captcha-solving login with bounded retries
//! - `session` - Authenticated session, cookie export and page reads
//! - `captcha` - Pluggable captcha OCR
//! - `grades` - Grade page parsing

pub mod captcha;
pub mod config;
pub mod cookies;
pub mod error;
pub mod grades;
pub mod login;
pub mod session;

pub use captcha::{CaptchaSolver, HttpCaptchaSolver};
pub use config::{LoginMarkers, PortalConfig};
pub use cookies::PortalCookies;
pub use error::{CaptchaError, LoginError, PortalError};
pub use login::PortalClient;
pub use session::PortalSession;
