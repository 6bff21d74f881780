use anyhow::{Context, Result};

/// Runtime configuration, read once from the environment (a `.env` file is
/// loaded by `main` before this runs).
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) portal_username: String,
    pub(crate) portal_password: String,
    pub(crate) webdriver_url: String,
    pub(crate) browser_headless: bool,
    pub(crate) captcha_api_url: String,
    pub(crate) captcha_api_key: Option<String>,
    pub(crate) smtp_host: String,
    pub(crate) smtp_port: u16,
    pub(crate) smtp_username: String,
    pub(crate) smtp_password: String,
    pub(crate) report_from: String,
    pub(crate) report_recipient: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Ok(Self {
            portal_username: required("IOCL_USERNAME")?,
            portal_password: required("IOCL_PASSWORD")?,
            webdriver_url: optional("WEBDRIVER_URL")
                .unwrap_or_else(|| "http://localhost:9515".into()),
            browser_headless: optional("BROWSER_HEADLESS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            captcha_api_url: optional("CAPTCHA_API_URL")
                .unwrap_or_else(|| "https://api.nopecha.com/".into()),
            captcha_api_key: optional("CAPTCHA_API_KEY"),
            smtp_host: required("SMTP_HOST")?,
            smtp_port: optional("SMTP_PORT")
                .unwrap_or_else(|| "587".into())
                .parse()
                .context("SMTP_PORT is not a valid port number")?,
            smtp_username: required("SMTP_USERNAME")?,
            smtp_password: required("SMTP_PASSWORD")?,
            report_from: required("REPORT_FROM")?,
            report_recipient: required("REPORT_RECIPIENT")?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing required env var {key}"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
