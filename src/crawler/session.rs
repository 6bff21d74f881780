use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::common::capabilities::chromium::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;
use thirtyfour::Capabilities;
use tracing::{info, warn};

use super::captcha::CaptchaSolver;
use super::{extract, normalize, CrawlError, TransactionSource};
use crate::companies::CompanyDirectory;
use crate::config::Config;
use crate::models::Transaction;

const ENTRY_URL: &str = "https://spandan.indianoil.co.in/ioconline/iocExStart.jsp";
const REPORT_URL: &str =
    "https://spandan.indianoil.co.in/ioconline/account/iocExdaily_transaction_process.jsp";

const CAPTCHA_IMAGE_SELECTOR: &str = "#captchaImage";
const CAPTCHA_INPUT_SELECTOR: &str = r#"input[name="captchaInput"]"#;
const USERNAME_SELECTOR: &str = r#"input[name="LogId"]"#;
const PASSWORD_SELECTOR: &str = r#"input[name="LogPwd"]"#;
const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;

const CAPTCHA_WAIT: Duration = Duration::from_secs(10);
const REPORT_TABLE_WAIT: Duration = Duration::from_secs(10);
const ELEMENT_POLL: Duration = Duration::from_millis(100);
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives one portal session per scrape: entry page, captcha, login, report
/// table, extraction. The WebDriver session is quit after every scrape,
/// whatever happened, so scheduled runs never accumulate browser processes.
pub(crate) struct PortalScraper {
    webdriver_url: String,
    username: String,
    password: String,
    headless: bool,
    solver: CaptchaSolver,
    companies: CompanyDirectory,
}

impl PortalScraper {
    pub(crate) fn new(config: &Config, companies: CompanyDirectory) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            username: config.portal_username.clone(),
            password: config.portal_password.clone(),
            headless: config.browser_headless,
            solver: CaptchaSolver::new(
                config.captcha_api_url.clone(),
                config.captcha_api_key.clone(),
            ),
            companies,
        }
    }

    async fn open_browser(&self) -> Result<WebDriver, CrawlError> {
        let mut caps = DesiredCapabilities::chrome();
        if self.headless {
            caps.set_headless()?;
        }
        if cfg!(target_os = "linux") {
            caps.add_arg("--no-sandbox")?;
        }
        caps.add_arg("--window-size=1920,1080")?;

        let driver = WebDriver::new(&self.webdriver_url, Capabilities::from(caps)).await?;
        driver.set_page_load_timeout(PAGE_LOAD_TIMEOUT).await?;
        Ok(driver)
    }

    async fn drive(&self, driver: &WebDriver) -> Result<Vec<Transaction>> {
        driver
            .goto(ENTRY_URL)
            .await
            .map_err(CrawlError::from)
            .context("Failed to load portal entry page")?;

        let captcha_image = self.capture_captcha(driver).await?;
        let solution = self
            .solver
            .solve(&captcha_image)
            .await?
            .ok_or(CrawlError::CaptchaUnsolved)?;

        self.login(driver, &solution)
            .await
            .context("Failed to submit login form")?;

        driver
            .goto(REPORT_URL)
            .await
            .map_err(CrawlError::from)
            .context("Failed to load report page")?;
        // Timing out here means login was rejected or the portal is down.
        wait_for(driver, extract::TABLE_SELECTOR, REPORT_TABLE_WAIT)
            .await
            .context("Report table did not appear")?;

        let raw_rows = extract::transaction_rows(driver).await?;
        info!(rows = raw_rows.len(), "Report table extracted");
        Ok(normalize::normalize(&raw_rows, &self.companies))
    }

    /// Waits for the captcha image element and captures its rendered bytes.
    async fn capture_captcha(&self, driver: &WebDriver) -> Result<Vec<u8>, CrawlError> {
        let element = wait_for(driver, CAPTCHA_IMAGE_SELECTOR, CAPTCHA_WAIT).await?;
        let png = element.screenshot_as_png().await?;
        if png.is_empty() {
            return Err(CrawlError::CaptchaNotServed);
        }
        Ok(png)
    }

    async fn login(&self, driver: &WebDriver, captcha_solution: &str) -> Result<(), CrawlError> {
        driver
            .find(By::Css(CAPTCHA_INPUT_SELECTOR))
            .await?
            .send_keys(captcha_solution)
            .await?;
        driver
            .find(By::Css(USERNAME_SELECTOR))
            .await?
            .send_keys(&self.username)
            .await?;
        driver
            .find(By::Css(PASSWORD_SELECTOR))
            .await?
            .send_keys(&self.password)
            .await?;
        driver.find(By::Css(SUBMIT_SELECTOR)).await?.click().await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for PortalScraper {
    async fn scrape(&self) -> Result<Vec<Transaction>> {
        let driver = self
            .open_browser()
            .await
            .context("Failed to open browser session")?;

        let outcome = self.drive(&driver).await;

        if let Err(err) = driver.quit().await {
            warn!(error = %err, "Failed to quit browser session");
        }
        outcome
    }
}

/// Polls for an element until it exists or the timeout elapses.
async fn wait_for(
    driver: &WebDriver,
    selector: &'static str,
    timeout: Duration,
) -> Result<WebElement, CrawlError> {
    tokio::time::timeout(timeout, async {
        loop {
            if let Ok(element) = driver.find(By::Css(selector)).await {
                return element;
            }
            tokio::time::sleep(ELEMENT_POLL).await;
        }
    })
    .await
    .map_err(|_| CrawlError::WaitTimeout(selector))
}
