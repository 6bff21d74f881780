mod captcha;
mod extract;
mod normalize;
mod session;

pub(crate) use session::PortalScraper;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::models::Transaction;
use crate::notify::Notifier;
use crate::report;

/// Failure classes of a single scrape attempt. Everything here is treated
/// as transient and retried by the outer loop.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CrawlError {
    #[error("timed out waiting for `{0}`")]
    WaitTimeout(&'static str),
    #[error("captcha image was not served")]
    CaptchaNotServed,
    #[error("captcha service returned no solution")]
    CaptchaUnsolved,
    #[error("captcha service request failed: {0}")]
    CaptchaTransport(#[from] reqwest::Error),
    #[error("captcha service response malformed: {0}")]
    CaptchaResponse(String),
    #[error("report table not present on page")]
    TableMissing,
    #[error("report table had unexpected shape: {0}")]
    TableShape(String),
    #[error(transparent)]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
}

#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    pub(crate) max_attempts: u32,
    pub(crate) retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RunSummary {
    pub(crate) scraped: usize,
    pub(crate) inserted: usize,
}

/// Produces one day's transactions. The production implementation drives a
/// browser through the portal; tests substitute a canned source.
#[async_trait]
pub(crate) trait TransactionSource {
    async fn scrape(&self) -> Result<Vec<Transaction>>;
}

/// Runs the full cycle (scrape → persist → report → mail) up to
/// `policy.max_attempts` times. Each failed attempt sends a failure mail
/// tagged with the attempt number; after the last failure one terminal mail
/// goes out. Failure-mail delivery itself is best-effort: a broken mail
/// channel must never mask the original error.
pub(crate) async fn run_with_retries<S, N>(
    source: &S,
    notifier: &N,
    db: &mut Database,
    policy: &RetryPolicy,
) -> Result<RunSummary>
where
    S: TransactionSource + Sync,
    N: Notifier + Sync,
{
    let mut last_err = None;

    for attempt in 1..=policy.max_attempts {
        info!(attempt, "Starting transaction run");
        match run_attempt(source, notifier, db).await {
            Ok(summary) => {
                info!(
                    attempt,
                    scraped = summary.scraped,
                    inserted = summary.inserted,
                    "Transaction run completed"
                );
                return Ok(summary);
            }
            Err(err) => {
                error!(attempt, error = ?err, "Transaction run failed");
                if let Err(mail_err) = notifier
                    .send_failure(
                        &format!("Error in IOCL Report Process - Attempt {attempt}"),
                        &format!("{err:#}"),
                    )
                    .await
                {
                    warn!(error = ?mail_err, "Failed to send failure mail");
                }
                last_err = Some(err);
                if attempt < policy.max_attempts {
                    info!(delay_secs = policy.retry_delay.as_secs(), "Retrying after delay");
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
        }
    }

    error!("Max retries reached, giving up");
    if let Err(mail_err) = notifier
        .send_failure("Max retries reached", "Process completely failed.")
        .await
    {
        warn!(error = ?mail_err, "Failed to send terminal failure mail");
    }

    Err(last_err.unwrap_or_else(|| anyhow!("no scrape attempts were executed")))
        .context("All scrape attempts failed")
}

async fn run_attempt<S, N>(source: &S, notifier: &N, db: &mut Database) -> Result<RunSummary>
where
    S: TransactionSource + Sync,
    N: Notifier + Sync,
{
    let records = source.scrape().await?;
    let inserted = db
        .insert_transactions_batch(&records)
        .context("Failed to persist scraped transactions")?;

    let report = report::build(db, &records, today_in_portal_tz())
        .context("Failed to build transaction report")?;
    notifier
        .send_report(&report)
        .await
        .context("Failed to send transaction report")?;

    Ok(RunSummary {
        scraped: records.len(),
        inserted,
    })
}

/// The portal reports dates in its own local time.
fn today_in_portal_tz() -> NaiveDate {
    chrono::Utc::now()
        .with_timezone(&chrono_tz::Asia::Kolkata)
        .date_naive()
}
