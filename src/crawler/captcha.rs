use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use super::CrawlError;

const MAX_POLL_ATTEMPTS: u32 = 3;
const BASE_POLL_DELAY: Duration = Duration::from_secs(1);

/// Client for the external text-captcha solving service.
///
/// Protocol: submit the image and receive an opaque job id, then poll the
/// status endpoint a bounded number of times with linearly growing delays.
/// Exhausting the polls is a first-class "no solution" outcome (`Ok(None)`),
/// distinct from transport or response-shape failures.
pub(crate) struct CaptchaSolver {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CaptchaSolver {
    pub(crate) fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    pub(crate) async fn solve(&self, image: &[u8]) -> Result<Option<String>, CrawlError> {
        info!("Starting captcha solving process");
        let job_id = self.submit(image).await?;
        info!(%job_id, "Captcha job submitted");
        self.poll(&job_id).await
    }

    async fn submit(&self, image: &[u8]) -> Result<String, CrawlError> {
        let mut body = json!({
            "type": "textcaptcha",
            "image_data": [STANDARD.encode(image)],
        });
        if let Some(key) = &self.api_key {
            body["key"] = json!(key);
        }

        let response: Value = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        parse_submit_response(&response)
    }

    async fn poll(&self, job_id: &str) -> Result<Option<String>, CrawlError> {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(poll_delay(BASE_POLL_DELAY, attempt)).await;

            let mut request = self.client.get(&self.endpoint).query(&[("id", job_id)]);
            if let Some(key) = &self.api_key {
                request = request.query(&[("key", key)]);
            }
            let response: Value = request.send().await?.json().await?;

            match parse_poll_response(&response) {
                PollOutcome::Solved(solution) => {
                    info!("Captcha solved");
                    return Ok(Some(solution));
                }
                PollOutcome::ServiceError(detail) => {
                    warn!(attempt, %detail, "Captcha poll returned an error");
                }
                PollOutcome::Pending => {}
            }
        }

        warn!("Captcha not solved after {MAX_POLL_ATTEMPTS} polls");
        Ok(None)
    }
}

/// Delay before poll N grows linearly with N.
pub(super) fn poll_delay(base: Duration, attempt: u32) -> Duration {
    base * attempt
}

pub(super) fn parse_submit_response(response: &Value) -> Result<String, CrawlError> {
    response
        .get("data")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| CrawlError::CaptchaResponse(format!("no job id in {response}")))
}

#[derive(Debug, PartialEq)]
pub(super) enum PollOutcome {
    Solved(String),
    Pending,
    ServiceError(String),
}

pub(super) fn parse_poll_response(response: &Value) -> PollOutcome {
    if let Some(err) = response.get("error") {
        return PollOutcome::ServiceError(err.to_string());
    }
    match response
        .get("data")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
    {
        Some(solution) => PollOutcome::Solved(solution.to_owned()),
        None => PollOutcome::Pending,
    }
}

#[cfg(test)]
#[path = "captcha_tests.rs"]
mod tests;
