use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::Config;
use crate::report::Report;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Outbound mail channel. The orchestrator treats `send_report` failures as
/// fatal to the attempt and `send_failure` results as best-effort.
#[async_trait]
pub(crate) trait Notifier {
    async fn send_report(&self, report: &Report) -> Result<()>;
    async fn send_failure(&self, subject: &str, detail: &str) -> Result<()>;
}

pub(crate) struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("Failed to create SMTP transport")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config
                .report_from
                .parse()
                .with_context(|| format!("Invalid sender address: {}", config.report_from))?,
            to: config
                .report_recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", config.report_recipient))?,
        })
    }
}

#[async_trait]
impl Notifier for Mailer {
    async fn send_report(&self, report: &Report) -> Result<()> {
        let filename = format!("IOCL Transaction Report-{}.xlsx", report.date_label);
        let attachment_type =
            ContentType::parse(XLSX_MIME).map_err(|err| anyhow!("Invalid MIME type: {err}"))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("IOCL Transaction Report {}", report.date_label))
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(report.html.clone()),
                    )
                    .singlepart(Attachment::new(filename).body(
                        report.workbook.clone(),
                        attachment_type,
                    )),
            )
            .context("Failed to build report e-mail")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send report e-mail")?;
        info!("Daily transaction report e-mail sent");
        Ok(())
    }

    async fn send_failure(&self, subject: &str, detail: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(detail.to_string())
            .context("Failed to build failure e-mail")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send failure e-mail")?;
        info!(subject, "Failure notification e-mail sent");
        Ok(())
    }
}
