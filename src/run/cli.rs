use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use crate::companies::CompanyDirectory;
use crate::config::Config;
use crate::crawler::{self, PortalScraper, RetryPolicy};
use crate::db::Database;
use crate::models::MtdAdjustment;
use crate::notify::Mailer;
use crate::report;

/// The portal publishes the day's figures in the evening; the original
/// schedule fires at 21:00 IST.
const RUN_HOUR: u32 = 21;
const PORTAL_TZ: Tz = chrono_tz::Asia::Kolkata;

pub(crate) async fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "run" => cli_run(db).await,
        "schedule" => cli_schedule(db).await,
        "summary" | "s" => cli_summary(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "adjust" => cli_adjust(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("ioclcrawl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("ioclcrawl — IOCL portal crawler with daily benzene reports");
    println!();
    println!("Usage: ioclcrawl <command>");
    println!();
    println!("Commands:");
    println!("  run                           Crawl the portal once, persist and mail the report");
    println!("  schedule                      Run daemonized, crawling daily at 21:00 IST");
    println!("  summary [dd.mm.yyyy]          Print the daily/MTD table from storage");
    println!("  export [path]                 Export stored transactions to CSV");
    println!("    --month <mm.yyyy>           Restrict the export to one month");
    println!("  adjust <year> <month> <company> <qty> [note]");
    println!("                                Set an MTD correction for a company/month");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

async fn cli_run(db: &mut Database) -> Result<()> {
    let config = Config::from_env()?;
    let scraper = PortalScraper::new(&config, CompanyDirectory::builtin());
    let mailer = Mailer::new(&config)?;

    let summary =
        crawler::run_with_retries(&scraper, &mailer, db, &RetryPolicy::default()).await?;
    println!(
        "Scraped {} transactions ({} new)",
        summary.scraped, summary.inserted
    );
    Ok(())
}

async fn cli_schedule(db: &mut Database) -> Result<()> {
    let config = Config::from_env()?;
    let scraper = PortalScraper::new(&config, CompanyDirectory::builtin());
    let mailer = Mailer::new(&config)?;
    let policy = RetryPolicy::default();

    loop {
        let now = Utc::now().with_timezone(&PORTAL_TZ);
        let next = next_run_after(now)?;
        info!(next = %next, "Next scheduled run");
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        info!("Scheduled run starting");
        // Failures were already mailed by the orchestrator; the daemon
        // only logs and waits for the next day.
        match crawler::run_with_retries(&scraper, &mailer, db, &policy).await {
            Ok(summary) => info!(
                scraped = summary.scraped,
                inserted = summary.inserted,
                "Scheduled run completed"
            ),
            Err(err) => error!(error = ?err, "Scheduled run failed"),
        }
    }
}

/// Next 21:00 IST instant strictly after `now`.
fn next_run_after(now: DateTime<Tz>) -> Result<DateTime<Tz>> {
    let mut date = now.date_naive();
    let today_run = at_run_hour(date)?;
    if today_run > now {
        return Ok(today_run);
    }
    date = date.succ_opt().context("Date overflow computing schedule")?;
    at_run_hour(date)
}

fn at_run_hour(date: NaiveDate) -> Result<DateTime<Tz>> {
    date.and_hms_opt(RUN_HOUR, 0, 0)
        .context("Invalid schedule time")?
        .and_local_timezone(PORTAL_TZ)
        .single()
        .context("Ambiguous schedule instant")
}

fn cli_summary(args: &[String], db: &Database) -> Result<()> {
    let date_str = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .unwrap_or_else(|| report::portal_date(Utc::now().with_timezone(&PORTAL_TZ).date_naive()));
    let date = parse_portal_date(&date_str)?;

    let records = db.get_daily_transactions(&date_str)?;
    let month_start = report::portal_date(date.with_day(1).unwrap_or(date));
    let mtd = db.get_mtd_by_company(&month_start, &date_str)?;
    let adjustments = db.get_adjustments(date.year(), date.month())?;
    let rows = report::aggregate(&records, &mtd, &adjustments, date);

    println!("Benzene — {date_str}");
    println!("{}", "─".repeat(44));
    println!("{:<18} {:>12} {:>12}", "Name", "DAILY", "MTD");
    for row in &rows {
        println!(
            "{:<18} {:>12} {:>12}",
            row.name,
            row.daily.round_dp(3),
            row.mtd.round_dp(3)
        );
    }
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let month = args
        .windows(2)
        .find(|w| w[0] == "--month")
        .map(|w| parse_month(&w[1]))
        .transpose()?;

    let label = month
        .map(|(m, y)| format!("{m:02}.{y}"))
        .unwrap_or_else(|| "all".into());
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/iocl-transactions-{label}.csv")
        });

    let count = db.export_to_csv(&output_path, month)?;
    if count == 0 {
        println!("No transactions to export");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

fn cli_adjust(args: &[String], db: &Database) -> Result<()> {
    if args.len() < 4 {
        anyhow::bail!("Usage: ioclcrawl adjust <year> <month> <company> <qty> [note]");
    }
    let adjustment = MtdAdjustment {
        year: args[0].parse().context("year must be a number")?,
        month: args[1].parse().context("month must be 1-12")?,
        company_name: args[2].clone(),
        qty: Decimal::from_str(&args[3]).context("qty must be a decimal quantity")?,
        note: args.get(4).cloned().unwrap_or_default(),
    };
    if !(1..=12).contains(&adjustment.month) {
        anyhow::bail!("month must be 1-12");
    }

    db.upsert_adjustment(&adjustment)?;
    println!(
        "Adjustment saved: {} {:02}.{} {}",
        adjustment.company_name, adjustment.month, adjustment.year, adjustment.qty
    );
    Ok(())
}

fn parse_portal_date(raw: &str) -> Result<NaiveDate> {
    let pattern = Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").context("Invalid date pattern")?;
    if !pattern.is_match(raw) {
        anyhow::bail!("Date must be dd.mm.yyyy, got `{raw}`");
    }
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").with_context(|| format!("Invalid date `{raw}`"))
}

fn parse_month(raw: &str) -> Result<(u32, i32)> {
    let pattern = Regex::new(r"^(\d{2})\.(\d{4})$").context("Invalid month pattern")?;
    let captures = pattern
        .captures(raw)
        .with_context(|| format!("Month must be mm.yyyy, got `{raw}`"))?;
    let month: u32 = captures[1].parse().context("Invalid month number")?;
    let year: i32 = captures[2].parse().context("Invalid year number")?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be 1-12, got {month}");
    }
    Ok((month, year))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
