use anyhow::Result;
use chrono::Local;
use std::path::Path;

use crate::aggregate;
use crate::config::Config;
use crate::db::Database;
use crate::report::{self, RenderOutcome};
use crate::telegram::BotClient;

pub(crate) fn dispatch(args: &[String]) -> Result<()> {
    match args[1].as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            return Ok(());
        }
        "--version" | "-V" | "version" => {
            println!("ledgergram {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Configuration and the bot client are built up front so a missing
    // setting fails before any work happens, not at first use.
    let config = Config::from_env()?;
    let bot = BotClient::new(&config)?;

    match args[1].as_str() {
        "monthly" => run_monthly(&config, &bot),
        "compare" => run_compare(&config, &bot),
        "breakdown" => run_breakdown(&config, &bot),
        "weekly" => run_weekly(&config, &bot),
        "export" => run_export(&config, &bot),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("ledgergram — personal finance reports from a local SQLite ledger");
    println!();
    println!("Usage: ledgergram <command>");
    println!();
    println!("Commands:");
    println!("  monthly                       Multi-sheet Excel report over all months");
    println!("  compare                       This month vs last month stacked chart");
    println!("  breakdown                     Last 7 days expense breakdown (donut + table)");
    println!("  weekly                        Last 7 days daily expense line with threshold");
    println!("  export                        Full transactions CSV export");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Configuration via environment (or .env): DB_PATH, API_TOKEN, ALLOWED_USER_ID");
}

// ── Commands ─────────────────────────────────────────────────

fn run_monthly(config: &Config, bot: &BotClient) -> Result<()> {
    // The store connection is scoped to the read; rendering and delivery
    // never hold it.
    let (records, variant) = {
        let db = Database::open(&config.db_path)?;
        let variant = db.schema_variant()?;
        (db.fetch_transactions(variant)?, variant)
    };

    let agg = aggregate::aggregate(&records)?;
    let today = Local::now().date_naive();
    let outcome =
        report::render_monthly_workbook(&agg, variant, today, Path::new(report::MONTHLY_REPORT_FILE))?;

    match outcome {
        RenderOutcome::NoData => {
            println!("No transactions to report");
            Ok(())
        }
        RenderOutcome::Rendered(path) => deliver(bot, &path, "", Attachment::Document),
    }
}

fn run_compare(config: &Config, bot: &BotClient) -> Result<()> {
    let today = Local::now().date_naive();
    let (current_window, prior_window, compare_days) = report::month_compare(today);

    let (current_rows, prior_rows) = {
        let db = Database::open(&config.db_path)?;
        (
            db.expense_by_day_and_category(
                &current_window.start_param(),
                &current_window.end_param(),
            )?,
            db.expense_by_day_and_category(
                &prior_window.start_param(),
                &prior_window.end_param(),
            )?,
        )
    };

    let series = aggregate::build_day_series(&current_rows, &prior_rows, compare_days);
    match report::render_compare(&series, Path::new(report::COMPARE_REPORT_FILE))? {
        RenderOutcome::NoData => {
            println!("No data found");
            Ok(())
        }
        RenderOutcome::Rendered(path) => deliver(
            bot,
            &path,
            "📊 This month vs last month spending",
            Attachment::Photo,
        ),
    }
}

fn run_breakdown(config: &Config, bot: &BotClient) -> Result<()> {
    let window = report::trailing_week(Local::now().naive_local());

    let rows = {
        let db = Database::open(&config.db_path)?;
        db.expense_by_category(&window.start_param(), &window.end_param())?
    };

    match report::render_breakdown(&rows, Path::new(report::BREAKDOWN_REPORT_FILE))? {
        RenderOutcome::NoData => {
            println!("No expense data for the last 7 days");
            Ok(())
        }
        RenderOutcome::Rendered(path) => deliver(
            bot,
            &path,
            "📊 Expenses in the Last 7 Days",
            Attachment::Photo,
        ),
    }
}

fn run_weekly(config: &Config, bot: &BotClient) -> Result<()> {
    let dates = report::last_seven_days(Local::now().date_naive());

    let rows = {
        let db = Database::open(&config.db_path)?;
        db.expense_by_date(&dates[0], &dates[6])?
    };

    let values = aggregate::fill_daily_totals(&rows, &dates);
    match report::render_weekly_line(&dates, &values, Path::new(report::WEEKLY_REPORT_FILE))? {
        RenderOutcome::NoData => {
            println!("No expense data for the last 7 days");
            Ok(())
        }
        RenderOutcome::Rendered(path) => deliver(
            bot,
            &path,
            "📊 Your weekly expense report (last 7 days)",
            Attachment::Photo,
        ),
    }
}

fn run_export(config: &Config, bot: &BotClient) -> Result<()> {
    let (records, variant) = {
        let db = Database::open(&config.db_path)?;
        let variant = db.schema_variant()?;
        (db.fetch_transactions(variant)?, variant)
    };

    match report::render_csv_export(&records, variant, Path::new(report::EXPORT_FILE))? {
        RenderOutcome::NoData => {
            println!("No transactions to export");
            Ok(())
        }
        RenderOutcome::Rendered(path) => {
            deliver(bot, &path, "Transactions export (CSV)", Attachment::Document)
        }
    }
}

// ── Delivery & cleanup ───────────────────────────────────────

enum Attachment {
    Document,
    Photo,
}

/// One delivery attempt, then unconditional cleanup. A failed upload is
/// reported and swallowed; the artifact is removed either way.
fn deliver(bot: &BotClient, path: &Path, caption: &str, attachment: Attachment) -> Result<()> {
    let sent = match attachment {
        Attachment::Document => bot.send_document(path, caption),
        Attachment::Photo => bot.send_photo(path, caption),
    };

    match sent {
        Ok(()) => println!("Sent {} to Telegram", path.display()),
        Err(e) => println!("Failed to send {} to Telegram: {e:#}", path.display()),
    }

    remove_artifact(path);
    Ok(())
}

fn remove_artifact(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        println!("Failed to remove {}: {e}", path.display());
    }
}
