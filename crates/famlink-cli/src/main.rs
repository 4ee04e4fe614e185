//! famlink - reconcile a CSV rule table against Google Family Link
//!
//! One run is one reconciliation pass:
//! - Load and validate the rule table
//! - Fetch the remote app catalog
//! - Resolve the effective policy per app for today
//! - Diff against the remote state and issue corrective actions
//!
//! Run it from cron (or a timer) around window edges; the service only
//! supports daily limits, so time windows are enforced by re-running.

use anyhow::{Context, Result};
use clap::Parser;
use famlink_api::{is_system_package, AppState, AppSummary, FamilyLinkApi};
use famlink_client::FamilyLink;
use famlink_config::{default_table_csv, load_rules};
use famlink_util::{format_hmm, format_hms};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// famlink - enforce a CSV screen time policy through Google Family Link
#[derive(Parser, Debug)]
#[command(name = "famlink")]
#[command(about = "Enforce a CSV screen time policy through Google Family Link", long_about = None)]
struct Args {
    /// Rule table path; bootstrapped from the remote catalog if missing
    #[arg(default_value = "config.csv")]
    config: PathBuf,

    /// Report planned actions without issuing them
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Netscape-format cookie file exported from a logged-in browser
    #[arg(long, default_value = "cookies.txt")]
    cookie_file: PathBuf,

    /// Print today's per-app usage instead of reconciling
    #[arg(long)]
    usage: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "famlink starting");

    let client = FamilyLink::from_cookie_file(&args.cookie_file)
        .with_context(|| format!("Failed to load cookies from {:?}", args.cookie_file))?;

    let catalog = client
        .list_apps()
        .await
        .context("Failed to fetch the app catalog")?;

    if args.usage {
        print_usage_report(&catalog);
        return Ok(());
    }

    if !args.config.exists() {
        bootstrap_config(&args.config, &catalog)?;
        return Ok(());
    }

    let table = load_rules(&args.config)
        .with_context(|| format!("Failed to load rules from {:?}", args.config))?;

    info!(
        config_path = %args.config.display(),
        apps = table.apps().len(),
        rules = table.len(),
        "Rule table loaded"
    );

    let now = famlink_util::now();
    let policies = famlink_core::resolve(&table, now.date_naive())?;
    let plan = famlink_core::plan(&policies, &catalog, &now);

    info!(
        actions = plan.actions.len(),
        in_sync = plan.in_sync,
        unmanaged = plan.unmanaged,
        missing = plan.missing.len(),
        dry_run = args.dry_run,
        "Plan computed"
    );

    let outcome = famlink_core::apply(&plan, &client, args.dry_run).await;

    if !outcome.ok() {
        for (app, error) in &outcome.failed {
            warn!(app = %app, error = %error, "Not reconciled");
        }
        anyhow::bail!(
            "{} of {} apps failed to reconcile",
            outcome.failed.len(),
            outcome.applied + outcome.failed.len()
        );
    }

    info!(
        applied = outcome.applied,
        skipped = outcome.skipped,
        dry_run = outcome.dry_run,
        "Reconciliation complete"
    );
    Ok(())
}

/// Write a starter rule table that blocks every non-system app the
/// catalog knows, for the parent to relax by hand
fn bootstrap_config(path: &Path, catalog: &[AppSummary]) -> Result<()> {
    let apps: Vec<&str> = catalog
        .iter()
        .filter(|a| !is_system_package(&a.package_name))
        .map(|a| a.title.as_str())
        .collect();

    let app_count = apps.len();
    let csv = default_table_csv(apps);
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write default config to {:?}", path))?;

    info!(
        config_path = %path.display(),
        apps = app_count,
        "Wrote default config; edit it and re-run"
    );
    println!(
        "Wrote a default rule table to {} (all apps blocked).",
        path.display()
    );
    println!("Edit it to set limits, then re-run famlink.");
    Ok(())
}

fn print_usage_report(catalog: &[AppSummary]) {
    let mut apps: Vec<&AppSummary> = catalog.iter().collect();
    apps.sort_by(|a, b| b.usage_today.cmp(&a.usage_today).then(a.title.cmp(&b.title)));

    println!("{:>8}  {:<18}  App", "Today", "State");
    for app in apps {
        println!(
            "{:>8}  {:<18}  {}",
            format_hms(app.usage_today),
            state_str(app.state),
            app.title
        );
    }
}

fn state_str(state: AppState) -> String {
    match state {
        AppState::AlwaysAllowed => "always allowed".to_string(),
        AppState::Blocked => "blocked".to_string(),
        AppState::Limited(d) => format!("limited {}", format_hmm(d)),
        AppState::Unsupervised => "unsupervised".to_string(),
    }
}
