//! Integration tests for famlink
//!
//! These tests run the full pipeline (CSV rules -> resolution ->
//! planning -> apply) against the in-memory client.

use chrono::{Local, TimeZone};
use famlink_api::{AppState, FamilyLinkApi, MockFamilyLink, RecordedAction};
use famlink_config::parse_rules;
use famlink_core::{apply, plan, resolve, Policy};
use std::time::Duration;

const RULES: &str = "\
App,Max Duration,Days,Time Ranges
Calculator,,,
Youtube,0:10,Mon-Fri,
Youtube,0:30,Sat-Sun,
Fortnite,1:00,Wed,13:00-18:00
";

fn mock() -> MockFamilyLink {
    MockFamilyLink::new()
        .with_app("Calculator", "com.calc", AppState::Unsupervised, Duration::ZERO)
        .with_app("Youtube", "com.youtube", AppState::Unsupervised, Duration::ZERO)
        .with_app("Fortnite", "com.fortnite", AppState::Unsupervised, Duration::ZERO)
        .with_app("New Game", "com.newgame", AppState::Unsupervised, Duration::ZERO)
        .with_app("Phone", "com.google.android.dialer", AppState::Unsupervised, Duration::ZERO)
}

// 2026-01-07 is a Wednesday
fn wednesday_at(hour: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 7, hour, 0, 0).unwrap()
}

#[tokio::test]
async fn full_pass_converges_in_one_run() {
    let client = mock();
    let table = parse_rules(RULES).unwrap();

    let now = wednesday_at(14);
    let policies = resolve(&table, now.date_naive()).unwrap();

    // Wednesday 14:00: Calculator always allowed, Youtube 0:10,
    // Fortnite in-window 1:00, New Game unconfigured and blocked,
    // Phone is a system package and left alone
    let catalog = client.list_apps().await.unwrap();
    let p = plan(&policies, &catalog, &now);
    assert_eq!(p.actions.len(), 4);
    assert_eq!(p.unmanaged, 1);

    let outcome = apply(&p, &client, false).await;
    assert!(outcome.ok());
    assert_eq!(outcome.applied, 4);

    // The remote state now matches the policy; a second pass is a no-op
    let catalog = client.list_apps().await.unwrap();
    let p = plan(&policies, &catalog, &now);
    assert!(p.actions.is_empty());
    assert_eq!(p.in_sync, 4);
}

#[tokio::test]
async fn window_closes_between_runs() {
    let client = mock();
    let table = parse_rules(RULES).unwrap();
    let policies = resolve(&table, wednesday_at(14).date_naive()).unwrap();

    // In-window pass sets Fortnite's limit
    let catalog = client.list_apps().await.unwrap();
    let p = plan(&policies, &catalog, &wednesday_at(14));
    apply(&p, &client, false).await;

    let fortnite = client.get_state("Fortnite").await.unwrap();
    assert_eq!(fortnite.state, AppState::Limited(Duration::from_secs(3600)));

    // A later pass, after 18:00, blocks it again
    let catalog = client.list_apps().await.unwrap();
    let p = plan(&policies, &catalog, &wednesday_at(19));
    let outcome = apply(&p, &client, false).await;
    assert!(outcome.ok());

    let fortnite = client.get_state("Fortnite").await.unwrap();
    assert_eq!(fortnite.state, AppState::Blocked);
}

#[tokio::test]
async fn dry_run_changes_nothing_remotely() {
    let client = mock();
    let table = parse_rules(RULES).unwrap();

    let now = wednesday_at(14);
    let policies = resolve(&table, now.date_naive()).unwrap();
    let catalog = client.list_apps().await.unwrap();

    let p = plan(&policies, &catalog, &now);
    let outcome = apply(&p, &client, true).await;

    assert!(outcome.dry_run);
    assert!(outcome.ok());
    assert!(client.recorded_actions().is_empty());

    let youtube = client.get_state("Youtube").await.unwrap();
    assert_eq!(youtube.state, AppState::Unsupervised);
}

#[tokio::test]
async fn day_scoped_rules_block_off_days() {
    let client = mock();
    let table = parse_rules(RULES).unwrap();

    // Thursday: Fortnite's Wednesday rule does not match
    let thursday = Local.with_ymd_and_hms(2026, 1, 8, 14, 0, 0).unwrap();
    let policies = resolve(&table, thursday.date_naive()).unwrap();
    assert_eq!(policies["Fortnite"], Policy::Blocked);

    let catalog = client.list_apps().await.unwrap();
    let p = plan(&policies, &catalog, &thursday);
    apply(&p, &client, false).await;

    assert!(client
        .recorded_actions()
        .iter()
        .any(|a| matches!(a, RecordedAction::Block(app) if app == "Fortnite")));
}

#[tokio::test]
async fn partial_failure_still_reconciles_the_rest() {
    let client = mock();
    client.fail_for("Youtube");

    let table = parse_rules(RULES).unwrap();
    let now = wednesday_at(14);
    let policies = resolve(&table, now.date_naive()).unwrap();
    let catalog = client.list_apps().await.unwrap();

    let p = plan(&policies, &catalog, &now);
    let outcome = apply(&p, &client, false).await;

    assert!(!outcome.ok());
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, "Youtube");
    assert_eq!(outcome.applied, 3);

    // The other apps did get their state
    let calc = client.get_state("Calculator").await.unwrap();
    assert_eq!(calc.state, AppState::AlwaysAllowed);
}

#[tokio::test]
async fn configured_app_missing_from_catalog_fails_the_run() {
    let client = MockFamilyLink::new().with_app(
        "Youtube",
        "com.youtube",
        AppState::Unsupervised,
        Duration::ZERO,
    );

    let table = parse_rules(
        "App,Max Duration,Days,Time Ranges\nYoutube,0:10,,\nGhost,1:00,,\n",
    )
    .unwrap();

    let now = wednesday_at(14);
    let policies = resolve(&table, now.date_naive()).unwrap();
    let catalog = client.list_apps().await.unwrap();

    let p = plan(&policies, &catalog, &now);
    assert_eq!(p.missing, vec!["Ghost".to_string()]);

    let outcome = apply(&p, &client, false).await;
    assert!(!outcome.ok());
}
