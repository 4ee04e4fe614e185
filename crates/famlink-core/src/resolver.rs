//! Rule resolution: which rule is active for a given date, and what
//! policy it implies

use chrono::{Datelike, NaiveDate, Weekday};
use famlink_config::{Rule, RuleTable};
use famlink_util::{format_hmm, TimeWindow};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "Ambiguous rules for '{app}' on {weekday}: lines {first_line} and {second_line} both match"
    )]
    AmbiguousRules {
        app: String,
        weekday: Weekday,
        first_line: usize,
        second_line: usize,
    },
}

/// The resolved, authoritative restriction for an app on a given day.
/// Recomputed each run, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AlwaysAllowed,
    Blocked,
    LimitedDaily(Duration),
    /// Limited to a time window. A `None` limit means unlimited while
    /// inside the window (and blocked outside it).
    LimitedWindowed {
        limit: Option<Duration>,
        window: TimeWindow,
    },
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::AlwaysAllowed => write!(f, "always allowed"),
            Policy::Blocked => write!(f, "blocked"),
            Policy::LimitedDaily(d) => write!(f, "limited to {}", format_hmm(*d)),
            Policy::LimitedWindowed {
                limit: Some(d),
                window,
            } => write!(f, "limited to {} within {}", format_hmm(*d), window),
            Policy::LimitedWindowed {
                limit: None,
                window,
            } => write!(f, "allowed within {}", window),
        }
    }
}

/// Resolve the effective policy for every app in the table on the
/// given date. Apps with no rule matching the date's weekday resolve
/// to Blocked (rules are day-scoped).
pub fn resolve(
    table: &RuleTable,
    date: NaiveDate,
) -> Result<BTreeMap<String, Policy>, ResolveError> {
    let weekday = date.weekday();
    let mut policies = BTreeMap::new();

    for app in table.apps() {
        let policy = resolve_app(table.rules_for(app), weekday)?;
        tracing::debug!(app, %weekday, %policy, "Resolved policy");
        policies.insert(app.to_string(), policy);
    }

    Ok(policies)
}

/// Resolve one app's rules against a weekday
fn resolve_app<'a>(
    rules: impl Iterator<Item = &'a Rule>,
    weekday: Weekday,
) -> Result<Policy, ResolveError> {
    let matching: Vec<&Rule> = rules.filter(|r| r.matches(weekday)).collect();

    match matching.as_slice() {
        [] => Ok(Policy::Blocked),
        [rule] => Ok(policy_from_rule(rule)),
        [first, second, ..] => Err(ResolveError::AmbiguousRules {
            app: first.app.clone(),
            weekday,
            first_line: first.line,
            second_line: second.line,
        }),
    }
}

fn policy_from_rule(rule: &Rule) -> Policy {
    // A zero limit blocks the app outright, window or not. This is
    // what the bootstrapped default config relies on.
    if rule.limit == Some(Duration::ZERO) {
        return Policy::Blocked;
    }

    match (rule.limit, rule.window) {
        (None, None) => Policy::AlwaysAllowed,
        (Some(d), None) => Policy::LimitedDaily(d),
        (limit, Some(window)) => Policy::LimitedWindowed { limit, window },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famlink_config::parse_rules;
    use famlink_util::WallClock;

    fn table(csv_rows: &str) -> RuleTable {
        parse_rules(&format!("App,Max Duration,Days,Time Ranges\n{}", csv_rows)).unwrap()
    }

    // 2026-01-07 is a Wednesday, 2026-01-11 a Sunday
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
    }

    #[test]
    fn empty_row_is_always_allowed_every_day() {
        let table = table("Calculator,,,\n");

        for offset in 0..7 {
            let date = wednesday() + chrono::Days::new(offset);
            let policies = resolve(&table, date).unwrap();
            assert_eq!(policies["Calculator"], Policy::AlwaysAllowed);
        }
    }

    #[test]
    fn weekday_weekend_split() {
        let table = table("Youtube,0:10,Mon-Fri,\nYoutube,0:30,Sat-Sun,\n");

        let wed = resolve(&table, wednesday()).unwrap();
        assert_eq!(
            wed["Youtube"],
            Policy::LimitedDaily(Duration::from_secs(600))
        );

        let sun = resolve(&table, sunday()).unwrap();
        assert_eq!(
            sun["Youtube"],
            Policy::LimitedDaily(Duration::from_secs(1800))
        );
    }

    #[test]
    fn windowed_rule_applies_only_on_its_day() {
        let table = table("Fortnite,1:00,Wed,13:00-18:00\n");

        let wed = resolve(&table, wednesday()).unwrap();
        let expected_window = TimeWindow::new(
            WallClock::new(13, 0).unwrap(),
            WallClock::new(18, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(
            wed["Fortnite"],
            Policy::LimitedWindowed {
                limit: Some(Duration::from_secs(3600)),
                window: expected_window,
            }
        );

        // Thursday: no rule matches, day-scoped default-deny
        let thu = resolve(&table, wednesday() + chrono::Days::new(1)).unwrap();
        assert_eq!(thu["Fortnite"], Policy::Blocked);
    }

    #[test]
    fn unlimited_but_windowed() {
        let table = table("Minecraft,,Sat,10:00-20:00\n");

        let sat = resolve(&table, sunday() - chrono::Days::new(1)).unwrap();
        assert!(matches!(
            sat["Minecraft"],
            Policy::LimitedWindowed { limit: None, .. }
        ));
    }

    #[test]
    fn zero_limit_means_blocked() {
        let table = table("Everything,0:00,,\n");

        let policies = resolve(&table, wednesday()).unwrap();
        assert_eq!(policies["Everything"], Policy::Blocked);
    }

    #[test]
    fn ambiguous_rules_detected_at_resolve_time() {
        // Built directly, bypassing config validation
        use famlink_config::Rule;
        use famlink_util::DaysOfWeek;

        let table = RuleTable::new(vec![
            Rule {
                app: "Youtube".into(),
                limit: Some(Duration::from_secs(600)),
                days: DaysOfWeek::WEEKDAYS,
                window: None,
                line: 2,
            },
            Rule {
                app: "Youtube".into(),
                limit: Some(Duration::from_secs(1800)),
                days: DaysOfWeek::ALL_DAYS,
                window: None,
                line: 3,
            },
        ]);

        let result = resolve(&table, wednesday());
        assert!(matches!(
            result,
            Err(ResolveError::AmbiguousRules {
                weekday: Weekday::Wed,
                first_line: 2,
                second_line: 3,
                ..
            })
        ));
    }

    #[test]
    fn disjoint_rules_do_not_conflict_on_sunday() {
        let table = table("Youtube,0:10,Mon-Fri,\nYoutube,0:30,Sat-Sun,\n");
        // Both rules exist, but only one matches any given day
        assert!(resolve(&table, sunday()).is_ok());
    }
}
