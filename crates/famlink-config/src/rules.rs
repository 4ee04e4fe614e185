//! Validated rule table

use crate::validation::ParsedRule;
use chrono::Weekday;
use famlink_util::{DaysOfWeek, TimeWindow};
use std::time::Duration;

/// One validated policy rule: an app bound to a duration limit, a day
/// set, and an optional time window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub app: String,

    /// Daily limit. None means unlimited (under the matched window).
    /// A zero limit means the app is blocked on the matched days.
    pub limit: Option<Duration>,

    pub days: DaysOfWeek,

    /// None means the rule applies all day
    pub window: Option<TimeWindow>,

    /// Source line in the config file, for diagnostics
    pub line: usize,
}

impl Rule {
    pub fn matches(&self, weekday: Weekday) -> bool {
        self.days.contains(weekday)
    }
}

impl From<ParsedRule> for Rule {
    fn from(parsed: ParsedRule) -> Self {
        Self {
            app: parsed.app,
            limit: parsed.limit,
            days: parsed.days,
            window: parsed.window,
            line: parsed.line,
        }
    }
}

/// Ordered collection of rules loaded from the config file
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Distinct app names, in first-appearance order
    pub fn apps(&self) -> Vec<&str> {
        let mut apps: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !apps.iter().any(|a| a.eq_ignore_ascii_case(&rule.app)) {
                apps.push(&rule.app);
            }
        }
        apps
    }

    /// All rules for the given app (case insensitive)
    pub fn rules_for<'a>(&'a self, app: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.app.eq_ignore_ascii_case(app))
    }

    /// True if any rule names this app
    pub fn contains_app(&self, app: &str) -> bool {
        self.rules_for(app).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(app: &str, days: DaysOfWeek, line: usize) -> Rule {
        Rule {
            app: app.into(),
            limit: None,
            days,
            window: None,
            line,
        }
    }

    #[test]
    fn apps_are_deduplicated_case_insensitively() {
        let table = RuleTable::new(vec![
            rule("Youtube", DaysOfWeek::WEEKDAYS, 2),
            rule("youtube", DaysOfWeek::WEEKENDS, 3),
            rule("Minecraft", DaysOfWeek::ALL_DAYS, 4),
        ]);

        assert_eq!(table.apps(), vec!["Youtube", "Minecraft"]);
        assert_eq!(table.rules_for("YOUTUBE").count(), 2);
        assert!(table.contains_app("minecraft"));
        assert!(!table.contains_app("Fortnite"));
    }

    #[test]
    fn rule_matches_weekday() {
        let r = rule("Youtube", DaysOfWeek::WEEKDAYS, 2);
        assert!(r.matches(Weekday::Wed));
        assert!(!r.matches(Weekday::Sun));
    }
}
