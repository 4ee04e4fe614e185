//! Reconciliation: diff resolved policies against remote state and
//! issue the minimal set of corrective actions

use chrono::{DateTime, Local};
use famlink_api::{
    is_system_package, ApiError, AppState, AppSummary, FamilyLinkApi,
};
use famlink_util::{as_minutes, format_hmm, TimeWindow};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::Policy;

/// What the remote state should be for an app at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DesiredState {
    AlwaysAllowed,
    Blocked,
    Limited(Duration),
}

/// Collapse a policy to the state desired right now. Windowed policies
/// apply inside their window and block outside it.
fn desired_at(policy: Policy, now: &DateTime<Local>) -> (DesiredState, Option<TimeWindow>) {
    match policy {
        Policy::AlwaysAllowed => (DesiredState::AlwaysAllowed, None),
        Policy::Blocked => (DesiredState::Blocked, None),
        Policy::LimitedDaily(d) => (DesiredState::Limited(d), None),
        Policy::LimitedWindowed { limit, window } => {
            if window.contains(now.time()) {
                let desired = match limit {
                    Some(d) => DesiredState::Limited(d),
                    None => DesiredState::AlwaysAllowed,
                };
                (desired, Some(window))
            } else {
                (DesiredState::Blocked, Some(window))
            }
        }
    }
}

/// A corrective action for one app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetLimit {
        limit: Duration,
        window: Option<TimeWindow>,
    },
    Block,
    Allow,
}

/// One planned action with its context for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    /// App title, as shown to the user and sent to the client
    pub app: String,
    pub action: Action,
    pub previous: AppState,
}

/// The minimal action list for one evaluation pass
#[derive(Debug, Default)]
pub struct Plan {
    pub actions: Vec<PlannedAction>,

    /// Apps whose remote state already matches the resolved policy
    pub in_sync: usize,

    /// System packages left to the service's own management
    pub unmanaged: usize,

    /// Apps named in the rule table but absent from the remote catalog
    pub missing: Vec<String>,
}

/// Compare resolved policies with the remote catalog and compute the
/// action list. Apps known to the remote catalog but absent from the
/// rule table are blocked (default-deny), except system packages.
pub fn plan(
    policies: &BTreeMap<String, Policy>,
    catalog: &[AppSummary],
    now: &DateTime<Local>,
) -> Plan {
    let mut plan = Plan::default();

    for summary in catalog {
        let policy = policies
            .iter()
            .find(|(name, _)| summary.matches_name(name))
            .map(|(_, p)| *p);

        let (desired, window) = match policy {
            Some(p) => desired_at(p, now),
            None => {
                if is_system_package(&summary.package_name) {
                    debug!(app = %summary.title, "System package, leaving unmanaged");
                    plan.unmanaged += 1;
                    continue;
                }
                (DesiredState::Blocked, None)
            }
        };

        match diff(desired, summary.state, window) {
            Some(action) => plan.actions.push(PlannedAction {
                app: summary.title.clone(),
                action,
                previous: summary.state,
            }),
            None => {
                debug!(app = %summary.title, "Already at expected state");
                plan.in_sync += 1;
            }
        }
    }

    for app in policies.keys() {
        if !catalog.iter().any(|s| s.matches_name(app)) {
            plan.missing.push(app.clone());
        }
    }

    plan
}

fn diff(desired: DesiredState, current: AppState, window: Option<TimeWindow>) -> Option<Action> {
    match (desired, current) {
        (DesiredState::AlwaysAllowed, AppState::AlwaysAllowed) => None,
        (DesiredState::Blocked, AppState::Blocked) => None,
        (DesiredState::Limited(want), AppState::Limited(have)) if want == have => None,
        (DesiredState::AlwaysAllowed, _) => Some(Action::Allow),
        (DesiredState::Blocked, _) => Some(Action::Block),
        (DesiredState::Limited(limit), _) => Some(Action::SetLimit { limit, window }),
    }
}

/// Result of applying (or simulating) a plan
#[derive(Debug)]
pub struct Outcome {
    pub applied: usize,
    pub skipped: usize,
    pub failed: Vec<(String, ApiError)>,
    pub dry_run: bool,
}

impl Outcome {
    /// True when no per-app action failed and no configured app was
    /// missing from the catalog
    pub fn ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Issue each planned action independently. A failure on one app is
/// recorded and the remaining apps are still processed; nothing here
/// is transactional. In dry-run mode actions are reported, not issued.
pub async fn apply(plan: &Plan, client: &dyn FamilyLinkApi, dry_run: bool) -> Outcome {
    let mut outcome = Outcome {
        applied: 0,
        skipped: plan.in_sync,
        failed: Vec::new(),
        dry_run,
    };

    for planned in &plan.actions {
        let PlannedAction { app, action, previous } = planned;

        let result = match action {
            Action::SetLimit { limit, window } => {
                let window_str = window.map(|w| w.to_string()).unwrap_or_default();
                info!(
                    app = %app,
                    limit_mins = as_minutes(*limit),
                    window = %window_str,
                    previous = ?previous,
                    dry_run,
                    "Setting limit to {}",
                    format_hmm(*limit)
                );
                if dry_run {
                    Ok(())
                } else {
                    client.set_limit(app, *limit, *window).await
                }
            }
            Action::Allow => {
                info!(app = %app, previous = ?previous, dry_run, "Setting to always allowed");
                if dry_run {
                    Ok(())
                } else {
                    client.allow(app).await
                }
            }
            Action::Block => {
                info!(app = %app, previous = ?previous, dry_run, "Blocking");
                if dry_run {
                    Ok(())
                } else {
                    client.block(app).await
                }
            }
        };

        match result {
            Ok(()) => outcome.applied += 1,
            Err(e) => {
                warn!(app = %app, error = %e, "Action failed, continuing with remaining apps");
                outcome.failed.push((app.clone(), e));
            }
        }
    }

    for app in &plan.missing {
        warn!(app = %app, "Configured app not found in remote catalog");
        outcome
            .failed
            .push((app.clone(), ApiError::UnknownApp(app.clone())));
    }

    outcome
}
