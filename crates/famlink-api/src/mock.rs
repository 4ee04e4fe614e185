//! Mock Family Link client for testing

use async_trait::async_trait;
use famlink_util::TimeWindow;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use crate::{ApiError, ApiResult, AppState, AppSummary, FamilyLinkApi};

/// An action the mock client was asked to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    SetLimit {
        app: String,
        limit: Duration,
        window: Option<TimeWindow>,
    },
    Block(String),
    Allow(String),
    RemoveLimit(String),
}

/// In-memory Family Link client for unit/integration testing.
///
/// Actions mutate the stored catalog, so a second reconciliation pass
/// against the mock observes the applied state.
#[derive(Default)]
pub struct MockFamilyLink {
    apps: Mutex<Vec<AppSummary>>,
    actions: Mutex<Vec<RecordedAction>>,

    /// App names whose mutations fail, for error-path tests
    fail_apps: Mutex<HashSet<String>>,

    /// When set, list_apps fails
    fail_list: Mutex<bool>,
}

impl MockFamilyLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(
        self,
        title: &str,
        package_name: &str,
        state: AppState,
        usage_today: Duration,
    ) -> Self {
        self.apps.lock().unwrap().push(AppSummary {
            title: title.to_string(),
            package_name: package_name.to_string(),
            state,
            usage_today,
        });
        self
    }

    /// Make every mutation for this app fail
    pub fn fail_for(&self, app: &str) {
        self.fail_apps.lock().unwrap().insert(app.to_lowercase());
    }

    /// Make list_apps fail
    pub fn fail_list(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    pub fn recorded_actions(&self) -> Vec<RecordedAction> {
        self.actions.lock().unwrap().clone()
    }

    fn mutate(&self, app: &str, action: RecordedAction, new_state: AppState) -> ApiResult<()> {
        if self.fail_apps.lock().unwrap().contains(&app.to_lowercase()) {
            return Err(ApiError::Http(format!("injected failure for '{}'", app)));
        }

        let mut apps = self.apps.lock().unwrap();
        let entry = apps
            .iter_mut()
            .find(|a| a.matches_name(app))
            .ok_or_else(|| ApiError::UnknownApp(app.to_string()))?;
        entry.state = new_state;

        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

#[async_trait]
impl FamilyLinkApi for MockFamilyLink {
    async fn list_apps(&self) -> ApiResult<Vec<AppSummary>> {
        if *self.fail_list.lock().unwrap() {
            return Err(ApiError::Http("injected list failure".into()));
        }
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn set_limit(
        &self,
        app: &str,
        limit: Duration,
        window: Option<TimeWindow>,
    ) -> ApiResult<()> {
        self.mutate(
            app,
            RecordedAction::SetLimit {
                app: app.to_string(),
                limit,
                window,
            },
            AppState::Limited(limit),
        )
    }

    async fn block(&self, app: &str) -> ApiResult<()> {
        self.mutate(app, RecordedAction::Block(app.to_string()), AppState::Blocked)
    }

    async fn allow(&self, app: &str) -> ApiResult<()> {
        self.mutate(
            app,
            RecordedAction::Allow(app.to_string()),
            AppState::AlwaysAllowed,
        )
    }

    async fn remove_limit(&self, app: &str) -> ApiResult<()> {
        self.mutate(
            app,
            RecordedAction::RemoveLimit(app.to_string()),
            AppState::Unsupervised,
        )
    }
}
