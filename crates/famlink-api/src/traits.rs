//! The remote service contract

use async_trait::async_trait;
use famlink_util::TimeWindow;
use std::time::Duration;
use thiserror::Error;

use crate::{AppSummary, RemoteAppState};

/// Errors from remote service operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected response from service: {0}")]
    UnexpectedResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("App not found in remote catalog: {0}")]
    UnknownApp(String),

    #[error("No supervised member found in the family")]
    NoSupervisedMember,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client contract for the Family Link service.
///
/// Implemented over HTTP by famlink-client and in memory by
/// [`MockFamilyLink`](crate::MockFamilyLink) for tests. All operations
/// identify apps by title (case insensitive) or package name.
#[async_trait]
pub trait FamilyLinkApi: Send + Sync {
    /// All apps known to the remote catalog, with their current
    /// supervision state and today's usage
    async fn list_apps(&self) -> ApiResult<Vec<AppSummary>>;

    /// Current state of a single app
    async fn get_state(&self, app: &str) -> ApiResult<RemoteAppState> {
        self.list_apps()
            .await?
            .iter()
            .find(|a| a.matches_name(app))
            .map(AppSummary::remote_state)
            .ok_or_else(|| ApiError::UnknownApp(app.to_string()))
    }

    /// Set a daily usage limit. The window is advisory: the service
    /// only supports daily limits, so callers re-run the tool to
    /// enforce windows (in-window limit, out-of-window block).
    async fn set_limit(
        &self,
        app: &str,
        limit: Duration,
        window: Option<TimeWindow>,
    ) -> ApiResult<()>;

    /// Hide the app on the child's device
    async fn block(&self, app: &str) -> ApiResult<()>;

    /// Mark the app always allowed (exempt from screen time)
    async fn allow(&self, app: &str) -> ApiResult<()>;

    /// Remove a previously set daily limit
    async fn remove_limit(&self, app: &str) -> ApiResult<()>;
}
