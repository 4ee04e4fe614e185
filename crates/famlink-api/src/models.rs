//! Wire models for the Family Link private API
//!
//! Field names mirror the JSON returned by the
//! `kidsmanagement/v1` endpoints; only the parts this client reads are
//! modeled.

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Package prefixes the service manages itself; never auto-blocked
pub const SYSTEM_PACKAGE_PREFIXES: &[&str] = &["com.google", "com.android"];

pub fn is_system_package(package_name: &str) -> bool {
    SYSTEM_PACKAGE_PREFIXES
        .iter()
        .any(|prefix| package_name.starts_with(prefix))
}

/// Response from `people/{id}/appsandusage`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppsAndUsage {
    #[serde(default)]
    pub apps: Vec<App>,

    #[serde(default)]
    pub app_usage_sessions: Vec<AppUsageSession>,
}

impl AppsAndUsage {
    /// Title for a package name, if the catalog knows it
    pub fn app_title(&self, package_name: &str) -> Option<&str> {
        self.apps
            .iter()
            .find(|a| a.package_name == package_name)
            .map(|a| a.title.as_str())
    }

    /// Total usage for a package on the given date
    pub fn usage_on(&self, package_name: &str, date: NaiveDate) -> Duration {
        self.app_usage_sessions
            .iter()
            .filter(|s| s.app_id.android_app_package_name == package_name)
            .filter(|s| s.date.matches(date))
            .map(|s| s.usage_duration())
            .sum()
    }
}

/// One app as reported by the service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub package_name: String,
    pub title: String,

    #[serde(default)]
    pub supervision_setting: SupervisionSetting,
}

impl App {
    /// Derive the supervision state from the raw setting flags
    pub fn state(&self) -> AppState {
        if let Some(limit) = &self.supervision_setting.usage_limit {
            return AppState::Limited(Duration::from_secs(limit.daily_usage_limit_mins * 60));
        }
        if self.supervision_setting.hidden {
            return AppState::Blocked;
        }
        if self
            .supervision_setting
            .always_allowed_app_info
            .as_ref()
            .is_some_and(|info| info.always_allowed_state == AlwaysAllowedState::Enabled)
        {
            return AppState::AlwaysAllowed;
        }
        AppState::Unsupervised
    }
}

/// Supervision settings for an app
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisionSetting {
    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub usage_limit: Option<UsageLimit>,

    #[serde(default)]
    pub always_allowed_app_info: Option<AlwaysAllowedAppInfo>,
}

/// Daily usage limit settings for an app
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimit {
    pub daily_usage_limit_mins: u64,

    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlwaysAllowedAppInfo {
    pub always_allowed_state: AlwaysAllowedState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AlwaysAllowedState {
    #[serde(rename = "alwaysAllowedStateEnabled")]
    Enabled,

    #[serde(other)]
    Unknown,
}

/// One usage session record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUsageSession {
    /// Duration in seconds with decimal places, e.g. "123.456s"
    pub usage: String,

    pub app_id: AppId,

    pub date: UsageDate,
}

impl AppUsageSession {
    pub fn usage_duration(&self) -> Duration {
        self.usage
            .trim_end_matches('s')
            .parse::<f64>()
            .map(Duration::from_secs_f64)
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppId {
    pub android_app_package_name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UsageDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl UsageDate {
    pub fn matches(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.year == date.year() && self.month == date.month() && self.day == date.day()
    }
}

/// Response from `families/mine/members`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersResponse {
    #[serde(default)]
    pub members: Vec<Member>,
}

impl MembersResponse {
    /// First supervised member of the family, if any
    pub fn supervised_member(&self) -> Option<&Member> {
        self.members.iter().find(|m| {
            m.member_supervision_info
                .as_ref()
                .is_some_and(|info| info.is_supervised_member)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,

    #[serde(default)]
    pub member_supervision_info: Option<MemberSupervisionInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSupervisionInfo {
    pub is_supervised_member: bool,
}

/// Current supervision state of an app, as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    AlwaysAllowed,
    Blocked,
    Limited(Duration),
    /// Not managed by the service yet (e.g. a recent install)
    Unsupervised,
}

/// Remote state of one app: supervision status plus today's usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAppState {
    pub state: AppState,
    pub usage_today: Duration,
}

/// One app from the remote catalog with its derived state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSummary {
    pub title: String,
    pub package_name: String,
    pub state: AppState,
    pub usage_today: Duration,
}

impl AppSummary {
    pub fn remote_state(&self) -> RemoteAppState {
        RemoteAppState {
            state: self.state,
            usage_today: self.usage_today,
        }
    }

    /// Case-insensitive match on title or exact match on package name
    pub fn matches_name(&self, name: &str) -> bool {
        self.package_name == name || self.title.eq_ignore_ascii_case(name)
    }
}
