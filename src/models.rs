use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a report. Anything the store holds that is not the
/// literal string "resolved" (including an unset column) reads as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
}

impl ReportStatus {
    pub fn parse(value: Option<&str>) -> ReportStatus {
        match value {
            Some("resolved") => ReportStatus::Resolved,
            _ => ReportStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn toggled(&self) -> ReportStatus {
        match self {
            ReportStatus::Pending => ReportStatus::Resolved,
            ReportStatus::Resolved => ReportStatus::Pending,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-submitted report, as materialized from a store snapshot. The id
/// is the store-assigned key and is stable for the record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub created_at: i64,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub matter_type: String,
    pub name: String,
    pub user_id: String,
    pub status: ReportStatus,
    pub resolved_at: Option<i64>,
    pub response: Option<String>,
}

/// The three fields the resolve toggle overwrites. Built up front so the
/// write is a blind overwrite with no prior read of the row.
#[derive(Debug, Clone)]
pub struct ReportPatch {
    pub status: ReportStatus,
    pub response: String,
    pub resolved_at: i64,
}

impl ReportPatch {
    /// Flip from the caller-supplied current status and stamp the resolution
    /// time to now. The stamp lands on revert to pending as well.
    pub fn for_toggle(current: ReportStatus, response: Option<&str>) -> ReportPatch {
        ReportPatch {
            status: current.toggled(),
            response: response.unwrap_or("").to_string(),
            resolved_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Derived counters. The three values come from independent subscriptions
/// and are never forced consistent as a triple.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Stats {
    pub total_users: i64,
    pub total_reports: i64,
    pub resolved_reports: i64,
}

/// Per-submitter grouping over Community reports. Recomputed from scratch
/// on every snapshot, never merged incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityAggregate {
    pub name: String,
    pub reports: usize,
    pub messages: Vec<String>,
}

/// A response notification written back to the store at (user_id, report_id).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub user_id: String,
    pub report_id: String,
    pub kind: String,
    pub message: String,
    pub response: String,
    pub created_at: i64,
    pub read: bool,
}

impl Notification {
    pub fn for_response(user_id: &str, report_id: &str, response: &str) -> Notification {
        Notification {
            user_id: user_id.to_string(),
            report_id: report_id.to_string(),
            kind: "report_response".to_string(),
            message: format!("Your report (ID: {report_id}) has been responded to."),
            response: response.to_string(),
            created_at: Utc::now().timestamp_millis(),
            read: false,
        }
    }
}
