use std::fmt::Write;

use crate::aggregate;
use crate::error::ErrorKind;
use crate::models::{CommunityAggregate, Report, Stats};

/// Everything the console shows, as one immutable record. Each event maps
/// the previous state to a fresh one through [`apply`]; no field is mutated
/// in place from a subscription callback.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub reports: Vec<Report>,
    pub stats: Stats,
    pub community: Vec<CommunityAggregate>,
    pub loading: bool,
    pub error: Option<ErrorBanner>,
    pub selected_report: Option<SelectedReport>,
    pub selected_submitter: Option<SelectedSubmitter>,
}

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
}

/// A report opened for response, with the operator's editable draft. The
/// draft starts from the report's stored response, if any.
#[derive(Debug, Clone)]
pub struct SelectedReport {
    pub report: Report,
    pub draft: String,
}

/// A submitter picked from the community view. Messages are captured from
/// the aggregate at selection time; an absent name yields an empty list.
#[derive(Debug, Clone)]
pub struct SelectedSubmitter {
    pub name: String,
    pub messages: Vec<String>,
}

/// Inputs to the reducer: the three independent snapshot signals, store
/// failures by category, and the operator's UI intents.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    ReportsSnapshot(Vec<Report>),
    UserCount(i64),
    ResolvedCount(i64),
    StoreFailed { kind: ErrorKind, message: String },
    ReportSelected(String),
    DraftEdited(String),
    ReportClosed,
    SubmitterSelected(String),
    SubmitterClosed,
}

impl DashboardState {
    pub fn new() -> DashboardState {
        DashboardState {
            loading: true,
            ..DashboardState::default()
        }
    }
}

/// The reducer. Total over every (state, event) pair; snapshot events
/// replace derived views wholesale, and the three counters update
/// independently with no forced consistency between them.
pub fn apply(state: DashboardState, event: DashboardEvent) -> DashboardState {
    let mut next = state;

    match event {
        DashboardEvent::ReportsSnapshot(reports) => {
            next.stats.total_reports = reports.len() as i64;
            next.community = aggregate::community_aggregates(&reports);
            next.reports = reports;
            next.loading = false;
        }
        DashboardEvent::UserCount(count) => {
            next.stats.total_users = count;
        }
        DashboardEvent::ResolvedCount(count) => {
            next.stats.resolved_reports = count;
        }
        DashboardEvent::StoreFailed { kind, message } => {
            next.error = Some(ErrorBanner { kind, message });
            next.loading = false;
        }
        DashboardEvent::ReportSelected(report_id) => {
            if let Some(report) = next.reports.iter().find(|r| r.id == report_id) {
                next.selected_report = Some(SelectedReport {
                    draft: report.response.clone().unwrap_or_default(),
                    report: report.clone(),
                });
            }
        }
        DashboardEvent::DraftEdited(text) => {
            if let Some(selected) = next.selected_report.as_mut() {
                selected.draft = text;
            }
        }
        DashboardEvent::ReportClosed => {
            next.selected_report = None;
        }
        DashboardEvent::SubmitterSelected(name) => {
            let messages = next
                .community
                .iter()
                .find(|entry| entry.name == name)
                .map(|entry| entry.messages.clone())
                .unwrap_or_default();
            next.selected_submitter = Some(SelectedSubmitter { name, messages });
        }
        DashboardEvent::SubmitterClosed => {
            next.selected_submitter = None;
        }
    }

    next
}

/// One line per state change for the watch loop.
pub fn summary_line(state: &DashboardState) -> String {
    let mut line = String::new();

    if state.loading {
        return "loading...".to_string();
    }

    let _ = write!(
        line,
        "users {} | reports {} | resolved {}",
        state.stats.total_users, state.stats.total_reports, state.stats.resolved_reports
    );

    if !state.community.is_empty() {
        let names: Vec<String> = state
            .community
            .iter()
            .map(|entry| format!("{} ({})", entry.name, entry.reports))
            .collect();
        let _ = write!(line, " | community: {}", names.join(", "));
    }

    if let Some(banner) = &state.error {
        let _ = write!(line, " | error: {}", banner.message);
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;

    fn sample_report(id: &str, name: &str, matter_type: &str, description: &str) -> Report {
        Report {
            id: id.to_string(),
            created_at: 1_700_000_000_000,
            description: description.to_string(),
            email: "someone@example.com".to_string(),
            phone: "555-0100".to_string(),
            matter_type: matter_type.to_string(),
            name: name.to_string(),
            user_id: "user-1".to_string(),
            status: ReportStatus::Pending,
            resolved_at: None,
            response: None,
        }
    }

    #[test]
    fn reports_snapshot_replaces_list_and_aggregates() {
        let state = DashboardState::new();
        assert!(state.loading);

        let first = apply(
            state,
            DashboardEvent::ReportsSnapshot(vec![
                sample_report("r1", "Alice", "Community", "leak"),
                sample_report("r2", "Bob", "Other", "noise"),
            ]),
        );
        assert!(!first.loading);
        assert_eq!(first.stats.total_reports, 2);
        assert_eq!(first.community.len(), 1);

        // Alice's report recategorized away from Community; the stale entry
        // must vanish because the view is rebuilt, not merged.
        let second = apply(
            first,
            DashboardEvent::ReportsSnapshot(vec![
                sample_report("r1", "Alice", "Other", "leak"),
                sample_report("r2", "Bob", "Other", "noise"),
            ]),
        );
        assert_eq!(second.stats.total_reports, 2);
        assert!(second.community.is_empty());
    }

    #[test]
    fn counters_update_independently() {
        let state = DashboardState::new();
        let state = apply(state, DashboardEvent::ResolvedCount(3));
        let state = apply(
            state,
            DashboardEvent::ReportsSnapshot(
                (0..5)
                    .map(|i| sample_report(&format!("r{i}"), "Alice", "Other", "x"))
                    .collect(),
            ),
        );

        // resolved > would-be-consistent value is surfaced as-is until the
        // resolved subscription's own next push.
        assert_eq!(state.stats.resolved_reports, 3);
        assert_eq!(state.stats.total_reports, 5);
        assert_eq!(state.stats.total_users, 0);
    }

    #[test]
    fn selecting_a_report_seeds_the_draft() {
        let mut report = sample_report("r1", "Alice", "Community", "leak");
        report.response = Some("already looking into it".to_string());

        let state = apply(
            DashboardState::new(),
            DashboardEvent::ReportsSnapshot(vec![report]),
        );
        let state = apply(state, DashboardEvent::ReportSelected("r1".to_string()));

        let selected = state.selected_report.as_ref().unwrap();
        assert_eq!(selected.draft, "already looking into it");

        let state = apply(state, DashboardEvent::DraftEdited("fixed".to_string()));
        assert_eq!(state.selected_report.as_ref().unwrap().draft, "fixed");

        let state = apply(state, DashboardEvent::ReportClosed);
        assert!(state.selected_report.is_none());
    }

    #[test]
    fn selecting_unknown_report_is_a_no_op() {
        let state = apply(
            DashboardState::new(),
            DashboardEvent::ReportSelected("missing".to_string()),
        );
        assert!(state.selected_report.is_none());
    }

    #[test]
    fn selecting_absent_submitter_yields_empty_messages() {
        let state = apply(
            DashboardState::new(),
            DashboardEvent::ReportsSnapshot(vec![sample_report("r1", "Alice", "Community", "leak")]),
        );
        let state = apply(
            state,
            DashboardEvent::SubmitterSelected("Nobody".to_string()),
        );

        let selected = state.selected_submitter.as_ref().unwrap();
        assert_eq!(selected.name, "Nobody");
        assert!(selected.messages.is_empty());
    }

    #[test]
    fn selecting_known_submitter_captures_messages() {
        let state = apply(
            DashboardState::new(),
            DashboardEvent::ReportsSnapshot(vec![
                sample_report("r1", "Alice", "Community", "leak"),
                sample_report("r2", "Alice", "Community", "leak2"),
            ]),
        );
        let state = apply(
            state,
            DashboardEvent::SubmitterSelected("Alice".to_string()),
        );

        let selected = state.selected_submitter.as_ref().unwrap();
        assert_eq!(selected.messages, vec!["leak", "leak2"]);

        let state = apply(state, DashboardEvent::SubmitterClosed);
        assert!(state.selected_submitter.is_none());
    }

    #[test]
    fn store_failure_keeps_category() {
        let state = apply(
            DashboardState::new(),
            DashboardEvent::StoreFailed {
                kind: ErrorKind::Notification,
                message: "failed to send notification".to_string(),
            },
        );

        let banner = state.error.as_ref().unwrap();
        assert_eq!(banner.kind, ErrorKind::Notification);
        assert!(!state.loading);
    }
}
