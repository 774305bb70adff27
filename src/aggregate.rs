use std::collections::HashMap;

use crate::models::{CommunityAggregate, Report, ReportStatus};

pub const COMMUNITY_MATTER_TYPE: &str = "Community";

/// Rebuild the per-submitter grouping from one full snapshot. Entries keep
/// the first-seen order of names; messages keep snapshot arrival order,
/// which is the store's key order rather than chronological order. A full
/// replace avoids stale entries when a report's category or name changes
/// between snapshots.
pub fn community_aggregates(reports: &[Report]) -> Vec<CommunityAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, CommunityAggregate> = HashMap::new();

    for report in reports {
        if report.matter_type != COMMUNITY_MATTER_TYPE {
            continue;
        }

        match groups.get_mut(&report.name) {
            Some(entry) => {
                entry.reports += 1;
                entry.messages.push(report.description.clone());
            }
            None => {
                order.push(report.name.clone());
                groups.insert(
                    report.name.clone(),
                    CommunityAggregate {
                        name: report.name.clone(),
                        reports: 1,
                        messages: vec![report.description.clone()],
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| groups.remove(&name))
        .collect()
}

pub fn unresolved(reports: &[Report]) -> Vec<&Report> {
    reports
        .iter()
        .filter(|report| report.status != ReportStatus::Resolved)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(name: &str, matter_type: &str, description: &str) -> Report {
        Report {
            id: uuid::Uuid::new_v4().to_string(),
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
    fn groups_community_reports_by_submitter() {
        let reports = vec![
            sample_report("Alice", "Community", "leak"),
            sample_report("Bob", "Other", "noise"),
            sample_report("Alice", "Community", "leak2"),
        ];

        let aggregates = community_aggregates(&reports);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].name, "Alice");
        assert_eq!(aggregates[0].reports, 2);
        assert_eq!(aggregates[0].messages, vec!["leak", "leak2"]);
    }

    #[test]
    fn entries_keep_first_seen_order() {
        let reports = vec![
            sample_report("Bob", "Community", "one"),
            sample_report("Alice", "Community", "two"),
            sample_report("Bob", "Community", "three"),
        ];

        let aggregates = community_aggregates(&reports);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].name, "Bob");
        assert_eq!(aggregates[0].messages, vec!["one", "three"]);
        assert_eq!(aggregates[1].name, "Alice");
    }

    #[test]
    fn count_matches_message_length_per_group() {
        let reports = vec![
            sample_report("Alice", "Community", "a"),
            sample_report("Alice", "Community", "b"),
            sample_report("Kiara", "Community", "c"),
        ];

        for aggregate in community_aggregates(&reports) {
            assert_eq!(aggregate.reports, aggregate.messages.len());
        }
    }

    #[test]
    fn recompute_is_deterministic() {
        let reports = vec![
            sample_report("Alice", "Community", "a"),
            sample_report("Bob", "Community", "b"),
            sample_report("Alice", "Other", "c"),
        ];

        assert_eq!(community_aggregates(&reports), community_aggregates(&reports));
    }

    #[test]
    fn empty_submitter_name_forms_its_own_group() {
        let reports = vec![
            sample_report("", "Community", "anonymous gripe"),
            sample_report("Alice", "Community", "leak"),
        ];

        let aggregates = community_aggregates(&reports);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].name, "");
        assert_eq!(aggregates[0].messages, vec!["anonymous gripe"]);
    }

    #[test]
    fn no_community_reports_yields_empty_view() {
        let reports = vec![sample_report("Bob", "Billing", "refund")];
        assert!(community_aggregates(&reports).is_empty());
    }

    #[test]
    fn unresolved_excludes_resolved_reports() {
        let mut resolved = sample_report("Alice", "Community", "done");
        resolved.status = ReportStatus::Resolved;
        let reports = vec![resolved, sample_report("Bob", "Other", "open")];

        let backlog = unresolved(&reports);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].name, "Bob");
    }
}
