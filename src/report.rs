use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::models::{CommunityAggregate, Report, Stats};

fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn build_report(
    stats: &Stats,
    reports: &[Report],
    community: &[CommunityAggregate],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Report Desk Summary");
    let _ = writeln!(output, "Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Users: {}", stats.total_users);
    let _ = writeln!(output, "- Reports: {}", stats.total_reports);
    let _ = writeln!(output, "- Resolved: {}", stats.resolved_reports);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Community Submitters");

    if community.is_empty() {
        let _ = writeln!(output, "No community reports found.");
    } else {
        for entry in community.iter() {
            let _ = writeln!(output, "- {}: {} message(s)", entry.name, entry.reports);
            for message in entry.messages.iter() {
                let _ = writeln!(output, "  - {message}");
            }
        }
    }

    let mut recent: Vec<&Report> = reports.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Reports");

    if recent.is_empty() {
        let _ = writeln!(output, "No reports found.");
    } else {
        for report in recent.iter().take(10) {
            let _ = writeln!(
                output,
                "- [{}] {} ({}) on {}: {}",
                report.status,
                report.name,
                report.matter_type,
                format_millis(report.created_at),
                report.description
            );
        }
    }

    let backlog = aggregate::unresolved(reports);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Unresolved Backlog");

    if backlog.is_empty() {
        let _ = writeln!(output, "Nothing pending.");
    } else {
        let _ = writeln!(output, "{} report(s) awaiting a response.", backlog.len());
        for report in backlog.iter() {
            let _ = writeln!(output, "- {} — {}", report.name, report.description);
        }
    }

    output
}

/// CSV export of the community grouping, one row per submitter with the
/// messages joined into a single column.
pub fn write_community_csv(
    path: &Path,
    community: &[CommunityAggregate],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["name", "reports", "messages"])?;

    for entry in community {
        writer.write_record([
            entry.name.as_str(),
            &entry.reports.to_string(),
            &entry.messages.join(" | "),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
