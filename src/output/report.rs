//! Printable summary of refresh cycles.

use super::terminal::format_field;
use crate::processing::ReconcileOutcome;
use crate::sync::RefreshReport;
use colored::Colorize;

/// One line per refresh, e.g. for the binary.
pub fn format_report_row(report: &RefreshReport) -> String {
    let drift = if report.update.changed {
        "changed".yellow().to_string()
    } else {
        "unchanged".green().to_string()
    };

    let routes = match &report.routes {
        None => "no-mirror".dimmed().to_string(),
        Some(ReconcileOutcome::Unmanaged(_)) => "unmanaged".dimmed().to_string(),
        Some(ReconcileOutcome::Unchanged(_)) => "in-sync".green().to_string(),
        Some(ReconcileOutcome::Applied(n)) => format!(
            "{} ({} routes)",
            "applied".yellow(),
            n.routes.as_ref().map(Vec::len).unwrap_or(0)
        ),
        Some(ReconcileOutcome::Failed(_)) => "failed".on_red().to_string(),
    };

    format!(
        "{nwid},{drift},{routes},{dups},{ts}",
        nwid = format_field(&report.update.network_id, 18),
        drift = format_field(drift, 11),
        routes = format_field(routes, 20),
        dups = format_field(format!("{}_dup", report.duplicates.len()), 8),
        ts = format_field(report.update.timestamp, 15),
    )
}

/// Print the header and one row per report to stdout.
pub fn print_reports(reports: &[RefreshReport]) {
    println!(
        r#"         "nwid",     "drift",              "routes",    "dups",      "accepted_at""#
    );
    for report in reports {
        println!("{}", format_report_row(report));
    }
    let changed = reports.iter().filter(|r| r.update.changed).count();
    log::info!("{} network(s) refreshed, {changed} changed", reports.len());
}
