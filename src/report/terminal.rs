use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::advice::{recommend, summarize};
use crate::models::{ErrorReport, Outcome, Recommendation, Report, Severity, Summary, UpdateTier};

/// Render a colored terminal report.
pub fn render(outcome: &Outcome, path: &Path) {
    println!(
        "\n {} v{}",
        "npm-advisor".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Project: {}\n", path.display());

    match outcome {
        Outcome::Success(report) => render_report(report),
        Outcome::Failure(err) => render_error(err),
    }
}

fn render_report(report: &Report) {
    let summary = summarize(report);
    render_summary(report, &summary);

    let recs = recommend(report);
    if recs.is_empty() {
        println!(" {} All dependencies are up to date.\n", "✓".green());
        return;
    }

    println!(" {} Update recommendations:\n", "[UPDATE]".yellow().bold());
    println!("{}\n", recommendation_table(&recs));
}

fn render_summary(report: &Report, summary: &Summary) {
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Collected at       : {}", report.timestamp));
    println!(
        " │  {:<48} │",
        format!("Total dependencies : {}", summary.total_dependencies())
    );
    println!(
        " │  {:<48} │",
        format!(
            "  dependencies {} / dev {} / peer {}",
            summary.dependencies, summary.dev_dependencies, summary.peer_dependencies
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  Outdated        : {:>4}", "⚠".yellow(), summary.outdated)
    );
    println!(
        " │  {:<48} │",
        format!(
            "  security {} / major {} / minor {}",
            summary.security_updates, summary.major_updates, summary.minor_updates
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Vulnerabilities : {:>4}  {}",
            "✗".red(),
            summary.vulnerabilities,
            severity_breakdown(summary)
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");
}

fn severity_breakdown(summary: &Summary) -> String {
    let parts: Vec<String> = Severity::ALL
        .iter()
        .rev()
        .filter_map(|sev| summary.by_severity.get(sev).map(|n| format!("{sev} ({n})")))
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(", "))
    }
}

fn recommendation_table(recs: &[Recommendation]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Current").add_attribute(Attribute::Bold),
            Cell::new("Available").add_attribute(Attribute::Bold),
            Cell::new("Update").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Command").add_attribute(Attribute::Bold),
        ]);

    for rec in recs {
        let color = match rec.update {
            UpdateTier::Security => Color::Red,
            UpdateTier::Major => Color::Yellow,
            UpdateTier::Minor | UpdateTier::Patch => Color::Green,
            UpdateTier::Unknown => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(&rec.package),
            Cell::new(rec.kind.to_string()),
            Cell::new(rec.current.as_deref().unwrap_or("-")),
            Cell::new(&rec.available),
            Cell::new(rec.update.to_string()).fg(color),
            Cell::new(rec.priority())
                .fg(color)
                .set_alignment(CellAlignment::Center),
            Cell::new(&rec.command),
        ]);
    }

    table
}

fn render_error(err: &ErrorReport) {
    println!(" {} {}\n", "[ERROR]".red().bold(), err.error);
    for line in err.stack.lines().skip(1) {
        println!("   {}", line.dimmed());
    }
    if let Some(info) = &err.additional_info {
        println!("   project path : {}", info.project_path);
        println!(
            "   node         : {}",
            info.node_version.as_deref().unwrap_or("unavailable")
        );
        println!(
            "   npm          : {}",
            info.npm_version.as_deref().unwrap_or("unavailable")
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_breakdown_most_severe_first() {
        let mut summary = Summary::default();
        summary.by_severity.insert(Severity::Low, 1);
        summary.by_severity.insert(Severity::Critical, 2);
        assert_eq!(severity_breakdown(&summary), "[critical (2), low (1)]");
    }

    #[test]
    fn test_severity_breakdown_empty() {
        assert_eq!(severity_breakdown(&Summary::default()), "");
    }
}
