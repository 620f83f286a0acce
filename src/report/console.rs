use crate::agent::orchestrator::StepReport;
use crate::repository::store::LocatorStore;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format the object repository for terminal output, optionally limited to
/// one page.
///
/// Produces output like:
/// ```text
/// === Object Repository ===
///
/// PAGE: LoginPage
///   UsernameField
///     Locator: input#user-name
///     Type: fill
///     Description: Fill username
///     Used: 2 times
///     Discovered: 2025-01-15T10:30:00
///
/// === 1 objects on 1 pages ===
/// ```
pub fn format_repository(store: &LocatorStore, page: Option<&str>) -> String {
    let mut out = String::from("=== Object Repository ===\n");

    let pages: Vec<&str> = match page {
        Some(p) => store.pages().into_iter().filter(|name| *name == p).collect(),
        None => store.pages(),
    };

    if pages.is_empty() {
        out.push_str("\nRepository is empty\n");
        return out;
    }

    let mut objects = 0;
    for name in &pages {
        out.push_str(&format!("\nPAGE: {}\n", name));
        for record in store.page_objects(name) {
            objects += 1;
            let description = if record.description.is_empty() {
                "N/A"
            } else {
                record.description.as_str()
            };
            out.push_str(&format!("  {}\n", record.object));
            out.push_str(&format!("    Locator: {}\n", record.selector));
            out.push_str(&format!("    Type: {}\n", record.kind));
            out.push_str(&format!("    Description: {}\n", description));
            out.push_str(&format!("    Used: {} times\n", record.used_count));
            out.push_str(&format!(
                "    Discovered: {}\n",
                record.discovered_at.format("%Y-%m-%dT%H:%M:%S")
            ));
        }
    }

    out.push_str(&format!(
        "\n=== {} objects on {} pages ===\n",
        objects,
        pages.len()
    ));
    out
}

/// Format per-step results of a run, one line per step plus a summary.
pub fn format_run_report(reports: &[StepReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let marker = if report.is_error() {
            "\u{2717} FAIL"
        } else {
            "\u{2713} OK  "
        };
        out.push_str(&format!(
            "{} [{}] {} -> {}\n",
            marker,
            report.outcome.resolution.as_str(),
            report.instruction,
            report.text()
        ));
    }

    let failed = reports.iter().filter(|r| r.is_error()).count();
    out.push_str(&format!(
        "\n=== Steps: {} ok, {} failed ({} total) ===\n",
        reports.len() - failed,
        failed,
        reports.len()
    ));
    out
}
