//! Backup history display formatting
//!
//! Formats backup runs for terminal output.

use crate::backup::RunSummary;

fn run_date(run: &RunSummary) -> String {
    match run.created_at {
        Some(at) => at.format("%b %d, %Y at %H:%M:%S").to_string(),
        None => "unknown date".to_string(),
    }
}

/// Format the list of runs as a table
pub fn format_history(runs: &[RunSummary]) -> String {
    if runs.is_empty() {
        return "No backups found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:<14}  {:<25}  {:>5}\n", "ID", "Date", "Files"));
    output.push_str(&format!("{:-<14}  {:-<25}  {:->5}\n", "", "", ""));

    for run in runs {
        output.push_str(&format!(
            "{:<14}  {:<25}  {:>5}\n",
            run.id,
            run_date(run),
            run.files.len()
        ));
    }

    output.push_str(&format!("\nTotal: {} backup(s)", runs.len()));
    output
}

/// Format one run with its file names
pub fn format_run_detail(run: &RunSummary) -> String {
    let mut output = format!(
        "ID: {}\nDate: {}\n",
        run.id,
        run_date(run)
    );
    for file in &run.files {
        output.push_str(&format!("  {}\n", file));
    }
    output
}
