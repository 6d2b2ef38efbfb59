//! Rendering of conflict check results.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use gittr_core::ConflictResult;

use super::style;

/// Print `result` as JSON or as a human-readable table.
pub fn print_result(result: &ConflictResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(result).context("failed to serialize result")?;
        println!("{}", out);
        return Ok(());
    }

    println!();
    if !result.has_conflicts() {
        println!(
            "{}",
            style::success(&format!("No conflicts with {}", result.target_branch()))
        );
        print_unchecked(result);
        println!();
        return Ok(());
    }

    println!(
        "{}",
        style::header(&format!(
            "Conflicts with {} ({})",
            result.target_branch(),
            result.conflicts().len()
        ))
    );
    println!();
    println!("{}", conflict_table(result));
    print_unchecked(result);
    println!();
    println!(
        "{}",
        style::error("Resolve with: gittr resolve --result <file> --path <path> --using pr|base|manual")
    );
    println!();

    Ok(())
}

/// List changed paths that were left out of the check.
fn print_unchecked(result: &ConflictResult) {
    if result.skipped().is_empty() {
        return;
    }
    println!();
    println!(
        "{}",
        style::warn(&format!(
            "{} changed file(s) not checked (too large, binary or not UTF-8):",
            result.skipped().len()
        ))
    );
    for path in result.skipped() {
        println!("  {}", style::dim(path));
    }
}

fn conflict_table(result: &ConflictResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Kind", "Details"]);

    for c in result.conflicts() {
        table.add_row(vec![
            Cell::new(&c.path),
            Cell::new(style::kind(c.kind)),
            Cell::new(&c.message),
        ]);
    }
    table
}
