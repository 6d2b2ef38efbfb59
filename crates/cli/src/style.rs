//! Terminal styling for check reports.

use console::Style;
use gittr_core::ConflictKind;

fn marked(mark: &str, tone: Style, msg: &str) -> String {
    format!("{} {}", tone.apply_to(mark), msg)
}

pub fn success(msg: &str) -> String {
    marked("✓", Style::new().green(), msg)
}

pub fn error(msg: &str) -> String {
    marked("✗", Style::new().red(), msg)
}

pub fn warn(msg: &str) -> String {
    marked("!", Style::new().yellow().bold(), msg)
}

/// Section title, bold.
pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Edit/edit can usually be merged by hand; anything involving a delete
/// loses a file on one side, so it is shown in red.
pub fn kind(kind: ConflictKind) -> String {
    let tone = match kind {
        ConflictKind::EditEdit => Style::new().yellow(),
        ConflictKind::EditDelete | ConflictKind::DeleteEdit => Style::new().red(),
    };
    tone.apply_to(kind).to_string()
}
