//! Format notes, users and reports as terminal text.

use crate::types::Timestamp;
use crate::usernotes::Note;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{ContentArrangement, Table};
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Unix seconds as `YYYY-MM-DD HH:MM UTC`; the raw number if out of range.
pub fn format_timestamp(ts: Timestamp) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn format_notes_text(title: &str, notes: &[Note]) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if notes.is_empty() {
        out.push_str("No notes.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Time", "User", "Moderator", "Warning", "Note", "Link"]);
    for (position, note) in notes.iter().enumerate() {
        table.add_row(vec![
            position.to_string(),
            format!("{} ({})", format_timestamp(note.time), note.time),
            note.user.clone(),
            note.moderator.clone().unwrap_or_default(),
            note.warning.clone().unwrap_or_else(|| "-".to_string()),
            note.note.clone(),
            note.link.clone().unwrap_or_default(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("{} notes\n", notes.len()));
    out
}

pub fn format_users_text(users: &[String]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Users"));
    if users.is_empty() {
        out.push_str("No users have notes.\n");
        return out;
    }
    for user in users {
        out.push_str(&format!("  {}\n", user));
    }
    out.push_str(&format!("\n{} users\n", users.len()));
    out
}

pub fn format_warnings_text(kinds: &[Option<String>]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Warning kinds"));
    for kind in kinds {
        out.push_str(&format!("  {}\n", kind.as_deref().unwrap_or("(none)")));
    }
    out
}
