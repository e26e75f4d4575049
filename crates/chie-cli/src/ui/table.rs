//! Record tables.

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use uuid::Uuid;

use chie_core::{Event, Journal, Task};

const PREVIEW_MAX: usize = 60;

/// First eight characters of an id; enough to address a record.
pub fn short_id(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Single-line preview of a body.
pub fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() <= PREVIEW_MAX {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_MAX - 3).collect();
    format!("{}...", cut)
}

pub fn journal_table(journals: &[Journal]) -> Table {
    let mut table = new_table(&["ID", "Date", "Title", "Sentiment", "Preview"]);
    for journal in journals {
        table.add_row(vec![
            short_id(&journal.id),
            timestamp(&journal.date),
            journal.title.clone(),
            journal
                .sentiment
                .map(|s| s.to_string())
                .unwrap_or_default(),
            preview(&journal.content),
        ]);
    }
    table
}

pub fn task_table(tasks: &[Task]) -> Table {
    let mut table = new_table(&["ID", "Done", "Task", "Created"]);
    for task in tasks {
        table.add_row(vec![
            short_id(&task.id),
            if task.completed { "x" } else { " " }.to_string(),
            task.text.clone(),
            timestamp(&task.created_at),
        ]);
    }
    table
}

pub fn event_table(events: &[Event]) -> Table {
    let mut table = new_table(&["ID", "When", "Title", "Description"]);
    for event in events {
        table.add_row(vec![
            short_id(&event.id),
            timestamp(&event.date_time),
            event.title.clone(),
            preview(&event.description),
        ]);
    }
    table
}
