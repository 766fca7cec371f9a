use crate::session::{ContentSession, ResearchSession};
use colored::Colorize;
use prettytable::{format, Table};

const PREVIEW_CHARS: usize = 40;

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() > PREVIEW_CHARS {
        let head: String = line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

fn marker(id: &str, active: Option<&str>) -> String {
    if active == Some(id) {
        "*".green().to_string()
    } else {
        String::new()
    }
}

/// Print content sessions as a table; `active` is highlighted
pub fn print_content_history(sessions: &[&ContentSession], active: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No content sessions yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "".bold(),
        "ID".bold(),
        "Type".bold(),
        "Prompt".bold(),
        "Words".bold(),
        "Saved".bold()
    ]);

    for (index, session) in sessions.iter().enumerate() {
        let saved = session
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        table.add_row(prettytable::row![
            index + 1,
            marker(&session.id, active),
            session.id.cyan(),
            session.content_type.label(),
            preview(&session.prompt),
            session.word_count(),
            saved
        ]);
    }

    println!("\nContent History:");
    table.printstd();
    println!();
    println!("Use {} to open a session.", "/select #<n>".cyan());
    println!();
}

/// Print research threads as a table; `active` is highlighted
pub fn print_research_history(sessions: &[&ResearchSession], active: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No research sessions yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "".bold(),
        "ID".bold(),
        "Type".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Activity".bold()
    ]);

    for (index, session) in sessions.iter().enumerate() {
        let updated = session
            .last_activity
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        table.add_row(prettytable::row![
            index + 1,
            marker(&session.id, active),
            session.id.cyan(),
            session.research_type.label(),
            preview(&session.title),
            session.messages.len(),
            updated
        ]);
    }

    println!("\nResearch History:");
    table.printstd();
    println!();
    println!("Use {} to open a thread.", "/select #<n>".cyan());
    println!();
}
