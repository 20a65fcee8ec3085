use std::{borrow::Cow, fmt::Write as _};

use ansi_term::{Colour, Style};
use chrono::{DateTime, Local, Utc};

use crate::{store::entities::ChecklistStateEntity, utils::progress::Progress};

const BAR_WIDTH: usize = 24;

/// Renders the whole checklist to stdout. Always a full rebuild from state.
pub fn print_checklist(state: &ChecklistStateEntity, now: DateTime<Utc>) {
    print!("{}", format_checklist(state, now));
}

/// Formatting part of [print_checklist], kept separate so tests can assert
/// on the output.
pub fn format_checklist(state: &ChecklistStateEntity, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let heading = now.with_timezone(&Local).format("%A, %x");
    let _ = writeln!(out, "{}", Style::new().bold().paint(heading.to_string()));
    let _ = writeln!(out);

    if state.habits.is_empty() {
        let _ = writeln!(out, "No habits yet. Add one with `habitline add <name>`.");
    } else {
        for (position, habit) in state.habits.iter().enumerate() {
            let marker = if habit.done {
                Colour::Green.paint("[x]").to_string()
            } else {
                "[ ]".to_string()
            };
            let name = printable_name(&habit.name);
            let name = if habit.done {
                Style::new()
                    .dimmed()
                    .strikethrough()
                    .paint(name.as_ref())
                    .to_string()
            } else {
                name.into_owned()
            };
            let added = habit
                .added_at
                .with_timezone(&Local)
                .format("added %x %H:%M");
            let _ = writeln!(
                out,
                "{:>3}. {marker} {name}  {}",
                position + 1,
                Style::new().dimmed().paint(added.to_string()),
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", format_progress_line(Progress::of(&state.habits)));
    out
}

/// Fill bar plus the `done / total` label, e.g. `[####----] 50%  1 / 2`.
pub fn format_progress_line(progress: Progress) -> String {
    let percent = progress.percent();
    let filled = BAR_WIDTH * percent as usize / 100;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '█' } else { '░' });
    }
    format!("{bar} {percent}%  {progress}")
}

/// Control characters in a habit name would mangle the terminal, so they are
/// replaced before display.
fn printable_name(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_control) {
        Cow::Owned(
            name.chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(name)
    }
}
