//! Plain-text export of coaching notes and the practice plan.

use std::fmt::Write;

use crate::models::coaching::{CoachingNotes, PracticePlan};

/// Suggested file name for the download.
pub const EXPORT_FILENAME: &str = "Interview_Partner_Notes.txt";

/// Renders notes (and the plan, when there is one) with fixed section headers
/// and one `- ` bullet per list item.
pub fn notes_as_text(notes: &CoachingNotes, plan: Option<&PracticePlan>) -> String {
    let mut text = String::from("--- COACHING NOTES ---\n\n");

    push_section(&mut text, "Strengths to Keep", &notes.strengths);
    text.push('\n');
    push_section(&mut text, "Recurring Improvements", &notes.improvements);
    let _ = writeln!(text, "\nNext Practice Focus: {}\n", notes.next_focus);

    if let Some(plan) = plan {
        text.push_str("--- NEXT PRACTICE PLAN ---\n\n");
        push_section(&mut text, "Drills", &plan.drills);
        text.push('\n');
        push_section(&mut text, "Suggested Questions", &plan.suggested_questions);
    }

    text
}

fn push_section(text: &mut String, header: &str, items: &[String]) {
    let _ = writeln!(text, "{header}:");
    for item in items {
        let _ = writeln!(text, "- {item}");
    }
}
