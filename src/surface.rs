use crate::todo::{self, TodoComment};
use crate::tracker::Issue;

/// Decision produced by the quick-fix surface for a selection.
///
/// `MultiLineSelection` and `NoTodo` are distinct so the adapter can surface
/// the former as an informational message and stay silent on the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickFix {
    /// The line carries a TODO marker: offer the single "create task" action.
    Offer(TodoComment),
    /// Start and end of the selection are different lines.
    MultiLineSelection,
    NoTodo,
}

/// Quick-fix decision for a selection, given its start and end line text.
/// Selections spanning multiple lines are rejected outright rather than
/// scanned.
pub fn quick_fix(start_line: &str, end_line: &str) -> QuickFix {
    if start_line != end_line {
        return QuickFix::MultiLineSelection;
    }
    match todo::match_todo(start_line) {
        Some(comment) => QuickFix::Offer(comment),
        None => QuickFix::NoTodo,
    }
}

/// Identifier to look up when hovering a line, if any.
pub fn hover_identifier(line: &str) -> Option<String> {
    todo::find_identifier(line)
}

/// One-line hover summary: identifier, title, link, creator.
pub fn render_hover(issue: &Issue) -> String {
    let creator = issue
        .creator
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("unknown");
    format!(
        "{}: {} <{}> by {}",
        issue.identifier, issue.title, issue.url, creator
    )
}
