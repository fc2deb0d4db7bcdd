use regex::Regex;

/// A `TODO:` comment marker found on a single line of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoComment {
    /// The full line text the marker was found on.
    pub line: String,
    /// Byte offset of the `TODO:` literal within the line.
    pub marker_start: usize,
    /// Free text after the marker, trimmed.
    pub description: String,
    /// Tracker issue identifier found anywhere on the line, if any.
    pub identifier: Option<String>,
}

/// Match a line-comment TODO marker: `//`, optional whitespace, literal `TODO:`.
///
/// Description and identifier extraction are independent: a line may carry a
/// marker with no identifier (task not yet created) or both.
pub fn match_todo(line: &str) -> Option<TodoComment> {
    let marker = Regex::new(r"//\s*(TODO:)").unwrap();
    let caps = marker.captures(line)?;
    let start = caps.get(1).unwrap().start();

    Some(TodoComment {
        line: line.to_string(),
        marker_start: start,
        description: line[start + "TODO:".len()..].trim().to_string(),
        identifier: find_identifier(line),
    })
}

/// Search a whole line for a tracker issue identifier (`ABC-123`):
/// 3-5 uppercase letters, a hyphen, digits.
pub fn find_identifier(line: &str) -> Option<String> {
    let re = Regex::new(r"\b[A-Z]{3,5}-\d+\b").unwrap();
    re.find(line).map(|m| m.as_str().to_string())
}

/// Rewrite a line after task creation: the `TODO:` literal becomes
/// `TODO: <identifier>`, the rest of the line is preserved verbatim.
pub fn annotate(line: &str, identifier: &str) -> String {
    line.replacen("TODO:", &format!("TODO: {identifier}"), 1)
}
