// Response formatting applied to every generated answer before it reaches a caller.

/// Characters that end a sentence and get a space after them.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Normalize raw model output into readable paragraphs.
///
/// Every run of newline characters becomes a paragraph break (`"\n\n"`). Inside a paragraph, runs of
/// whitespace collapse to a single space and a space is inserted after `.`, `!` or `?` when the next
/// character is neither whitespace nor another terminator. Paragraphs are trimmed, so the result
/// never starts or ends with whitespace.
///
/// Newlines are split out before whitespace is collapsed so paragraph breaks survive. The function is
/// total and idempotent: `format_response(&format_response(s)) == format_response(s)`.
pub fn format_response(raw: &str) -> String {
    raw.split(['\n', '\r'])
        .map(collapse_whitespace)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| space_after_terminators(&paragraph))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn space_after_terminators(paragraph: &str) -> String {
    let mut out = String::with_capacity(paragraph.len() + 8);
    let mut chars = paragraph.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if !TERMINATORS.contains(&c) {
            continue;
        }
        match chars.peek() {
            Some(next) if !next.is_whitespace() && !TERMINATORS.contains(next) => out.push(' '),
            _ => {}
        }
    }
    out
}
