//! Text helpers shared by the stack and condition renderers.

/// Collapse every run of spaces and tabs into a single space and trim both ends.
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = false;

    for ch in input.chars() {
        if ch == ' ' || ch == '\t' {
            pending = true;
            continue;
        }
        if pending && !out.is_empty() {
            out.push(' ');
        }
        pending = false;
        out.push(ch);
    }

    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_owned()
    }
}
