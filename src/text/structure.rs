use once_cell::sync::Lazy;
use regex::Regex;

/// Bulleted list markers: -, *, or a bullet glyph, then whitespace
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]\s+").expect("static regex"));

/// Numbered list markers: digits then '.' or ')', then whitespace
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s+").expect("static regex"));

/// Indentation prepended to detected list items
const LIST_INDENT: &str = "  ";

/// Re-indent list-like lines; everything else passes through unmodified
pub fn structure(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let stripped = line.trim();
            if is_list_item(stripped) {
                format!("{}{}", LIST_INDENT, stripped)
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}

/// Whether a stripped line starts with a list marker
pub fn is_list_item(stripped: &str) -> bool {
    BULLET_RE.is_match(stripped) || NUMBERED_RE.is_match(stripped)
}
