use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of spaces and tabs collapse to a single space
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("static regex"));

/// Runs of blank lines collapse to exactly one blank line
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").expect("static regex"));

/// Minimum alphanumeric characters for a line to count as real text
const MIN_ALNUM_PER_LINE: usize = 3;

/// Normalize raw recognizer output.
///
/// Collapses space/tab runs, trims the text, reduces blank-line runs to a
/// single paragraph break, and drops noise lines. Empty input is returned
/// as an empty string, not an error.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = SPACE_RUN_RE.replace_all(text, " ");
    let trimmed = collapsed.trim();
    let paragraphs = BLANK_RUN_RE.replace_all(trimmed, "\n\n");

    let kept: Vec<&str> = paragraphs
        .lines()
        .filter(|line| !is_noise_line(line))
        .collect();
    let joined = kept.join("\n");

    // Dropping a noise line between paragraph breaks can leave adjacent
    // blank lines behind; consolidate those leftover newline runs too.
    BLANK_RUN_RE
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// A noise line is non-empty yet carries almost no alphanumeric content.
/// Blank lines are never noise; they delimit paragraphs.
pub fn is_noise_line(line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    let alnum = line.chars().filter(char::is_ascii_alphanumeric).count();
    alnum < MIN_ALNUM_PER_LINE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_space_runs() {
        assert_eq!(normalize("ab  cd"), "ab cd");
        assert_eq!(normalize("ab\t\tcd"), "ab cd");
    }

    #[test]
    fn test_preserves_single_paragraph_break() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_whitespace_only_lines_become_paragraph_break() {
        assert_eq!(normalize("line one\n   \nline two"), "line one\n\nline two");
    }

    #[test]
    fn test_empty_input_returns_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n \n  "), "");
    }

    #[test]
    fn test_noise_line_predicate() {
        assert!(is_noise_line(". ,"));
        assert!(is_noise_line("ab"));
        assert!(!is_noise_line("ab1"));
        assert!(!is_noise_line(""));
        assert!(!is_noise_line("   "));
    }

    #[test]
    fn test_drops_noise_lines_keeps_blank_lines() {
        let input = "First paragraph line.\n\n. ,\nSecond paragraph line.";
        assert_eq!(
            normalize(input),
            "First paragraph line.\n\nSecond paragraph line."
        );
    }

    #[test]
    fn test_dropped_noise_does_not_stack_blank_lines() {
        let input = "alpha beta\n\n.,\n\ngamma delta";
        assert_eq!(normalize(input), "alpha beta\n\ngamma delta");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize("  padded line  \n"), "padded line");
    }
}
