/// Longest excerpt shown in a report, in characters.
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Pick the first prose paragraph of a README.
///
/// Headings, badge and image lines, list items, HTML and fenced code blocks are skipped. The
/// result is truncated to [`MAX_EXCERPT_CHARS`] characters with a `...` suffix.
#[must_use]
pub fn excerpt(text: &str) -> Option<String> {
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }

        if !in_fence && is_setext_underline(trimmed) {
            // the lines above were a heading
            paragraph.clear();
            continue;
        }

        if in_fence || is_skipped(trimmed) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }

        paragraph.push(trimmed);
    }

    if paragraph.is_empty() {
        return None;
    }

    Some(truncate(&paragraph.join(" "), MAX_EXCERPT_CHARS))
}

fn is_skipped(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with('<')
        || line.starts_with("![")
        || line.starts_with("[![")
        || line.starts_with('>')
        || is_list_item(line)
}

fn is_list_item(line: &str) -> bool {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ") {
        return true;
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line.chars().nth(digits).is_some_and(|c| c == '.' || c == ')')
}

fn is_setext_underline(line: &str) -> bool {
    !line.is_empty() && (line.chars().all(|c| c == '=') || line.chars().all(|c| c == '-'))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
