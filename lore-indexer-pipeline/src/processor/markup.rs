//! Markup stripping for resource content.

/// Remove tags from XML or HTML content, keeping the text between them.
///
/// A `<` that turns out not to open a tag (another `<` follows before the
/// closing `>`) is kept literally, as is an unterminated tag at the end of
/// the input. Double-quoted attribute values may contain `>` and `<`.
pub fn strip_tags(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut tag_start: Option<usize> = None;
    let mut in_quote = false;

    for (idx, ch) in content.char_indices() {
        match tag_start {
            None => {
                if ch == '<' {
                    tag_start = Some(idx);
                } else {
                    out.push(ch);
                }
            }
            Some(start) => match ch {
                '"' => in_quote = !in_quote,
                '>' if !in_quote => tag_start = None,
                '<' if !in_quote => {
                    // False start: the previous segment was text.
                    out.push_str(&content[start..idx]);
                    tag_start = Some(idx);
                }
                _ => {}
            },
        }
    }

    if let Some(start) = tag_start {
        out.push_str(&content[start..]);
    }

    out
}
