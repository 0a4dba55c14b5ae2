/// Make a raw feed value safe to embed in marker and popup markup.
///
/// Quotes and angle brackets become entities, C0/C1 control characters are
/// dropped, surrounding whitespace is trimmed. Applying it twice is a no-op.
pub fn sanitize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().filter(|c| !is_control(*c)) {
        match ch {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    // Trim after stripping so a control char can't shield whitespace.
    out.trim().to_string()
}

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}
