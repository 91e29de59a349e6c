/// Canonical form used to match header cells: BOM and zero-width characters
/// removed, inner whitespace collapsed, ASCII lowercased.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Yes/No style cell. Also accepts the numeric gate encoding where `1` means
/// "No" and `3`/`5` mean "Yes".
pub(crate) fn parse_flag(value: &str, numeric: bool) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        "1" if numeric => Some(false),
        "3" | "5" if numeric => Some(true),
        _ => None,
    }
}

pub(crate) fn flag_text(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
