/// Lowercase, hyphen-joined form of a display label.
///
/// Word characters and hyphens survive, everything else is dropped, and runs
/// of whitespace or hyphens collapse into one hyphen. Leading and trailing
/// hyphens and underscores are stripped, so `" Max Power (kW) "` becomes
/// `"max-power-kw"`.
pub fn slugify(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let mut slug = String::with_capacity(cleaned.len());
    let mut pending_separator = false;

    for ch in cleaned.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else if ch == '-' || ch.is_whitespace() {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
