/// Fallback plan filename: `trip_{slug(destination)}_{timestamp}.md`.
pub fn plan_filename(destination: &str, timestamp: &str) -> String {
    let slug = destination_slug(destination);
    if slug.is_empty() {
        format!("trip_{timestamp}.md")
    } else {
        format!("trip_{slug}_{timestamp}.md")
    }
}

/// Extracts the `filename` parameter of a `Content-Disposition` header and
/// makes it safe to use as a local file name.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"'))
        })
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
}

fn destination_slug(destination: &str) -> String {
    destination
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

fn sanitize_filename(input: &str) -> String {
    // Drop any directory part the server may have sent.
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut name = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if name.len() > 120 {
        let mut cut = 120;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
    }
    if is_reserved_windows_name(name.split('.').next().unwrap_or_default()) {
        name.insert(0, '_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
