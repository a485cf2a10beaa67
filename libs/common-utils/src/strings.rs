//! String helpers

/// True when `s` is empty or only whitespace
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// `s` unless it is blank, otherwise `default`
pub fn default_if_blank<'a>(s: &'a str, default: &'a str) -> &'a str {
    if is_blank(s) {
        default
    } else {
        s
    }
}

/// First `max_chars` characters of `s`. Never splits a multi-byte character.
pub fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Convert `camelCase`, `PascalCase`, `kebab-case` or spaced words to
/// `snake_case`. Acronyms stay together: `HTTPServer` becomes `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, c) in chars.iter().copied().enumerate() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    if out.ends_with('_') {
        out.pop();
    }
    out
}
