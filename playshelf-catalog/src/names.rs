//! Name helpers shared by entity resolution and merging.

/// Convert a display name into a lowercase, hyphen-separated slug.
///
/// ```
/// use playshelf_catalog::names::slugify;
///
/// assert_eq!(slugify("Role-Playing Games (RPG)"), "role-playing-games-rpg");
/// assert_eq!(slugify("  Action  "), "action");
/// ```
pub fn slugify(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_separator = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_separator = false;
        } else if !last_was_separator && !result.is_empty() {
            result.push('-');
            last_was_separator = true;
        }
    }

    // Trim trailing separator
    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// True when a name consists only of ASCII digits (e.g. `"36"`).
///
/// Low-quality provider data sometimes carries bare numeric ids in place of
/// genre or platform names. Such names are never turned into entities.
pub fn is_numeric_only(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// True for `None`, empty, or whitespace-only strings.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Trim a free-text name, returning `None` when nothing is left.
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case-folded form of a name used for case-insensitive matching.
///
/// Folds the full Unicode range, so "ÉLAN" and "élan" share a key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
