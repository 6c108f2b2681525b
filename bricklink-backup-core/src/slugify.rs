//! Filesystem-safe names for backup files.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static regex"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("static regex"))
}

/// Converts arbitrary text into a lowercase slug.
///
/// With `allow_unicode == false` the text is NFKD-decomposed and everything
/// outside ASCII is dropped, so accents fall away (`"Café"` → `"cafe"`).
/// With `allow_unicode == true` it is NFKC-composed and non-ASCII word
/// characters are kept.
///
/// Characters other than word characters, whitespace and hyphens are removed,
/// runs of whitespace and hyphens collapse to one hyphen, and leading or
/// trailing hyphens and underscores are trimmed.
///
/// ```
/// use bricklink_backup_core::slugify::slugify;
///
/// assert_eq!(slugify("My Backup: 2024!", false), "my-backup-2024");
/// assert_eq!(slugify("", false), "");
/// ```
pub fn slugify(value: &str, allow_unicode: bool) -> String {
    let normalized: String = if allow_unicode {
        value.nfkc().collect()
    } else {
        value.nfkd().filter(char::is_ascii).collect()
    };
    let lowered = normalized.to_lowercase();
    let cleaned = disallowed().replace_all(&lowered, "");
    let collapsed = separators().replace_all(&cleaned, "-");
    collapsed.trim_matches(|c| c == '-' || c == '_').to_owned()
}
