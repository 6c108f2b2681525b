use bricklink_backup_core::slugify::slugify;

#[test]
fn test_slugify_strips_punctuation_and_joins_words() {
    assert_eq!(slugify("My Backup: 2024!", false), "my-backup-2024");
}

#[test]
fn test_slugify_backup_file_name() {
    assert_eq!(
        slugify("10-17-2026-14-03-09 - Bricklink Backup", false),
        "10-17-2026-14-03-09-bricklink-backup"
    );
}

#[test]
fn test_slugify_empty_string_is_empty() {
    assert_eq!(slugify("", false), "");
    assert_eq!(slugify("", true), "");
}

#[test]
fn test_slugify_collapses_whitespace_and_hyphen_runs() {
    assert_eq!(slugify("a  --  b\t\nc", false), "a-b-c");
}

#[test]
fn test_slugify_trims_leading_and_trailing_hyphens_and_underscores() {
    assert_eq!(slugify("__-hello world-__", false), "hello-world");
    assert_eq!(slugify("---", false), "");
}

#[test]
fn test_slugify_keeps_inner_underscores() {
    assert_eq!(slugify("snake_case name", false), "snake_case-name");
}

#[test]
fn test_slugify_ascii_mode_drops_accents_and_non_ascii() {
    assert_eq!(slugify("Café Crème", false), "cafe-creme");
    assert_eq!(slugify("日本 set", false), "set");
}

#[test]
fn test_slugify_unicode_mode_keeps_letters() {
    assert_eq!(slugify("Café Crème", true), "café-crème");
    assert_eq!(slugify("日本 set", true), "日本-set");
}
