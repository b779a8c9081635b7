//! Key path normalization.
//!
//! A stored entry is identified by an ordered key path: the locale segment,
//! then any scope segments, then the dotted key split on the separator.

/// Normalize a dotted key into its full key path.
///
/// The first segment is always the locale. Scope entries and the key itself
/// may contain the separator and are split the same way; empty segments are
/// dropped, so `"bar..baz"` and `"bar.baz"` normalize identically.
pub fn normalize_keys(locale: &str, key: &str, scope: &[String], separator: &str) -> Vec<String> {
    let mut segments = vec![locale.to_string()];
    for entry in scope {
        split_into(entry, separator, &mut segments);
    }
    split_into(key, separator, &mut segments);
    segments
}

fn split_into(key: &str, separator: &str, segments: &mut Vec<String>) {
    segments.extend(
        key.split(separator)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    );
}
