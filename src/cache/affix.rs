//! Idempotent, overlap-aware filename affixes
//!
//! An affix that is already (partially) present is completed instead of
//! duplicated: `"_baz"` with prefix `"foo_bar_"` becomes `"foo_bar_baz"`.

/// Part of `prefix` that is not already present at the start of `s`.
///
/// The longest suffix of `prefix` that `s` starts with counts as present.
fn prefix_to_add<'p>(s: &str, prefix: &'p str) -> &'p str {
    for (start, _) in prefix.char_indices() {
        if s.starts_with(&prefix[start..]) {
            return &prefix[..start];
        }
    }
    prefix
}

/// Mirror image of [`prefix_to_add`]
fn suffix_to_add<'x>(s: &str, suffix: &'x str) -> &'x str {
    let mut end = suffix.len();
    while end > 0 {
        if s.ends_with(&suffix[..end]) {
            return &suffix[end..];
        }
        end = suffix[..end]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
    }
    suffix
}

pub fn with_prefix(s: &str, prefix: &str) -> String {
    let add = prefix_to_add(s, prefix);
    let mut out = String::with_capacity(add.len() + s.len());
    out.push_str(add);
    out.push_str(s);
    out
}

pub fn with_suffix(s: &str, suffix: &str) -> String {
    let add = suffix_to_add(s, suffix);
    let mut out = String::with_capacity(s.len() + add.len());
    out.push_str(s);
    out.push_str(add);
    out
}

/// Both affixes, each measured against the original `s`
pub fn with_prefix_and_suffix(s: &str, prefix: &str, suffix: &str) -> String {
    let prefix = prefix_to_add(s, prefix);
    let suffix = suffix_to_add(s, suffix);
    let mut out = String::with_capacity(prefix.len() + s.len() + suffix.len());
    out.push_str(prefix);
    out.push_str(s);
    out.push_str(suffix);
    out
}
