//! Search and sort folding applied to feed text at the normalization boundary.

use unicode_normalization::UnicodeNormalization;

/// Canonical decomposition, combining diacritics (U+0300..=U+036F) removed,
/// then lowercased. Used for accent-insensitive substring search.
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Best-effort surname for sorting, folded.
///
/// The feed only carries a display title such as `"Leopold II"` or
/// `"Maria Anna (nun)"`, so this strips a parenthesized suffix, drops everything
/// from the first comma on, and keeps the last whitespace-delimited token.
/// Non-parenthesized titles and regnal numerals are not recognised:
/// `"Leopold II"` sorts under `"ii"`.
pub fn surname_guess(full_name: &str) -> String {
    if full_name.is_empty() {
        return String::new();
    }

    let mut name = full_name.to_string();
    if let Some(open) = name.find('(') {
        if let Some(close) = name.rfind(')') {
            if close > open {
                name.replace_range(open..=close, "");
            }
        }
    }
    if let Some(comma) = name.find(',') {
        name.truncate(comma);
    }

    name.split_whitespace().last().map(fold).unwrap_or_default()
}
