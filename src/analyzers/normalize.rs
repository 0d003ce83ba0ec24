use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::TagResult;

/// Accents from the Combining Diacritical Marks block (U+0300..U+036F).
/// Marks of other scripts, such as kana voicing or Indic vowel signs, carry
/// meaning and are kept.
fn is_diacritical_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

/// Canonical comparison form of a string: lowercase with diacritics removed.
///
/// "Déjà Vu" becomes "deja vu". Characters without a decomposition are kept
/// as they are.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritical_mark(*c))
        .nfc()
        .collect()
}

/// Identity key for a file.
///
/// Uses `artist - title` when both tags are present and non-empty, otherwise
/// the file name without its extension.
pub fn identity_key(tags: Option<&TagResult>, path: &Path) -> String {
    match tags {
        Some(TagResult { artist, title }) if !artist.is_empty() && !title.is_empty() => {
            format!("{} - {}", normalize(artist), normalize(title))
        }
        _ => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy())
                .unwrap_or_default();
            normalize(&stem)
        }
    }
}
