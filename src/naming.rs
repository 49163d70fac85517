//! Display titles and URL-safe identifiers derived from filesystem names.
//!
//! Every entity in the manifest is named after something on disk: a spot
//! directory (`lake_toya-sunset/`), a food directory (`ramen-shingen/`), or a
//! stray image (`blue-pond.jpg`). This module turns those raw names into the
//! two strings the presentation layer needs:
//!
//! - a **display title** (`Lake Toya Sunset`) via [`titleize`]
//! - an **identifier** (`lake-toya-sunset`) via [`slugify`], safe as a path
//!   segment and as a DOM id
//!
//! ## Script awareness
//!
//! Word capitalization only makes sense for alphabetic scripts. Names written
//! in Han, Hiragana or Katakana (`洞爺湖`, `すすきの`) are detected with
//! [`has_script_markers`] and passed through untouched by [`titleize`].
//! [`slugify`] keeps them as well, because it filters on Unicode letter and
//! number classes rather than ASCII.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Strip a trailing `.ext` suffix where `ext` is one or more ASCII
/// alphanumerics. Names without such a suffix are returned unchanged.
///
/// - `"cover.jpg"` → `"cover"`
/// - `"cover-800.webp"` → `"cover-800"`
/// - `"notes."` → `"notes."`
/// - `".hidden"` → `""`
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) => {
            let ext = &name[pos + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                &name[..pos]
            } else {
                name
            }
        }
        None => name,
    }
}

/// True if `text` contains any Han, Hiragana or Katakana character.
pub fn has_script_markers(text: &str) -> bool {
    text.chars().any(is_cjk)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        // Han: radicals, iteration/number marks, ideographs and extensions
        0x2E80..=0x2FDF
        | 0x3005
        | 0x3007
        | 0x3021..=0x3029
        | 0x3038..=0x303B
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x323AF
        // Hiragana
        | 0x3041..=0x309F
        | 0x1B001..=0x1B11F
        // Katakana, incl. phonetic extensions and half-width forms
        | 0x30A1..=0x30FF
        | 0x31F0..=0x31FF
        | 0x32D0..=0x32FE
        | 0x3300..=0x3357
        | 0xFF66..=0xFF9D
        | 0x1B000
    )
}

/// True for Unicode letters and numbers. Combining marks are excluded even
/// where Unicode counts them as alphabetic (the vowel sign in `हि`).
pub fn is_letter_or_number(c: char) -> bool {
    c.is_alphanumeric() && !is_combining_mark(c)
}

/// Turn a raw file or directory name into a display title.
///
/// The extension is dropped first. CJK names are returned as-is; everything
/// else has `_`/`-` runs replaced by a single space and the first letter of
/// every whitespace-delimited word uppercased.
///
/// - `"lake_toya-sunset"` → `"Lake Toya Sunset"`
/// - `"blue-pond.jpg"` → `"Blue Pond"`
/// - `"小樽運河.jpg"` → `"小樽運河"`
pub fn titleize(raw: &str) -> String {
    let base = strip_extension(raw);
    if has_script_markers(base) {
        return base.to_string();
    }

    let mut spaced = String::with_capacity(base.len());
    let mut in_separator = false;
    for c in base.chars() {
        if c == '_' || c == '-' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    let mut title = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        if word_start && !c.is_whitespace() {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        word_start = c.is_whitespace();
    }
    title
}

/// Turn arbitrary text into a lowercase, hyphen-separated identifier.
///
/// Steps: NFKC normalization, extension strip, trim, whitespace/underscore
/// runs → `-`, drop everything that is not a Unicode letter, number or `-`,
/// collapse repeated `-`, trim `-` at both ends, lowercase.
///
/// The result is idempotent (`slugify(slugify(x)) == slugify(x)`). Empty or
/// all-punctuation input yields `""`; callers that derive identities from
/// slugs must handle that case.
pub fn slugify(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    let base = strip_extension(&normalized).trim();

    let mut slug = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if is_letter_or_number(c) {
            // Lowercasing can yield combining marks (e.g. `İ`)
            slug.extend(c.to_lowercase().filter(|&l| is_letter_or_number(l)));
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // strip_extension
    // =========================================================================

    #[test]
    fn strip_extension_removes_simple_suffix() {
        assert_eq!(strip_extension("cover.jpg"), "cover");
        assert_eq!(strip_extension("cover-800.webp"), "cover-800");
        assert_eq!(strip_extension("Photo.JPEG"), "Photo");
    }

    #[test]
    fn strip_extension_only_removes_last_suffix() {
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn strip_extension_keeps_names_without_suffix() {
        assert_eq!(strip_extension("lake_toya"), "lake_toya");
        assert_eq!(strip_extension("notes."), "notes.");
        assert_eq!(strip_extension("v1.5-beta"), "v1.5-beta");
    }

    // =========================================================================
    // has_script_markers
    // =========================================================================

    #[test]
    fn detects_han() {
        assert!(has_script_markers("洞爺湖"));
        assert!(has_script_markers("Otaru 小樽"));
    }

    #[test]
    fn detects_kana() {
        assert!(has_script_markers("すすきの"));
        assert!(has_script_markers("ラーメン"));
        assert!(has_script_markers("ﾗｰﾒﾝ"));
    }

    #[test]
    fn latin_and_hangul_have_no_markers() {
        assert!(!has_script_markers("Sapporo"));
        assert!(!has_script_markers("München café"));
        assert!(!has_script_markers("서울"));
        assert!(!has_script_markers(""));
    }

    // =========================================================================
    // titleize
    // =========================================================================

    #[test]
    fn titleize_separators_become_spaces() {
        assert_eq!(titleize("lake_toya-sunset"), "Lake Toya Sunset");
        assert_eq!(titleize("a__b--c"), "A B C");
    }

    #[test]
    fn titleize_strips_extension() {
        assert_eq!(titleize("blue-pond.jpg"), "Blue Pond");
    }

    #[test]
    fn titleize_keeps_existing_capitals() {
        assert_eq!(titleize("JR_tower"), "JR Tower");
    }

    #[test]
    fn titleize_leaves_cjk_untouched() {
        assert_eq!(titleize("小樽運河.jpg"), "小樽運河");
        assert_eq!(titleize("白い_恋人"), "白い_恋人");
    }

    #[test]
    fn titleize_capitalizes_non_ascii_initials() {
        assert_eq!(titleize("école-du-lac"), "École Du Lac");
    }

    #[test]
    fn titleize_empty() {
        assert_eq!(titleize(""), "");
    }

    // =========================================================================
    // slugify
    // =========================================================================

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Lake Toya Sunset"), "lake-toya-sunset");
        assert_eq!(slugify("ramen_shingen"), "ramen-shingen");
    }

    #[test]
    fn slugify_strips_extension_and_punctuation() {
        assert_eq!(slugify("Blue Pond!.jpg"), "blue-pond");
        assert_eq!(slugify("Tom's  Café"), "toms-café");
    }

    #[test]
    fn slugify_collapses_and_trims_hyphens() {
        assert_eq!(slugify("  --a - b--  "), "a-b");
        assert_eq!(slugify("a!-!-!b"), "a-b");
    }

    #[test]
    fn slugify_keeps_cjk_letters() {
        assert_eq!(slugify("小樽 運河"), "小樽-運河");
    }

    #[test]
    fn slugify_applies_nfkc() {
        // Full-width latin and digits fold to ASCII
        assert_eq!(slugify("ＡＢＣ　１２３"), "abc-123");
    }

    #[test]
    fn slugify_empty_for_punctuation_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slugify_drops_combining_marks_from_lowercasing() {
        assert_eq!(slugify("İstanbul"), "istanbul");
    }

    #[test]
    fn slugify_drops_spacing_and_nonspacing_marks() {
        // U+093F is a spacing vowel sign that Unicode also counts as alphabetic
        assert_eq!(slugify("कि ताब"), "क-तब");
        assert_eq!(slugify("e\u{301}te\u{301}"), "été");
    }

    #[test]
    fn letter_or_number_classes() {
        assert!(is_letter_or_number('a'));
        assert!(is_letter_or_number('洞'));
        assert!(is_letter_or_number('٣'));
        assert!(!is_letter_or_number('\u{93F}'));
        assert!(!is_letter_or_number('\u{301}'));
        assert!(!is_letter_or_number('-'));
    }

    #[test]
    fn slugify_is_idempotent() {
        let inputs = [
            "Lake Toya Sunset",
            "Blue Pond!.jpg",
            "  --a - b--  ",
            "小樽 運河",
            "ＡＢＣ　１２３",
            "İstanbul",
            "Tom's  Café",
            "कि ताब",
            "v1.5 release",
            "",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
        }
    }
}
