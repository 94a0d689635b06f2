use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// Line-wrap hyphenation artifact: a word split as "theo- rem".
static HYPHEN_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w)-\s+(\w)").expect("Invalid hyphen break regex pattern")
});

/// Canonicalize reconstructed text: rejoin words broken by line-wrap
/// hyphenation, then apply NFKD so ligature glyphs ("ﬁ") fold back into
/// their letter sequences ("fi").
pub fn normalize(text: &str) -> String {
    let repaired = HYPHEN_BREAK_REGEX.replace_all(text, "${1}${2}");
    repaired.nfkd().collect()
}
