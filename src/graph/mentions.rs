use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(([a-z]\.)?\d+(\.\d+)*)").expect("Invalid numeral regex pattern")
});
static LINK_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<LINK:([^>]+)>").expect("Invalid link marker regex pattern")
});
static NON_WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W").expect("Invalid non-word regex pattern"));

/// How many space-separated tokens on each side of a mention are searched
/// for a link marker.
const WINDOW: usize = 5;

const DEFAULT_KEYWORDS: &[&str] = &[
    "theorem",
    "lemma",
    "proposition",
    "corollary",
    "definition",
    "remark",
    "claim",
    "conjecture",
    "thm.",
    "lem.",
    "prop.",
];

const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("thm.", "theorem"),
    ("lem.", "lemma"),
    ("prop.", "proposition"),
];

/// Everything found by one scan of a block's text: the deduplicated mention
/// strings and their classified in-document / cross-document references
/// (extra references pair the nearby link tag with the expanded name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub mentions: Vec<String>,
    pub intra: Vec<String>,
    pub extra: Vec<(String, String)>,
}

/// The immutable keyword configuration of the mention scanner: result
/// keywords (long forms and dotted abbreviations), the abbreviation
/// expansion table, and the regexes compiled from them.
pub struct RefLexicon {
    abbreviations: HashMap<String, String>,
    mention_regex: Regex,
    link_tag_regex: Regex,
}

impl Default for RefLexicon {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            DEFAULT_ABBREVIATIONS
                .iter()
                .map(|(a, f)| (a.to_string(), f.to_string()))
                .collect(),
        )
    }
}

impl RefLexicon {
    /// Build the scanner configuration. Every dotted keyword must carry an
    /// expansion in `abbreviations`.
    pub fn new(keywords: Vec<String>, abbreviations: HashMap<String, String>) -> Self {
        for keyword in &keywords {
            if keyword.ends_with('.') {
                assert!(
                    abbreviations.contains_key(keyword.as_str()),
                    "abbreviated keyword {keyword:?} has no expansion"
                );
            }
        }

        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let mention_regex = Regex::new(&format!(
            r"(?i)(?P<kw>{alternation})(s)? (([a-z]\.)?\d+(\.\d+)*(#in)?(\s?(?P<mul>and|,|&) ([a-z]\.)?\d+(\.\d+)*(#in)?)*)"
        ))
        .expect("Invalid mention regex pattern");

        // Link tags are stripped of non-word characters before this test,
        // so dotted abbreviations contribute their bare stems.
        let tag_keywords = keywords
            .iter()
            .map(|k| regex::escape(k.trim_end_matches('.')))
            .chain(["section".to_string(), "algorithm".to_string()])
            .collect::<Vec<_>>()
            .join("|");
        let link_tag_regex = Regex::new(&format!(r"(?i)({tag_keywords})([a-z])?\d+"))
            .expect("Invalid link tag regex pattern");

        RefLexicon {
            abbreviations,
            mention_regex,
            link_tag_regex,
        }
    }

    /// Scan `text` for reference mentions and classify each occurrence as
    /// in-document or cross-document.
    ///
    /// A mention equal to `context` (the name of the surrounding result) is
    /// dropped as a self-reference. An occurrence carrying the `#in` marker
    /// is in-document by construction. Otherwise the nearest link marker
    /// within five tokens on either side decides: no marker means
    /// in-document (the common case), a marker whose tag echoes the mention
    /// or names a result/section/algorithm is in-document too, and any
    /// other tag is a cross-document reference to that tag.
    pub fn find_references(&self, context: Option<&str>, text: &str) -> ScanOutcome {
        let context = context.unwrap_or("");
        let mut outcome = ScanOutcome::default();

        for cap in self.mention_regex.captures_iter(text) {
            let raw = cap.get(0).unwrap().as_str();
            let keyword = cap.name("kw").unwrap().as_str();
            let is_multiple = cap.name("mul").is_some();
            let mention = raw.replace("#in", "");

            if outcome.mentions.iter().any(|m| m == &mention)
                || mention.eq_ignore_ascii_case(context)
            {
                continue;
            }
            outcome.mentions.push(mention.clone());

            for occurrence in locate_occurrences(text, &mention) {
                if occurrence.has_marker {
                    outcome
                        .intra
                        .extend(self.expand(keyword, is_multiple, &mention));
                    continue;
                }
                match occurrence.nearest_link_tag() {
                    Some(tag) => {
                        let tag = NON_WORD_REGEX.replace_all(&tag, "").to_string();
                        let cleaned_mention =
                            NON_WORD_REGEX.replace_all(&mention, "").to_string();
                        if tag == cleaned_mention || self.link_tag_regex.is_match(&tag) {
                            outcome
                                .intra
                                .extend(self.expand(keyword, is_multiple, &mention));
                        } else {
                            for name in self.expand(keyword, is_multiple, &mention) {
                                outcome.extra.push((tag.clone(), name));
                            }
                        }
                    }
                    None => {
                        outcome
                            .intra
                            .extend(self.expand(keyword, is_multiple, &mention));
                    }
                }
            }
        }

        outcome
    }

    /// Expand a mention into one reference name per numeric id. Dotted
    /// keywords are rewritten to their long form; multi-number lists keep
    /// the keyword as matched; a plain single mention passes through
    /// lowercased.
    fn expand(&self, keyword: &str, is_multiple: bool, mention: &str) -> Vec<String> {
        if keyword.ends_with('.') {
            let full = self
                .abbreviations
                .get(&keyword.to_lowercase())
                .map(String::as_str)
                .unwrap_or(keyword);
            numerals(mention)
                .into_iter()
                .map(|num| format!("{full} {num}"))
                .collect()
        } else if is_multiple {
            numerals(mention)
                .into_iter()
                .map(|num| format!("{keyword} {num}"))
                .collect()
        } else {
            vec![mention.to_lowercase()]
        }
    }
}

fn numerals(text: &str) -> Vec<String> {
    NUMERAL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// One occurrence of a mention in the scanned text, with its `#in` marker
/// flag and the surrounding window tokens ordered nearest first.
struct Occurrence {
    has_marker: bool,
    before: Vec<String>,
    after: Vec<String>,
}

impl Occurrence {
    /// The tag of the closest link marker, alternating between the
    /// preceding and following tokens at increasing distance.
    fn nearest_link_tag(&self) -> Option<String> {
        for dist in 0..WINDOW {
            for side in [&self.before, &self.after] {
                if let Some(token) = side.get(dist) {
                    if let Some(cap) = LINK_MARKER_REGEX.captures(token) {
                        return Some(cap[1].to_string());
                    }
                }
            }
        }
        None
    }
}

/// Every occurrence of `mention` in `text`, each with its window of up to
/// five full tokens on either side. A partial word touching the mention is
/// excluded from the window; occurrences whose numeric tail continues
/// (`Theorem 3.1` inside `Theorem 3.12`) are skipped.
fn locate_occurrences(text: &str, mention: &str) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    if mention.is_empty() {
        return occurrences;
    }

    let mut from = 0;
    while let Some(rel) = text[from..].find(mention) {
        let start = from + rel;
        let mut end = start + mention.len();
        from = end;

        let has_marker = text[end..].starts_with("#in");
        if has_marker {
            end += 3;
        }

        let rest = &text[end..];
        let mut chars = rest.chars();
        let first = chars.next();
        let continues_numeric = match first {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        };
        if continues_numeric {
            continue;
        }

        let mut before: Vec<String> = text[..start].split(' ').map(str::to_string).collect();
        before.pop();
        let before: Vec<String> = before.into_iter().rev().take(WINDOW).collect();

        let after: Vec<String> = rest
            .split(' ')
            .skip(1)
            .take(WINDOW)
            .map(str::to_string)
            .collect();

        occurrences.push(Occurrence {
            has_marker,
            before,
            after,
        });
    }

    occurrences
}
