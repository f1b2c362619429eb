//! Edit-intent extraction
//!
//! Turns a free-form instruction ("광안리 빼고 2째날에 해운대 넣어줘",
//! "remove Haeundae Beach, add Gamcheon Culture Village to day 2") into a
//! list of [`EditIntent`]s. Recognition is keyword and pattern based over a
//! small closed set of intents.
//!
//! Per chunk the priority is fixed: replace > remove > add. A chunk that
//! contains both remove and add keywords without the replace shape is read as
//! a removal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::normalize::{normalize, strip_trailing_particle};
use crate::vocab;

/// One classified user request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EditIntent {
    /// Drop every visit matching the term
    Remove { term: String },
    /// Add (or relocate) the best candidate for the term, optionally on a zero-based day
    Add { day: Option<usize>, term: String },
    /// Remove `old` and add `new`
    Replace {
        old: String,
        new: String,
        day: Option<usize>,
    },
}

/// Keyword membership of one chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkClass {
    pub has_remove: bool,
    pub has_add: bool,
}

/// "verb + connective" idioms rewritten into an explicit delimiter before splitting
const IDIOM_REWRITES: &[(&str, &str)] = &[
    ("빼주고", "빼,"),
    ("빼고", "빼,"),
    ("제외하고", "제외,"),
    ("삭제하고", "삭제,"),
    ("제거하고", "제거,"),
    ("없애고", "없애,"),
    ("넣고", "넣어,"),
    ("추가하고", "추가,"),
    ("배치하고", "배치,"),
];

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern must compile")
}

static ENGLISH_IDIOMS: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)\b(?:and\s+then|and\s+also)\b"));

static DELIMITERS: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)(?:,|;|\n|/|그리고|또한|또|및|\band\b|\balso\b|\bthen\b)"));

/// "2일차", "3째날에", "1일"
static DAY_KO: Lazy<Regex> =
    Lazy::new(|| pattern(r"([0-9]+)\s*(?:일차|일째|째날|일)\s*(?:에|날에)?"));

/// "to day 2", "on day 3"
static DAY_EN: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)(?:\b(?:to|on|in|into|onto|for)\s+)?(?:the\s+)?\bday\s*([0-9]+)\b")
});

/// "on the 2nd day"
static DAY_EN_NUMERIC_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)(?:\b(?:to|on|in|into|onto|for)\s+)?(?:the\s+)?\b([0-9]+)\s*(?:st|nd|rd|th)\s+day\b")
});

/// "on the second day"
static DAY_EN_WORD_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)(?:\b(?:to|on|in|into|onto|for)\s+)?(?:the\s+)?\b(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth)\s+day\b",
    )
});

const ORDINAL_WORDS: [&str; 10] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

/// "해운대를 광안리로 바꿔줘" with a space after the object marker
static REPLACE_KO_SPACED: Lazy<Regex> =
    Lazy::new(|| pattern(r"(.+?)(?:을|를)\s+(.+?)\s*(?:으로|로)\s*(?:바꿔|교체|변경)"));

/// Same shape written without spaces
static REPLACE_KO_COMPACT: Lazy<Regex> =
    Lazy::new(|| pattern(r"(.+?)\s*(?:을|를)\s*(.+?)\s*(?:으로|로)\s*(?:바꿔|교체|변경)"));

/// "replace A with B", "swap A for B"
static REPLACE_EN: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:replace|swap|switch)\s+(.+?)\s+(?:with|for|by)\s+(.+)"));

/// "change A to B"
static CHANGE_EN: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)\bchange\s+(.+?)\s+(?:to|into)\s+(.+)"));

static POLITENESS_KO: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?:해주시고|해주세요|해줘요|해주고|해줘|줘요|하고|줘|좀)"));

static POLITENESS_EN: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:please|pls|kindly|can\s+you|could\s+you|would\s+you|will\s+you|i\s+want\s+to|i'd\s+like\s+to|i\s+would\s+like\s+to|let's|for\s+me)\b",
    )
});

/// "... to my itinerary", "... from the plan"
static ITINERARY_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:to|into|in|on|from|of|off)\s+(?:the\s+|my\s+|our\s+|this\s+)?(?:itinerary|plan|schedule|trip|list)\b",
    )
});

static LEADING_ARTICLE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^(?:the|a|an)\s+"));

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’'];

const TRAILING_PUNCTUATION: &[char] = &['.', '!', '?', '~', '…'];

/// Split an instruction into independent edit chunks, in original order
pub fn split_edit_chunks(text: &str) -> Vec<String> {
    let mut rewritten = text.to_string();
    for (idiom, replacement) in IDIOM_REWRITES {
        rewritten = rewritten.replace(idiom, replacement);
    }
    let rewritten = ENGLISH_IDIOMS.replace_all(&rewritten, ",");

    DELIMITERS
        .split(&rewritten)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zero-based day index named in a chunk ("2일차", "day 2", "2nd day", "second day")
pub fn extract_day_index(chunk: &str) -> Option<usize> {
    let number = DAY_KO
        .captures(chunk)
        .or_else(|| DAY_EN.captures(chunk))
        .or_else(|| DAY_EN_NUMERIC_ORDINAL.captures(chunk))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .or_else(|| {
            DAY_EN_WORD_ORDINAL.captures(chunk).and_then(|caps| {
                let word = caps.get(1)?.as_str().to_lowercase();
                ORDINAL_WORDS.iter().position(|w| *w == word).map(|i| i + 1)
            })
        })?;

    Some(number.saturating_sub(1))
}

/// Keyword membership for a chunk
pub fn classify_chunk(chunk: &str) -> ChunkClass {
    ChunkClass {
        has_remove: vocab::REMOVE.is_match(chunk),
        has_add: vocab::ADD.is_match(chunk),
    }
}

/// Recognize "A를 B로 바꿔" / "replace A with B" / "change A to B".
///
/// Returns the cleaned old and new terms plus the day index named anywhere in
/// the chunk. Either term may be empty after cleaning.
pub fn detect_replace(chunk: &str) -> Option<(String, String, Option<usize>)> {
    // The Korean shapes consume the object and direction markers themselves,
    // so a trailing 을/이/... in a capture belongs to the name ("감천문화마을").
    let (caps, clean): (_, fn(&str) -> String) = if let Some(caps) = REPLACE_KO_SPACED
        .captures(chunk)
        .or_else(|| REPLACE_KO_COMPACT.captures(chunk))
    {
        (caps, clean_target_words)
    } else {
        let caps = REPLACE_EN.captures(chunk).or_else(|| CHANGE_EN.captures(chunk))?;
        (caps, clean_edit_target)
    };

    let old = clean(caps.get(1).map_or("", |m| m.as_str()));
    let new = clean(caps.get(2).map_or("", |m| m.as_str()));
    let day = extract_day_index(chunk);
    debug!(%chunk, %old, %new, ?day, "detect_replace: matched");
    Some((old, new, day))
}

/// Reduce a chunk to the place the user is naming
pub fn clean_edit_target(text: &str) -> String {
    strip_trailing_particle(&clean_target_words(text)).to_string()
}

/// [`clean_edit_target`] without the trailing-particle step
fn clean_target_words(text: &str) -> String {
    let mut target = text.to_string();
    for pattern in [&*DAY_KO, &*DAY_EN, &*DAY_EN_NUMERIC_ORDINAL, &*DAY_EN_WORD_ORDINAL] {
        target = pattern.replace_all(&target, " ").into_owned();
    }
    target = vocab::ADD_OR_REMOVE.strip(&target);
    target = POLITENESS_KO.replace_all(&target, " ").into_owned();
    target = POLITENESS_EN.replace_all(&target, " ").into_owned();
    target = ITINERARY_REFERENCE.replace_all(&target, " ").into_owned();
    target = target.replace(QUOTE_CHARS, " ");

    let collapsed = target.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = LEADING_ARTICLE.replace(&collapsed, "");
    collapsed.trim_end_matches(TRAILING_PUNCTUATION).trim().to_string()
}

/// True when the text carries an add keyword
pub fn has_add_intent(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && vocab::ADD.is_match(text)
}

/// True when the text carries any edit keyword (add, remove, or change)
pub fn has_edit_intent(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && vocab::EDIT.is_match(text)
}

/// True when the text asks for the whole itinerary to be rebuilt
pub fn has_replan_intent(text: &str) -> bool {
    let key = normalize(text);
    !key.is_empty() && vocab::contains_replan_trigger(&key)
}

/// Whether an instruction should be tried as a local edit.
///
/// Replan intent wins over edit intent: "처음부터 다시 짜고 해운대는 빼줘"
/// always goes to full regeneration.
pub fn wants_local_edit(text: &str) -> bool {
    !has_replan_intent(text) && has_edit_intent(text)
}

/// True when applying the instruction may place a visit taken from the
/// candidate list (any add or replace request)
pub fn needs_candidates(text: &str) -> bool {
    extract_intents(text)
        .iter()
        .any(|intent| matches!(intent, EditIntent::Add { .. } | EditIntent::Replace { .. }))
}

/// Extract every intent from an instruction, in chunk order
pub fn extract_intents(text: &str) -> Vec<EditIntent> {
    debug!(text_len = text.len(), "extract_intents: called");
    let mut intents = Vec::new();

    for chunk in split_edit_chunks(text) {
        if let Some((old, new, day)) = detect_replace(&chunk) {
            match (old.is_empty(), new.is_empty()) {
                (false, false) => intents.push(EditIntent::Replace { old, new, day }),
                (false, true) if day.is_some() => {
                    // "change A to day 2": a relocation
                    intents.push(EditIntent::Add { day, term: old });
                }
                (false, true) => intents.push(EditIntent::Remove { term: old }),
                (true, false) => intents.push(EditIntent::Add { day, term: new }),
                (true, true) => {}
            }
            continue;
        }

        let class = classify_chunk(&chunk);
        if class.has_remove {
            let term = clean_edit_target(&chunk);
            if !term.is_empty() {
                intents.push(EditIntent::Remove { term });
            }
        } else if class.has_add {
            let term = clean_edit_target(&chunk);
            if !term.is_empty() {
                intents.push(EditIntent::Add {
                    day: extract_day_index(&chunk),
                    term,
                });
            }
        } else {
            debug!(%chunk, "extract_intents: no keyword in chunk");
        }
    }

    debug!(count = intents.len(), "extract_intents: done");
    intents
}
