//! Fixed keyword vocabularies for edit-intent detection
//!
//! Each vocabulary compiles once into a single alternation. Hangul keywords
//! match as plain substrings (particles and verb endings attach directly to
//! them); ASCII keywords match on word boundaries so "add" never fires inside
//! "address".

use once_cell::sync::Lazy;
use regex::Regex;

const ADD_WORDS: &[&str] = &[
    "추가",
    "추가해",
    "추가해줘",
    "넣어",
    "넣어줘",
    "넣어줘요",
    "넣고",
    "배치",
    "포함",
    "add",
    "include",
    "insert",
    "put",
    "append",
    "move",
];

const REMOVE_WORDS: &[&str] = &[
    "빼줘",
    "빼주고",
    "빼고",
    "빼",
    "삭제",
    "삭제해",
    "제거",
    "제외",
    "없애",
    "지워",
    "remove",
    "delete",
    "drop",
    "skip",
    "exclude",
    "cancel",
    "take out",
    "get rid of",
];

const EDIT_ONLY_WORDS: &[&str] = &[
    "수정",
    "변경",
    "교체",
    "바꿔",
    "옮겨",
    "순서",
    "change",
    "replace",
    "swap",
    "switch",
    "modify",
    "edit",
    "reorder",
    "rearrange",
];

/// Whitespace-free trigger phrases, matched against [`crate::normalize`]d text
const REPLAN_WORDS: &[&str] = &[
    "처음부터",
    "완전히새로",
    "전부새로",
    "다시만들",
    "다시짜",
    "재생성",
    "새일정",
    "startover",
    "fromscratch",
    "replan",
    "regenerate",
    "brandnew",
    "newitinerary",
    "newplan",
];

/// A compiled keyword set
pub struct Vocabulary {
    words: Vec<&'static str>,
    pattern: Regex,
}

impl Vocabulary {
    fn new(words: Vec<&'static str>) -> Self {
        Self {
            pattern: alternation(&words),
            words,
        }
    }

    /// True when any keyword occurs in the text
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Replace every keyword occurrence with a space
    pub fn strip(&self, text: &str) -> String {
        self.pattern.replace_all(text, " ").into_owned()
    }

    /// The keywords in declaration order
    pub fn words(&self) -> &[&'static str] {
        &self.words
    }
}

/// Build a case-insensitive alternation, longest keyword first so a longer
/// form ("넣어줘") is consumed whole before its prefix ("넣어")
fn alternation(words: &[&'static str]) -> Regex {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));

    let branches: Vec<String> = sorted
        .iter()
        .map(|w| {
            let escaped = regex::escape(w).replace(' ', r"\s+");
            if w.is_ascii() {
                format!(r"\b{}\b", escaped)
            } else {
                escaped
            }
        })
        .collect();

    // Keywords are static literals; an invalid pattern here is a programming error
    Regex::new(&format!("(?i)(?:{})", branches.join("|"))).expect("keyword vocabulary must compile")
}

/// Add-intent keywords
pub static ADD: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(ADD_WORDS.to_vec()));

/// Remove-intent keywords
pub static REMOVE: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(REMOVE_WORDS.to_vec()));

/// Add and remove keywords together, in the order the target cleaner strips them
pub static ADD_OR_REMOVE: Lazy<Vocabulary> =
    Lazy::new(|| Vocabulary::new(REMOVE_WORDS.iter().chain(ADD_WORDS).copied().collect()));

/// Any edit keyword: add, remove, or a generic change verb
pub static EDIT: Lazy<Vocabulary> = Lazy::new(|| {
    let mut words: Vec<&'static str> = Vec::new();
    for w in ADD_WORDS.iter().chain(REMOVE_WORDS).chain(EDIT_ONLY_WORDS) {
        if !words.contains(w) {
            words.push(w);
        }
    }
    Vocabulary::new(words)
});

/// True when normalized text contains a full-replan trigger
pub fn contains_replan_trigger(normalized: &str) -> bool {
    REPLAN_WORDS.iter().any(|w| normalized.contains(w))
}
