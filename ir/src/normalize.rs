//! Text canonicalization shared by every matcher

/// Single-character Korean particles dropped from the end of a search term
const TRAILING_PARTICLES: [char; 8] = ['은', '는', '이', '가', '을', '를', '와', '과'];

/// Comparison key: lowercase with all whitespace removed
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trim and remove one trailing grammatical particle ("해운대는" -> "해운대")
pub fn strip_trailing_particle(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.chars().last() {
        Some(c) if TRAILING_PARTICLES.contains(&c) => trimmed[..trimmed.len() - c.len_utf8()].trim_end(),
        _ => trimmed,
    }
}
