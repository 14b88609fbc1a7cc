use super::scoring::window;
use regex::Regex;
use std::sync::LazyLock;

const CONNECTORS: [&str; 8] = [
    "therefore",
    "thus",
    "hence",
    "consequently",
    "because",
    "since",
    "as a result",
    "so",
];

const EVIDENCE_INDICATORS: [&str; 12] = [
    "because",
    "since",
    "as shown by",
    "based on",
    "according to",
    "evidence suggests",
    "data shows",
    "research indicates",
    "proven by",
    "demonstrated by",
    "verified through",
    "tested via",
];

const EXTERNAL_REFERENCES: [&str; 8] = [
    "research",
    "study",
    "paper",
    "documentation",
    "source",
    "reference",
    "literature",
    "data",
];

/// Bytes either side of an assertion searched for supporting evidence.
const EVIDENCE_WINDOW: usize = 200;

static ASSERTION_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"(?i)(must|should|will|always|never)\s+\w+",
        r"(?i)this\s+(is|will|would|could)\s+\w+",
        r"(?i)(?:therefore|thus|hence|consequently)\s+\w+",
        r"(?i)(?:because|since)\s+\w+",
    ]
    .map(|p| Regex::new(p).expect("valid assertion regex"))
});

static NUMERIC_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [r"\d+%", r"\d+\.\d+", r"\d+\s*(?:times|x)"]
        .map(|p| Regex::new(p).expect("valid numeric evidence regex"))
});

/// Whether `current` carries any connective tying it to the previous step.
pub fn has_logical_connection(current: &str) -> bool {
    let text = current.to_lowercase();
    CONNECTORS.iter().any(|c| text.contains(c))
}

/// Sentences (split on `.`) that make a claim.
///
/// Each qualifying sentence is returned once, trimmed of surrounding
/// punctuation with inner whitespace collapsed.
pub fn find_assertions(reasoning: &str) -> Vec<String> {
    assertion_sentences(reasoning)
        .map(|(_, assertion)| assertion)
        .collect()
}

/// Claim-making sentences as `(as written, cleaned)` pairs.
fn assertion_sentences(reasoning: &str) -> impl Iterator<Item = (&str, String)> {
    reasoning
        .split('.')
        .map(str::trim)
        .filter(|sentence| ASSERTION_PATTERNS.iter().any(|p| p.is_match(sentence)))
        .map(|sentence| (sentence, clean_assertion(sentence)))
        .filter(|(_, assertion)| !assertion.is_empty())
}

fn clean_assertion(sentence: &str) -> String {
    sentence
        .trim_matches(|c| matches!(c, '.' | ',' | '!' | '?' | ';' | ':'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the text around `assertion` inside `reasoning` backs it up.
///
/// Looks within 200 bytes either side for an evidence connective, a numeric
/// figure, or a reference to an external source. An assertion that cannot be
/// located is unsupported.
pub fn has_evidence_support(assertion: &str, reasoning: &str) -> bool {
    let text = reasoning.to_lowercase();
    let Some(position) = text.find(&assertion.to_lowercase()) else {
        return false;
    };

    let context = window(
        &text,
        position.saturating_sub(EVIDENCE_WINDOW),
        position + assertion.len() + EVIDENCE_WINDOW,
    );

    EVIDENCE_INDICATORS.iter().any(|i| context.contains(i))
        || contains_numerical_evidence(context)
        || contains_external_reference(context)
}

pub fn contains_numerical_evidence(text: &str) -> bool {
    NUMERIC_PATTERNS.iter().any(|p| p.is_match(text))
}

pub fn contains_external_reference(text: &str) -> bool {
    let text = text.to_lowercase();
    EXTERNAL_REFERENCES.iter().any(|r| text.contains(r))
}

/// Assertions in `reasoning` without nearby support.
///
/// Support is searched around the sentence as written, so collapsed
/// whitespace in the cleaned assertion does not hide it.
pub fn find_unsupported_assertions(reasoning: &str) -> Vec<String> {
    assertion_sentences(reasoning)
        .filter(|(sentence, _)| !has_evidence_support(sentence, reasoning))
        .map(|(_, assertion)| assertion)
        .collect()
}

/// Human-readable gap descriptions for `current`, given the previous step's
/// content if there is one.
pub fn find_logical_gaps(current: &str, previous: Option<&str>) -> Vec<String> {
    let mut gaps = Vec::new();

    if previous.is_some() && !has_logical_connection(current) {
        gaps.push("Missing connection to previous step".to_string());
    }

    let unsupported = find_unsupported_assertions(current);
    if !unsupported.is_empty() {
        gaps.push(format!("Unsupported assertions: {unsupported:?}"));
    }

    gaps
}
