//! Fixed keyword rubric used to compare a step against its alternatives.
//!
//! Every scorer is a pure function of the lowercased text and returns a value
//! in `[0, 1]`.

use crate::stakeholders::AggregatedPreferences;

const COMPLETENESS_WEIGHT: f64 = 0.25;
const ACTIONABILITY_WEIGHT: f64 = 0.20;
const EFFICIENCY_WEIGHT: f64 = 0.15;
const RISK_WEIGHT: f64 = 0.15;
const ALIGNMENT_WEIGHT: f64 = 0.25;

const COMPLETENESS_TERMS: [&str; 12] = [
    "problem",
    "challenge",
    "requirement",
    "solution",
    "implement",
    "method",
    "verify",
    "validate",
    "test",
    "result",
    "outcome",
    "impact",
];

const ACTIONABILITY_TERMS: [(&str, f64); 9] = [
    ("implement", 0.15),
    ("create", 0.15),
    ("deploy", 0.15),
    ("configure", 0.15),
    ("first", 0.1),
    ("then", 0.1),
    ("finally", 0.1),
    ("using", 0.05),
    ("requires", 0.05),
];

const EFFICIENCY_POSITIVE: [&str; 6] = [
    "optimize",
    "efficient",
    "streamline",
    "reuse",
    "leverage",
    "automate",
];

const EFFICIENCY_NEGATIVE: [&str; 5] = [
    "complex",
    "manual",
    "repetitive",
    "expensive",
    "time-consuming",
];

const RISK_TERMS: [(&str, f64); 9] = [
    ("risk", 0.2),
    ("challenge", 0.2),
    ("issue", 0.2),
    ("mitigate", 0.3),
    ("prevent", 0.3),
    ("handle", 0.3),
    ("backup", 0.2),
    ("alternative", 0.2),
    ("fallback", 0.2),
];

const PREFERENCE_IMPORTANCE: [(&str, f64); 6] = [
    ("performance", 1.0),
    ("security", 1.0),
    ("cost", 0.8),
    ("efficiency", 0.8),
    ("usability", 0.7),
    ("quality", 0.7),
];
const DEFAULT_PREFERENCE_IMPORTANCE: f64 = 0.5;

const POSITIVE_INDICATORS: [&str; 9] = [
    "improve", "enhance", "increase", "better", "optimal", "efficient", "high", "strong", "robust",
];

const NEGATIVE_INDICATORS: [&str; 9] = [
    "reduce",
    "decrease",
    "lower",
    "worse",
    "poor",
    "weak",
    "low",
    "slow",
    "compromise",
];

/// Bytes either side of a preference mention searched for indicators.
const INDICATOR_WINDOW: usize = 50;

#[allow(clippy::cast_precision_loss)]
fn fraction_present(text: &str, terms: &[&str]) -> f64 {
    let hits = terms.iter().filter(|t| text.contains(*t)).count();
    hits as f64 / terms.len() as f64
}

fn weighted_presence(text: &str, terms: &[(&str, f64)]) -> f64 {
    terms
        .iter()
        .filter(|(t, _)| text.contains(t))
        .map(|(_, w)| w)
        .sum::<f64>()
        .min(1.0)
}

/// Share of the twelve problem/solution/validation/outcome terms present.
pub fn score_completeness(approach: &str) -> f64 {
    fraction_present(&approach.to_lowercase(), &COMPLETENESS_TERMS)
}

pub fn score_actionability(approach: &str) -> f64 {
    weighted_presence(&approach.to_lowercase(), &ACTIONABILITY_TERMS)
}

/// Positive efficiency share minus negative share, floored at zero.
pub fn score_efficiency(approach: &str) -> f64 {
    let text = approach.to_lowercase();
    let positive = fraction_present(&text, &EFFICIENCY_POSITIVE);
    let negative = fraction_present(&text, &EFFICIENCY_NEGATIVE);
    (positive - negative).max(0.0)
}

pub fn score_risk_management(approach: &str) -> f64 {
    weighted_presence(&approach.to_lowercase(), &RISK_TERMS)
}

/// How well `approach` speaks to the aggregated stakeholder preferences.
///
/// Each preference contributes only when its name is mentioned: a literal
/// mention of the preferred value counts fully, a positive indicator near the
/// name counts 0.8, a negative one 0.2, anything else 0.5. Each contribution is
/// scaled by the preference's importance and the total is averaged over all
/// preferences. No preferences yields a neutral 0.5.
#[allow(clippy::cast_precision_loss)]
pub fn stakeholder_alignment(approach: &str, preferences: &AggregatedPreferences) -> f64 {
    if preferences.is_empty() {
        return 0.5;
    }

    let text = approach.to_lowercase();
    let total: f64 = preferences
        .iter()
        .filter_map(|(name, value)| {
            let name = name.to_lowercase();
            let position = text.find(&name)?;
            let importance = PREFERENCE_IMPORTANCE
                .iter()
                .find(|(n, _)| *n == name)
                .map_or(DEFAULT_PREFERENCE_IMPORTANCE, |(_, w)| *w);

            let alignment = if text.contains(&value.to_string().to_lowercase()) {
                1.0
            } else if indicator_near(&text, position, &POSITIVE_INDICATORS) {
                0.8
            } else if indicator_near(&text, position, &NEGATIVE_INDICATORS) {
                0.2
            } else {
                0.5
            };
            Some(importance * alignment)
        })
        .sum();

    total / preferences.len() as f64
}

fn indicator_near(text: &str, position: usize, indicators: &[&str]) -> bool {
    let context = window(text, position.saturating_sub(INDICATOR_WINDOW), position + INDICATOR_WINDOW);
    indicators.iter().any(|i| context.contains(i))
}

/// Slice `text[start..end]`, clamped to its length and widened to char boundaries.
pub(super) fn window(text: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end.min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Weighted rubric total in `[0, 1]`.
pub fn score_approach(approach: &str, preferences: &AggregatedPreferences) -> f64 {
    score_completeness(approach) * COMPLETENESS_WEIGHT
        + score_actionability(approach) * ACTIONABILITY_WEIGHT
        + score_efficiency(approach) * EFFICIENCY_WEIGHT
        + score_risk_management(approach) * RISK_WEIGHT
        + stakeholder_alignment(approach, preferences) * ALIGNMENT_WEIGHT
}
