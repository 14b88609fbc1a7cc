//! Reconsideration ("aha-moment") detector.
//!
//! Decides whether a freshly generated step should be thrown away and
//! regenerated under the reconsider framing. Four checks run in priority
//! order and the first one that fires wins.

pub mod gaps;
pub mod scoring;

pub use gaps::{
    contains_external_reference, contains_numerical_evidence, find_assertions,
    find_logical_gaps, find_unsupported_assertions, has_evidence_support, has_logical_connection,
};
pub use scoring::{
    score_actionability, score_approach, score_completeness, score_efficiency,
    score_risk_management, stakeholder_alignment,
};

use super::types::{ReconsiderationDetection, ThoughtStep, TriggerKind};
use crate::stakeholders::AggregatedPreferences;

/// Self-correction phrases, checked in this order.
const RECONSIDERATION_PHRASES: [(&str, &str); 9] = [
    ("wait", "Explicit pause for reconsideration"),
    ("hold on", "Interruption for new insight"),
    ("actually", "Correction of previous thinking"),
    ("better approach", "Recognition of improved method"),
    ("simpler solution", "Identification of simplification"),
    ("just realized", "New insight discovered"),
    ("alternatively", "Alternative approach recognition"),
    ("more efficient", "Efficiency improvement insight"),
    ("we could instead", "Alternative approach proposal"),
];

const EXPLICIT_CONFIDENCE: f64 = 0.9;
const CONFIDENCE_DROP_RATIO: f64 = 0.7;
const BETTER_ALTERNATIVE_RATIO: f64 = 1.2;
const LOGICAL_GAP_PENALTY: f64 = 0.8;

/// Run every check against `step`, given the steps already in the chain.
pub fn detect_reconsideration(
    step: &ThoughtStep,
    previous: &[ThoughtStep],
    preferences: &AggregatedPreferences,
) -> ReconsiderationDetection {
    detect_explicit_reconsideration(&step.content)
        .or_else(|| detect_confidence_drop(step, previous.last()))
        .or_else(|| detect_better_alternative(step, preferences))
        .or_else(|| detect_logical_gaps(step, previous.last()))
        .unwrap_or_else(ReconsiderationDetection::not_triggered)
}

pub fn detect_explicit_reconsideration(content: &str) -> Option<ReconsiderationDetection> {
    let text = content.to_lowercase();
    RECONSIDERATION_PHRASES
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map(|(_, reason)| {
            ReconsiderationDetection::triggered(
                TriggerKind::ExplicitLanguage,
                *reason,
                EXPLICIT_CONFIDENCE,
            )
        })
}

/// Fires when confidence fell below 70% of the previous step's.
pub fn detect_confidence_drop(
    step: &ThoughtStep,
    previous: Option<&ThoughtStep>,
) -> Option<ReconsiderationDetection> {
    let previous = previous?;
    (step.confidence < previous.confidence * CONFIDENCE_DROP_RATIO).then(|| {
        ReconsiderationDetection::triggered(
            TriggerKind::ConfidenceDrop,
            format!(
                "Confidence dropped from {:.2} to {:.2}",
                previous.confidence, step.confidence
            ),
            step.confidence,
        )
    })
}

/// Fires on the first alternative scoring at least 1.2x the step itself.
///
/// A strictly higher score is also required so two zero scores never trigger.
pub fn detect_better_alternative(
    step: &ThoughtStep,
    preferences: &AggregatedPreferences,
) -> Option<ReconsiderationDetection> {
    if step.alternatives.is_empty() {
        return None;
    }
    let current = score_approach(&step.content, preferences);

    step.alternatives.iter().find_map(|alternative| {
        let score = score_approach(alternative, preferences);
        (score >= current * BETTER_ALTERNATIVE_RATIO && score > current).then(|| {
            ReconsiderationDetection::triggered(
                TriggerKind::BetterAlternative,
                "Found significantly better alternative approach",
                score,
            )
            .with_alternatives(vec![alternative.clone()])
        })
    })
}

pub fn detect_logical_gaps(
    step: &ThoughtStep,
    previous: Option<&ThoughtStep>,
) -> Option<ReconsiderationDetection> {
    let gaps = find_logical_gaps(&step.content, previous.map(|p| p.content.as_str()));
    (!gaps.is_empty()).then(|| {
        ReconsiderationDetection::triggered(
            TriggerKind::LogicalGap,
            format!("Found logical gaps: {}", gaps.join("; ")),
            step.confidence * LOGICAL_GAP_PENALTY,
        )
    })
}
