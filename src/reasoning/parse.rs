//! Turn a raw completion into a [`ThoughtStep`].
//!
//! Responses are free text. Three optional sections are lifted out of it when
//! they appear outside code fences:
//!
//! ```text
//! Evidence:
//! - benchmark shows 40% fewer retries
//! Alternatives:
//! - batch the requests instead
//! Confidence: 0.8
//! ```
//!
//! Everything else, `<think>` tag contents included, becomes the step content.

use super::types::{StepPurpose, ThoughtStep};
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:#+\s*)?(?:[*_]{1,2})?(evidence|alternatives|confidence)(?:[*_]{1,2})?\s*:(?:[*_]{1,2})?\s*(.*)$")
        .expect("valid section header regex")
});

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.+)$").expect("valid bullet regex")
});

static CONFIDENCE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:(%)|/\s*(\d+(?:\.\d+)?))?").expect("valid confidence regex")
});

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Evidence,
    Alternatives,
}

/// Parse `raw` into a step of the given purpose.
///
/// `contributes_to_outcome` is computed as if no steps preceded this one; the
/// engine overrides it with the chain-aware value.
pub fn parse_step_response(raw: &str, purpose: StepPurpose, default_confidence: f64) -> ThoughtStep {
    let text = strip_think_tags(raw);

    let mut body = Vec::new();
    let mut evidence = Vec::new();
    let mut alternatives = Vec::new();
    let mut confidence = None;
    let mut section = Section::Body;
    let mut in_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            section = Section::Body;
            body.push(line);
            continue;
        }
        if in_fence {
            body.push(line);
            continue;
        }

        if let Some(caps) = SECTION_HEADER.captures(line) {
            let name = caps[1].to_ascii_lowercase();
            let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
            match name.as_str() {
                "confidence" => {
                    section = Section::Body;
                    match parse_confidence(rest) {
                        Some(value) => confidence = Some(value),
                        None => body.push(line),
                    }
                }
                "evidence" => {
                    section = Section::Evidence;
                    push_item(&mut evidence, rest);
                }
                _ => {
                    section = Section::Alternatives;
                    push_item(&mut alternatives, rest);
                }
            }
            continue;
        }

        match section {
            Section::Body => body.push(line),
            Section::Evidence | Section::Alternatives => {
                if line.trim().is_empty() {
                    continue;
                }
                let target = if section == Section::Evidence {
                    &mut evidence
                } else {
                    &mut alternatives
                };
                if let Some(caps) = BULLET.captures(line) {
                    push_item(target, &caps[1]);
                } else {
                    section = Section::Body;
                    body.push(line);
                }
            }
        }
    }

    ThoughtStep {
        purpose,
        content: body.join("\n").trim().to_string(),
        evidence,
        alternatives,
        confidence: confidence.unwrap_or(default_confidence).clamp(0.0, 1.0),
        contributes_to_outcome: super::types::contributes_to_outcome(purpose, 0),
        raw_output: raw.to_string(),
        created_at: Utc::now(),
    }
}

fn push_item(items: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
}

fn strip_think_tags(raw: &str) -> String {
    raw.replace("<think>", "").replace("</think>", "")
}

/// `0.85`, `85%`, `85` and `17/20` all read as 0.85.
///
/// Only a percent sign or a whole number in `2..=100` is rescaled; any other
/// value outside [0,1] is clamped.
fn parse_confidence(text: &str) -> Option<f64> {
    let caps = CONFIDENCE_VALUE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let value = if let Some(denominator) = caps.get(3) {
        let denominator: f64 = denominator.as_str().parse().ok()?;
        if denominator <= 0.0 {
            return None;
        }
        value / denominator
    } else if caps.get(2).is_some() {
        value / 100.0
    } else if !caps[1].contains('.') && value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}
