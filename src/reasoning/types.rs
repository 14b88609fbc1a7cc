use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Role a step plays in the chain. Drives prompt selection and scheduling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepPurpose {
    Initial,
    Exploration,
    Analysis,
    Reconsider,
    Refinement,
    Concrete,
}

/// One generated reasoning step. Never mutated after it joins a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtStep {
    pub purpose: StepPurpose,
    pub content: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub confidence: f64,
    pub contributes_to_outcome: bool,
    /// Unparsed completion text.
    #[serde(default)]
    pub raw_output: String,
    pub created_at: DateTime<Utc>,
}

impl ThoughtStep {
    /// Bare step with default confidence 0.7 and no evidence or alternatives.
    pub fn new(purpose: StepPurpose, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            purpose,
            raw_output: content.clone(),
            content,
            evidence: Vec::new(),
            alternatives: Vec::new(),
            confidence: 0.7,
            contributes_to_outcome: contributes_to_outcome(purpose, 0),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    #[must_use]
    pub fn contributing(mut self, contributes: bool) -> Self {
        self.contributes_to_outcome = contributes;
        self
    }
}

/// Whether a step with `purpose`, generated after `prior_steps` steps, feeds
/// the compiled outcome.
pub fn contributes_to_outcome(purpose: StepPurpose, prior_steps: usize) -> bool {
    match purpose {
        StepPurpose::Concrete | StepPurpose::Reconsider => true,
        StepPurpose::Refinement => prior_steps > 5,
        StepPurpose::Initial | StepPurpose::Exploration | StepPurpose::Analysis => false,
    }
}

/// Ordered, append-only record of one reasoning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtChain {
    steps: Vec<ThoughtStep>,
    final_conclusion: Option<String>,
    created_at: DateTime<Utc>,
}

impl Default for ThoughtChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ThoughtChain {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            final_conclusion: None,
            created_at: Utc::now(),
        }
    }

    /// Build a chain from already generated steps, in order.
    pub fn from_steps(steps: impl IntoIterator<Item = ThoughtStep>) -> Self {
        let mut chain = Self::new();
        for step in steps {
            chain.push(step);
        }
        chain
    }

    pub fn push(&mut self, step: ThoughtStep) {
        self.steps.push(step);
        if self.is_conclusive() {
            self.final_conclusion = self.steps.last().map(|s| s.content.clone());
        }
    }

    pub fn steps(&self) -> &[ThoughtStep] {
        &self.steps
    }

    pub fn last(&self) -> Option<&ThoughtStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// At least one step and the last one is concrete.
    pub fn is_conclusive(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|s| s.purpose == StepPurpose::Concrete)
    }

    pub fn final_conclusion(&self) -> Option<&str> {
        self.final_conclusion.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn contributing_steps(&self) -> impl Iterator<Item = &ThoughtStep> {
        self.steps.iter().filter(|s| s.contributes_to_outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TriggerKind {
    ExplicitLanguage,
    ConfidenceDrop,
    BetterAlternative,
    LogicalGap,
}

/// Verdict of the reconsideration detector for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconsiderationDetection {
    pub triggered: bool,
    pub kind: Option<TriggerKind>,
    pub reason: String,
    pub confidence: f64,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl ReconsiderationDetection {
    pub fn not_triggered() -> Self {
        Self {
            triggered: false,
            kind: None,
            reason: String::new(),
            confidence: 0.0,
            alternatives: Vec::new(),
        }
    }

    pub fn triggered(kind: TriggerKind, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            triggered: true,
            kind: Some(kind),
            reason: reason.into(),
            confidence,
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }
}
