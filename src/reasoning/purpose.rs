use super::types::StepPurpose;

/// Purpose of the step at `index` in a chain of at most `max_steps` steps.
///
/// The final slot is always concrete, and that check runs before the
/// initial one so a one-step budget produces a single concrete step.
/// Intermediate slots are placed by progress `(index + 1) / max_steps`.
pub fn step_purpose(index: usize, max_steps: usize) -> StepPurpose {
    if index + 1 >= max_steps {
        return StepPurpose::Concrete;
    }
    if index == 0 {
        return StepPurpose::Initial;
    }

    #[allow(clippy::cast_precision_loss)]
    let progress = (index + 1) as f64 / max_steps as f64;
    match progress {
        p if p < 0.3 => StepPurpose::Exploration,
        p if p < 0.5 => StepPurpose::Analysis,
        p if p < 0.7 => StepPurpose::Refinement,
        _ => StepPurpose::Concrete,
    }
}
