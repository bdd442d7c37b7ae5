//! Sigmoid cross-entropy loss on logits.
//!
//! Numerically stable computation:
//! ```text
//! L_i = max(x_i, 0) - x_i * t_i + log(1 + exp(-|x_i|))
//! L = mean(L_i) over all i
//! ```
//!
//! Forward only: the training-graph assembly exposes loss values, not
//! gradients.

use ndarray::Array2;

use crate::error::{Error, Result};

/// Stable per-element BCE: `max(x, 0) - x*t + ln(1 + e^{-|x|})`.
fn stable_bce(logit: f32, target: f32) -> f32 {
    let relu = logit.max(0.0);
    let abs_x = logit.abs();
    relu - logit * target + (1.0 + (-abs_x).exp()).ln()
}

/// Mean sigmoid cross-entropy between `logits` and `targets`.
///
/// Shapes must match exactly; the reduction is the mean over every element.
pub fn sigmoid_cross_entropy(logits: &Array2<f32>, targets: &Array2<f32>) -> Result<f32> {
    if logits.dim() != targets.dim() {
        return Err(Error::InvalidInput(format!(
            "logits shape {:?} does not match targets shape {:?}",
            logits.dim(),
            targets.dim()
        )));
    }
    if logits.is_empty() {
        return Err(Error::InvalidInput(
            "cannot reduce an empty logit batch".into(),
        ));
    }
    let total: f32 = logits
        .iter()
        .zip(targets.iter())
        .map(|(&logit, &target)| stable_bce(logit, target))
        .sum();
    Ok(total / logits.len() as f32)
}

/// BCE of `logits` against an all-ones target (samples labelled real).
pub fn sigmoid_cross_entropy_with_ones(logits: &Array2<f32>) -> Result<f32> {
    sigmoid_cross_entropy(logits, &Array2::ones(logits.dim()))
}

/// BCE of `logits` against an all-zeros target (samples labelled fake).
pub fn sigmoid_cross_entropy_with_zeros(logits: &Array2<f32>) -> Result<f32> {
    sigmoid_cross_entropy(logits, &Array2::zeros(logits.dim()))
}
