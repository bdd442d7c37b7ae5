//! Activation functions.

use ndarray::{ArrayBase, DataMut, Dimension};

/// Rectified linear unit, elementwise.
pub fn relu<S, D>(mut x: ArrayBase<S, D>) -> ArrayBase<S, D>
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    x.mapv_inplace(|v| v.max(0.0));
    x
}

/// Leaky rectified linear unit with negative slope `alpha`, elementwise.
pub fn leaky_relu<S, D>(mut x: ArrayBase<S, D>, alpha: f32) -> ArrayBase<S, D>
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    x.mapv_inplace(|v| if v > 0.0 { v } else { alpha * v });
    x
}

/// Hyperbolic tangent, elementwise. Bounds values to [-1, 1].
pub fn tanh<S, D>(mut x: ArrayBase<S, D>) -> ArrayBase<S, D>
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    x.mapv_inplace(f32::tanh);
    x
}

/// Numerically stable sigmoid, elementwise.
pub fn sigmoid<S, D>(mut x: ArrayBase<S, D>) -> ArrayBase<S, D>
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    x.mapv_inplace(sigmoid_scalar);
    x
}

/// Numerically stable sigmoid for a single value.
///
/// Split on sign so `exp` never overflows: σ(x) = 1 / (1 + e^-x) for x ≥ 0,
/// e^x / (1 + e^x) otherwise.
#[must_use]
pub fn sigmoid_scalar(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
