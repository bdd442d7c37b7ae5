//! Forward-pass neural network primitives over ndarray.
//!
//! Everything here is declarative assembly: layers bind their parameters to
//! an explicit [`crate::ParamStore`] and compute forward passes. No gradient
//! computation or parameter updates happen in this crate.

mod activations;
mod batch_norm;
mod conv;
mod deconv;
mod encode;
mod init;
mod linear;

pub use activations::{leaky_relu, relu, sigmoid, sigmoid_scalar, tanh};
pub use batch_norm::BatchNorm;
pub use conv::Conv2d;
pub use deconv::Deconv2d;
pub use encode::{flatten, one_hot};
pub use linear::Dense;

pub(crate) use init::normal;

/// Whether normalization uses per-batch statistics or frozen running
/// statistics.
///
/// Threaded explicitly through every normalization step; never inferred from
/// ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normalize with per-batch statistics and update running statistics.
    Train,
    /// Normalize with frozen running statistics.
    Eval,
}
