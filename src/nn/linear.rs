//! Fully connected layer.

use ndarray::{Array2, Ix1, Ix2};

use crate::error::{Error, Result};
use crate::params::{ParamRef, ParamStore};

use super::init::glorot_normal;

/// Dense transform `x · W + b` with `W: (in_dim, out_dim)`.
///
/// Binding the same name against the same store twice yields the same
/// parameter tensors.
#[derive(Debug)]
pub struct Dense {
    w: ParamRef,
    b: ParamRef,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// Bind the layer's parameters in `params`, creating them on first use.
    pub fn bind(params: &mut ParamStore, name: &str, in_dim: usize, out_dim: usize) -> Result<Self> {
        let w = params.get_or_init(&format!("{name}/w"), &[in_dim, out_dim], |rng| {
            glorot_normal(rng, &[in_dim, out_dim], in_dim, out_dim)
        })?;
        let b = params.get_or_init(&format!("{name}/b"), &[out_dim], |_| {
            ndarray::ArrayD::zeros(vec![out_dim])
        })?;
        Ok(Self { w, b, in_dim, out_dim })
    }

    /// Forward pass for a batch `(n, in_dim)` → `(n, out_dim)`.
    pub fn forward(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.in_dim {
            return Err(Error::InvalidInput(format!(
                "dense layer expects {} input features, got {}",
                self.in_dim,
                x.ncols()
            )));
        }
        let w_guard = self.w.borrow();
        let w = w_guard.view().into_dimensionality::<Ix2>()?;
        let b_guard = self.b.borrow();
        let b = b_guard.view().into_dimensionality::<Ix1>()?;
        Ok(x.dot(&w) + &b)
    }

    /// Output width of the layer.
    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}
