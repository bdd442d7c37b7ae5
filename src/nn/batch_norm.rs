//! Batch normalization with explicit train/eval statistics.

use ndarray::{Array1, Array4, Axis, Ix1};

use crate::error::{Error, Result};
use crate::params::{ParamRef, ParamStore};

use super::init::gamma_init;
use super::Mode;

/// Exponential decay folding batch statistics into the running statistics.
const DECAY: f32 = 0.9;
const EPS: f32 = 1e-5;

/// Per-channel batch normalization over NHWC batches.
///
/// [`Mode::Train`] normalizes with the current batch's statistics and folds
/// them into the stored running statistics; [`Mode::Eval`] normalizes with
/// the frozen running statistics and leaves them untouched. The mode is an
/// explicit argument on every forward call.
#[derive(Debug)]
pub struct BatchNorm {
    gamma: ParamRef,
    beta: ParamRef,
    moving_mean: ParamRef,
    moving_var: ParamRef,
    dim: usize,
}

impl BatchNorm {
    /// Bind scale, shift and running statistics in `params`.
    ///
    /// Scale is initialized N(1.0, 0.02), shift to zero, running mean to
    /// zero and running variance to one.
    pub fn bind(params: &mut ParamStore, name: &str, dim: usize) -> Result<Self> {
        let gamma = params.get_or_init(&format!("{name}/gamma"), &[dim], |rng| {
            gamma_init(rng, dim)
        })?;
        let beta = params.get_or_init(&format!("{name}/beta"), &[dim], |_| {
            ndarray::ArrayD::zeros(vec![dim])
        })?;
        let moving_mean = params.get_or_init(&format!("{name}/moving_mean"), &[dim], |_| {
            ndarray::ArrayD::zeros(vec![dim])
        })?;
        let moving_var = params.get_or_init(&format!("{name}/moving_var"), &[dim], |_| {
            ndarray::ArrayD::from_elem(vec![dim], 1.0)
        })?;
        Ok(Self {
            gamma,
            beta,
            moving_mean,
            moving_var,
            dim,
        })
    }

    /// Normalize a `(n, h, w, c)` batch per channel.
    pub fn forward(&self, x: &Array4<f32>, mode: Mode) -> Result<Array4<f32>> {
        let (n, h, w, c) = x.dim();
        if c != self.dim {
            return Err(Error::InvalidInput(format!(
                "batch norm expects {} channels, got {}",
                self.dim, c
            )));
        }

        let flat = x.view().into_shape_with_order((n * h * w, c))?;
        let (mean, var) = match mode {
            Mode::Train => {
                let count = (n * h * w) as f32;
                let mean = flat.sum_axis(Axis(0)) / count;
                let centered = &flat - &mean;
                let var = centered.mapv(|v| v * v).sum_axis(Axis(0)) / count;
                self.update_running(&mean, &var)?;
                (mean, var)
            }
            Mode::Eval => {
                let mean = self
                    .moving_mean
                    .borrow()
                    .view()
                    .into_dimensionality::<Ix1>()?
                    .to_owned();
                let var = self
                    .moving_var
                    .borrow()
                    .view()
                    .into_dimensionality::<Ix1>()?
                    .to_owned();
                (mean, var)
            }
        };

        let gamma_guard = self.gamma.borrow();
        let gamma = gamma_guard.view().into_dimensionality::<Ix1>()?;
        let beta_guard = self.beta.borrow();
        let beta = beta_guard.view().into_dimensionality::<Ix1>()?;

        // y = x * scale + shift, with scale = gamma / sigma.
        let sigma = var.mapv(|v| (v + EPS).sqrt());
        let scale = &gamma / &sigma;
        let shift = &beta - &(&mean * &scale);

        let y = &flat * &scale + &shift;
        Ok(y.into_shape_with_order((n, h, w, c))?)
    }

    fn update_running(&self, mean: &Array1<f32>, var: &Array1<f32>) -> Result<()> {
        let mut mm_guard = self.moving_mean.borrow_mut();
        let mut mm = mm_guard.view_mut().into_dimensionality::<Ix1>()?;
        mm.zip_mut_with(mean, |m, &b| *m = DECAY * *m + (1.0 - DECAY) * b);

        let mut mv_guard = self.moving_var.borrow_mut();
        let mut mv = mv_guard.view_mut().into_dimensionality::<Ix1>()?;
        mv.zip_mut_with(var, |m, &b| *m = DECAY * *m + (1.0 - DECAY) * b);
        Ok(())
    }
}
