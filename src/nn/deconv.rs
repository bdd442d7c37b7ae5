//! Strided 2D transposed convolution with SAME padding.

use ndarray::{s, Array4, Ix1, Ix4};

use crate::error::{Error, Result};
use crate::params::{ParamRef, ParamStore};

use super::init::glorot_normal;

/// 2D transposed convolution (learned upsampling) over NHWC batches.
///
/// Shape-inverse of [`super::Conv2d`] under SAME padding: the spatial output
/// size is exactly `input * stride`. The kernel layout is
/// `(k, k, out_c, in_c)`, matching the transposed-convolution filter
/// convention. The forward pass runs one matrix product per kernel tap and
/// scatter-adds the contributions into the upsampled output.
#[derive(Debug)]
pub struct Deconv2d {
    kernel: ParamRef,
    bias: ParamRef,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
}

impl Deconv2d {
    /// Bind the layer's parameters in `params`, creating them on first use.
    pub fn bind(
        params: &mut ParamStore,
        name: &str,
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
    ) -> Result<Self> {
        let shape = [kernel_size, kernel_size, out_channels, in_channels];
        let fan_in = kernel_size * kernel_size * in_channels;
        let fan_out = kernel_size * kernel_size * out_channels;
        let kernel = params.get_or_init(&format!("{name}/w"), &shape, |rng| {
            glorot_normal(rng, &shape, fan_in, fan_out)
        })?;
        let bias = params.get_or_init(&format!("{name}/b"), &[out_channels], |_| {
            ndarray::ArrayD::zeros(vec![out_channels])
        })?;
        Ok(Self {
            kernel,
            bias,
            in_channels,
            out_channels,
            kernel_size,
            stride,
        })
    }

    /// Forward pass `(n, h, w, in_c)` → `(n, h·s, w·s, out_c)`.
    pub fn forward(&self, x: &Array4<f32>) -> Result<Array4<f32>> {
        let (n, h, w, c) = x.dim();
        if c != self.in_channels {
            return Err(Error::InvalidInput(format!(
                "deconv layer expects {} input channels, got {}",
                self.in_channels, c
            )));
        }

        let k = self.kernel_size;
        let stride = self.stride;
        let out_h = h * stride;
        let out_w = w * stride;
        let pad = k.saturating_sub(stride) / 2;

        let x_rows = x.view().into_shape_with_order((n * h * w, c))?;
        let kernel_guard = self.kernel.borrow();
        let kernel = kernel_guard.view().into_dimensionality::<Ix4>()?;

        let mut y = Array4::<f32>::zeros((n, out_h, out_w, self.out_channels));
        for t in 0..k {
            for u in 0..k {
                let tap = kernel.slice(s![t, u, .., ..]);
                // (n·h·w, in_c) · (in_c, out_c)
                let contrib = x_rows.dot(&tap.t());
                for b in 0..n {
                    for i in 0..h {
                        let Some(oi) = (i * stride + t).checked_sub(pad) else {
                            continue;
                        };
                        if oi >= out_h {
                            continue;
                        }
                        for j in 0..w {
                            let Some(oj) = (j * stride + u).checked_sub(pad) else {
                                continue;
                            };
                            if oj >= out_w {
                                continue;
                            }
                            let row = (b * h + i) * w + j;
                            let mut dst = y.slice_mut(s![b, oi, oj, ..]);
                            dst += &contrib.row(row);
                        }
                    }
                }
            }
        }

        let bias_guard = self.bias.borrow();
        let bias = bias_guard.view().into_dimensionality::<Ix1>()?;
        y += &bias;
        Ok(y)
    }
}
