//! Strided 2D convolution with SAME padding.

use ndarray::{s, Array2, Array4, Ix1};

use crate::error::{Error, Result};
use crate::params::{ParamRef, ParamStore};

use super::init::glorot_normal;

/// 2D convolution over NHWC batches with an HWIO kernel and SAME padding.
///
/// The spatial output size is `ceil(input / stride)`. The forward pass is
/// expressed as im2col followed by a single matrix product, so the bulk of
/// the arithmetic stays inside the backend's matmul.
#[derive(Debug)]
pub struct Conv2d {
    kernel: ParamRef,
    bias: ParamRef,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
}

impl Conv2d {
    /// Bind the layer's parameters in `params`, creating them on first use.
    pub fn bind(
        params: &mut ParamStore,
        name: &str,
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
    ) -> Result<Self> {
        let shape = [kernel_size, kernel_size, in_channels, out_channels];
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

    /// Forward pass `(n, h, w, in_c)` → `(n, ceil(h/s), ceil(w/s), out_c)`.
    pub fn forward(&self, x: &Array4<f32>) -> Result<Array4<f32>> {
        let (n, h, w, c) = x.dim();
        if c != self.in_channels {
            return Err(Error::InvalidInput(format!(
                "conv layer expects {} input channels, got {}",
                self.in_channels, c
            )));
        }

        let k = self.kernel_size;
        let stride = self.stride;
        let out_h = h.div_ceil(stride);
        let out_w = w.div_ceil(stride);
        let pad_h = ((out_h - 1) * stride + k).saturating_sub(h) / 2;
        let pad_w = ((out_w - 1) * stride + k).saturating_sub(w) / 2;

        let mut cols = Array2::<f32>::zeros((n * out_h * out_w, k * k * c));
        for b in 0..n {
            for oi in 0..out_h {
                for oj in 0..out_w {
                    let row = (b * out_h + oi) * out_w + oj;
                    for t in 0..k {
                        let Some(i) = (oi * stride + t).checked_sub(pad_h) else {
                            continue;
                        };
                        if i >= h {
                            continue;
                        }
                        for u in 0..k {
                            let Some(j) = (oj * stride + u).checked_sub(pad_w) else {
                                continue;
                            };
                            if j >= w {
                                continue;
                            }
                            let seg = (t * k + u) * c;
                            cols.slice_mut(s![row, seg..seg + c])
                                .assign(&x.slice(s![b, i, j, ..]));
                        }
                    }
                }
            }
        }

        let kernel_guard = self.kernel.borrow();
        let kernel_2d = kernel_guard
            .view()
            .into_shape_with_order((k * k * c, self.out_channels))?;
        let bias_guard = self.bias.borrow();
        let bias = bias_guard.view().into_dimensionality::<Ix1>()?;

        let y = cols.dot(&kernel_2d) + &bias;
        Ok(y.into_shape_with_order((n, out_h, out_w, self.out_channels))?)
    }
}
