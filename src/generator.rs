//! Generator network: latent code plus class label to synthetic image.

use ndarray::{concatenate, Array2, Array4, Axis};

use crate::config::{Conditioning, GanConfig};
use crate::error::{Error, Result};
use crate::nn::{one_hot, relu, tanh, BatchNorm, Deconv2d, Dense, Mode};
use crate::params::ParamStore;

/// Base filter width; the projected feature map starts at eight times this
/// and halves across the upsampling stages.
const GF_DIM: usize = 64;
const KERNEL: usize = 5;
const STRIDE: usize = 2;

/// Maps a latent-code batch and a label batch to an image batch in [-1, 1].
///
/// A pure function of its inputs given a parameter store: passing the same
/// store into two invocations shares every parameter between them.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GanConfig,
}

impl Generator {
    /// Create a generator for a validated configuration.
    pub fn new(config: GanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this generator was built for.
    #[must_use]
    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    /// Forward pass.
    ///
    /// `z` is `(n, code_dim)`, `labels` one class index per sample. The label
    /// is one-hot encoded and concatenated with the latent code when
    /// [`Conditioning::LatentConcat`] is configured. The latent-plus-label
    /// input is projected onto a `(projection_size, projection_size,
    /// 8·gf_dim)` feature map and upsampled by 2 four times; every stage but
    /// the last is batch-normalized and rectified, the last is squashed with
    /// tanh. Output is `(n, image_size, image_size, channel_count)` in
    /// [-1, 1].
    pub fn forward(
        &self,
        z: &Array2<f32>,
        labels: &[usize],
        params: &mut ParamStore,
        mode: Mode,
    ) -> Result<Array4<f32>> {
        let n = z.nrows();
        if z.ncols() != self.config.code_dim {
            return Err(Error::InvalidInput(format!(
                "latent code width {} does not match code_dim {}",
                z.ncols(),
                self.config.code_dim
            )));
        }
        if labels.len() != n {
            return Err(Error::InvalidInput(format!(
                "label batch of {} does not match latent batch of {n}",
                labels.len()
            )));
        }

        let x = match self.config.conditioning {
            Conditioning::LatentConcat => {
                let labels_one_hot = one_hot(labels, self.config.class_count)?;
                concatenate(Axis(1), &[z.view(), labels_one_hot.view()])?
            }
            Conditioning::Unconditional => {
                // Labels are still range-checked so a bad batch fails the
                // same way under either conditioning mechanism.
                one_hot(labels, self.config.class_count)?;
                z.clone()
            }
        };

        let s = self.config.projection_size();

        let h0 = Dense::bind(params, "h0/linear", x.ncols(), GF_DIM * 8 * s * s)?.forward(&x)?;
        let h0 = h0.into_shape_with_order((n, s, s, GF_DIM * 8))?;
        let h0 = BatchNorm::bind(params, "h0/bn", GF_DIM * 8)?.forward(&h0, mode)?;
        let h0 = relu(h0);

        let h1 = Deconv2d::bind(params, "h1/deconv", GF_DIM * 8, GF_DIM * 4, KERNEL, STRIDE)?
            .forward(&h0)?;
        let h1 = relu(BatchNorm::bind(params, "h1/bn", GF_DIM * 4)?.forward(&h1, mode)?);

        let h2 = Deconv2d::bind(params, "h2/deconv", GF_DIM * 4, GF_DIM * 2, KERNEL, STRIDE)?
            .forward(&h1)?;
        let h2 = relu(BatchNorm::bind(params, "h2/bn", GF_DIM * 2)?.forward(&h2, mode)?);

        let h3 = Deconv2d::bind(params, "h3/deconv", GF_DIM * 2, GF_DIM, KERNEL, STRIDE)?
            .forward(&h2)?;
        let h3 = relu(BatchNorm::bind(params, "h3/bn", GF_DIM)?.forward(&h3, mode)?);

        // Final stage: no normalization, tanh bounds the image to [-1, 1].
        let h4 = Deconv2d::bind(
            params,
            "h4/deconv",
            GF_DIM,
            self.config.channel_count,
            KERNEL,
            STRIDE,
        )?
        .forward(&h3)?;
        Ok(tanh(h4))
    }
}
