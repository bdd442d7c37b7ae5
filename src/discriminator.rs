//! Discriminator network: image to real/fake score and class logits.

use ndarray::{Array2, Array4};

use crate::config::GanConfig;
use crate::error::{Error, Result};
use crate::nn::{flatten, leaky_relu, sigmoid, BatchNorm, Conv2d, Dense, Mode};
use crate::params::ParamStore;

const KERNEL: usize = 5;
const STRIDE: usize = 2;
/// Negative slope of the leaky rectifier.
const SLOPE: f32 = 0.2;

/// Everything the discriminator says about an image batch.
#[derive(Debug, Clone)]
pub struct DiscriminatorOutput {
    /// Real/fake probability per sample, `(n, 1)` in [0, 1].
    pub prob: Array2<f32>,
    /// Pre-activation logit of the binary head, `(n, 1)`; `sigmoid(logit)`
    /// is exactly `prob`.
    pub logit: Array2<f32>,
    /// Raw per-class scores, `(n, class_count)`, no activation applied.
    pub class_logits: Array2<f32>,
}

/// Scores an image batch as real or fake and predicts its class.
///
/// A pure function of its inputs given a parameter store: invoking it twice
/// with the same store (fake images, then real images) runs both passes over
/// identical, aliased parameters.
#[derive(Debug, Clone)]
pub struct Discriminator {
    config: GanConfig,
}

impl Discriminator {
    /// Create a discriminator for a validated configuration.
    pub fn new(config: GanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this discriminator was built for.
    #[must_use]
    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    /// Forward pass over `(n, image_size, image_size, channel_count)`.
    ///
    /// Four stride-2 convolutions double the filter width from a base equal
    /// to `image_size`; the first stage skips normalization, the rest
    /// batch-normalize before the leaky rectifier. The flattened features
    /// feed two parallel dense heads: a 1-unit real/fake head (sigmoid
    /// applied to produce the probability) and a `class_count`-unit head
    /// left as raw scores for downstream cross-entropy.
    pub fn forward(
        &self,
        images: &Array4<f32>,
        params: &mut ParamStore,
        mode: Mode,
    ) -> Result<DiscriminatorOutput> {
        let (_, h, w, c) = images.dim();
        let expected = (
            self.config.image_size,
            self.config.image_size,
            self.config.channel_count,
        );
        if (h, w, c) != expected {
            return Err(Error::InvalidInput(format!(
                "image batch of {h}x{w}x{c} does not match configured {}x{}x{}",
                expected.0, expected.1, expected.2
            )));
        }

        let df = self.config.image_size;

        let h0 = Conv2d::bind(params, "h0/conv", c, df, KERNEL, STRIDE)?.forward(images)?;
        let h0 = leaky_relu(h0, SLOPE);

        let h1 = Conv2d::bind(params, "h1/conv", df, df * 2, KERNEL, STRIDE)?.forward(&h0)?;
        let h1 = leaky_relu(BatchNorm::bind(params, "h1/bn", df * 2)?.forward(&h1, mode)?, SLOPE);

        let h2 = Conv2d::bind(params, "h2/conv", df * 2, df * 4, KERNEL, STRIDE)?.forward(&h1)?;
        let h2 = leaky_relu(BatchNorm::bind(params, "h2/bn", df * 4)?.forward(&h2, mode)?, SLOPE);

        let h3 = Conv2d::bind(params, "h3/conv", df * 4, df * 8, KERNEL, STRIDE)?.forward(&h2)?;
        let h3 = leaky_relu(BatchNorm::bind(params, "h3/bn", df * 8)?.forward(&h3, mode)?, SLOPE);

        let features = flatten(&h3)?;
        let feature_dim = features.ncols();

        let logit = Dense::bind(params, "binary/linear", feature_dim, 1)?.forward(&features)?;
        let class_logits = Dense::bind(params, "class/linear", feature_dim, self.config.class_count)?
            .forward(&features)?;
        let prob = sigmoid(logit.clone());

        Ok(DiscriminatorOutput {
            prob,
            logit,
            class_logits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conditioning;
    use crate::nn::sigmoid_scalar;
    use ndarray::Array4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GanConfig {
        GanConfig {
            class_count: 4,
            image_size: 16,
            channel_count: 1,
            code_dim: 8,
            conditioning: Conditioning::LatentConcat,
        }
    }

    fn random_images(seed: u64, n: usize, size: usize, c: usize) -> Array4<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array4::from_shape_fn((n, size, size, c), |_| {
            crate::nn::normal(&mut rng, 1.0).tanh()
        })
    }

    #[test]
    fn test_output_shapes() {
        let config = small_config();
        let discriminator = Discriminator::new(config).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let images = random_images(1, 3, 16, 1);
        let out = discriminator
            .forward(&images, &mut params, Mode::Train)
            .unwrap();
        assert_eq!(out.prob.dim(), (3, 1));
        assert_eq!(out.logit.dim(), (3, 1));
        assert_eq!(out.class_logits.dim(), (3, 4));
    }

    #[test]
    fn test_prob_is_sigmoid_of_logit_exactly() {
        let config = small_config();
        let discriminator = Discriminator::new(config).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let images = random_images(2, 4, 16, 1);
        let out = discriminator
            .forward(&images, &mut params, Mode::Train)
            .unwrap();
        for i in 0..4 {
            assert!((0.0..=1.0).contains(&out.prob[[i, 0]]));
            assert_eq!(
                out.prob[[i, 0]].to_bits(),
                sigmoid_scalar(out.logit[[i, 0]]).to_bits()
            );
        }
    }

    #[test]
    fn test_two_invocations_share_parameters() {
        let config = small_config();
        let discriminator = Discriminator::new(config).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let fake = random_images(3, 2, 16, 1);
        let real = random_images(4, 2, 16, 1);

        discriminator.forward(&fake, &mut params, Mode::Train).unwrap();
        let created = params.len();

        discriminator.forward(&real, &mut params, Mode::Train).unwrap();
        assert_eq!(
            params.len(),
            created,
            "second pass must reuse, not create, parameters"
        );
    }

    #[test]
    fn test_wrong_image_shape_rejected() {
        let config = small_config();
        let discriminator = Discriminator::new(config).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let images = Array4::<f32>::zeros((2, 32, 32, 1));
        assert!(matches!(
            discriminator.forward(&images, &mut params, Mode::Train),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reuse_under_incompatible_config_is_shape_mismatch() {
        let config = small_config();
        let discriminator = Discriminator::new(config.clone()).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let images = random_images(5, 2, 16, 1);
        discriminator.forward(&images, &mut params, Mode::Train).unwrap();

        // Same store, more classes: the class head's stored weights no
        // longer fit.
        let wider = Discriminator::new(GanConfig {
            class_count: 7,
            ..config
        })
        .unwrap();
        assert!(matches!(
            wider.forward(&images, &mut params, Mode::Train),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_logit_unbounded_class_logits_raw() {
        // Class logits must not be squashed; across random inputs at least
        // one score should fall outside [0, 1].
        let config = small_config();
        let discriminator = Discriminator::new(config).unwrap();
        let mut params = ParamStore::with_seed("discriminator", 43);

        let images = random_images(6, 8, 16, 1);
        let out = discriminator
            .forward(&images, &mut params, Mode::Train)
            .unwrap();
        assert!(out
            .class_logits
            .iter()
            .any(|v| *v < 0.0 || *v > 1.0));
    }
}
