//! GAN container: configuration plus training-graph assembly.

use ndarray::{Array2, Array4};

use crate::config::GanConfig;
use crate::discriminator::Discriminator;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::loss::{sigmoid_cross_entropy_with_ones, sigmoid_cross_entropy_with_zeros};
use crate::nn::Mode;
use crate::params::ParamStore;

/// Which graph the container builds. Chosen once at construction; there is
/// no transition between build paths afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Full training graph: generator and discriminator wired together.
    Training,
    /// Generator alone, for inference. Not yet built.
    GeneratorOnly,
    /// Discriminator alone, for inference. Not yet built.
    DiscriminatorOnly,
}

/// Tensors exposed to external training code after one graph assembly.
#[derive(Debug, Clone)]
pub struct TrainingGraph {
    /// Generated images, training-mode normalization, `(n, size, size, c)`.
    pub fake_image: Array4<f32>,
    /// Generated images, evaluation-mode normalization over the same
    /// parameters; for inspection, not for the losses.
    pub fake_image_eval: Array4<f32>,
    /// Real/fake probability the discriminator assigns the fake batch.
    pub fake_prob: Array2<f32>,
    /// Binary-head logit for the fake batch.
    pub fake_logit: Array2<f32>,
    /// Class scores for the fake batch.
    pub class_logits_fake: Array2<f32>,
    /// Binary-head logit for the real batch.
    pub real_logit: Array2<f32>,
    /// Class scores for the real batch.
    pub class_logits_real: Array2<f32>,
    /// BCE of the real batch's logits against an all-ones target.
    pub d_loss_real: f32,
    /// BCE of the fake batch's logits against an all-zeros target.
    pub d_loss_fake: f32,
}

/// Holds the configuration and wires generator and discriminator together
/// for training-mode graph construction.
///
/// Only the discriminator losses are assembled here. The generator
/// adversarial loss and the class-conditional terms are deliberately left to
/// external training code, which can compose them from the exposed logits
/// via [`crate::loss`].
#[derive(Debug)]
pub struct Gan {
    config: GanConfig,
    generator: Generator,
    discriminator: Discriminator,
    generator_params: ParamStore,
    discriminator_params: ParamStore,
}

impl Gan {
    /// Construct a container with OS-seeded parameter initialization.
    ///
    /// The configuration is validated before anything is built;
    /// [`BuildMode::GeneratorOnly`] and [`BuildMode::DiscriminatorOnly`]
    /// fail with [`Error::Unimplemented`] rather than producing a partially
    /// built graph.
    pub fn new(config: GanConfig, mode: BuildMode) -> Result<Self> {
        config.validate()?;
        let generator_params = ParamStore::new("generator");
        let discriminator_params = ParamStore::new("discriminator");
        Self::build(config, mode, generator_params, discriminator_params)
    }

    /// Construct with a fixed seed for reproducible initialization.
    pub fn with_seed(config: GanConfig, mode: BuildMode, seed: u64) -> Result<Self> {
        config.validate()?;
        let generator_params = ParamStore::with_seed("generator", seed);
        let discriminator_params = ParamStore::with_seed("discriminator", seed + 1);
        Self::build(config, mode, generator_params, discriminator_params)
    }

    fn build(
        config: GanConfig,
        mode: BuildMode,
        generator_params: ParamStore,
        discriminator_params: ParamStore,
    ) -> Result<Self> {
        match mode {
            BuildMode::Training => Ok(Self {
                generator: Generator::new(config.clone())?,
                discriminator: Discriminator::new(config.clone())?,
                config,
                generator_params,
                discriminator_params,
            }),
            BuildMode::GeneratorOnly => Err(Error::Unimplemented("generator-only build path")),
            BuildMode::DiscriminatorOnly => {
                Err(Error::Unimplemented("discriminator-only build path"))
            }
        }
    }

    /// The configuration this container was built for.
    #[must_use]
    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    /// Assemble the training graph for one batch.
    ///
    /// Composition order:
    /// 1. generator on `(z, labels)`, training mode → fake images;
    /// 2. discriminator on the fake images, fresh parameters on the first
    ///    call;
    /// 3. discriminator on `real_images`, reusing the same parameters;
    /// 4. generator again in evaluation mode, reusing its parameters →
    ///    inspection images.
    ///
    /// Real images are labelled 1 and fakes 0 for the discriminator losses.
    pub fn training_graph(
        &mut self,
        z: &Array2<f32>,
        labels: &[usize],
        real_images: &Array4<f32>,
    ) -> Result<TrainingGraph> {
        let n = z.nrows();
        if real_images.dim().0 != n {
            return Err(Error::InvalidInput(format!(
                "real image batch of {} does not match latent batch of {n}",
                real_images.dim().0
            )));
        }

        let fake_image =
            self.generator
                .forward(z, labels, &mut self.generator_params, Mode::Train)?;
        let fake_out =
            self.discriminator
                .forward(&fake_image, &mut self.discriminator_params, Mode::Train)?;
        let real_out =
            self.discriminator
                .forward(real_images, &mut self.discriminator_params, Mode::Train)?;
        let fake_image_eval =
            self.generator
                .forward(z, labels, &mut self.generator_params, Mode::Eval)?;

        let d_loss_real = sigmoid_cross_entropy_with_ones(&real_out.logit)?;
        let d_loss_fake = sigmoid_cross_entropy_with_zeros(&fake_out.logit)?;

        Ok(TrainingGraph {
            fake_image,
            fake_image_eval,
            fake_prob: fake_out.prob,
            fake_logit: fake_out.logit,
            class_logits_fake: fake_out.class_logits,
            real_logit: real_out.logit,
            class_logits_real: real_out.class_logits,
            d_loss_real,
            d_loss_fake,
        })
    }

    /// The generator's parameter store.
    #[must_use]
    pub fn generator_params(&self) -> &ParamStore {
        &self.generator_params
    }

    /// The discriminator's parameter store, shared by both of its passes.
    #[must_use]
    pub fn discriminator_params(&self) -> &ParamStore {
        &self.discriminator_params
    }

    /// Total number of scalar parameters across both components.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.generator_params.num_parameters() + self.discriminator_params.num_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conditioning;
    use crate::latent::sample_batch;
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

    fn small_batch(config: &GanConfig, n: usize) -> (ndarray::Array2<f32>, Vec<usize>, Array4<f32>) {
        let mut rng = StdRng::seed_from_u64(9);
        let z = sample_batch(&mut rng, n, config.code_dim);
        let labels: Vec<usize> = (0..n).map(|i| i % config.class_count).collect();
        let real = Array4::from_shape_fn(
            (n, config.image_size, config.image_size, config.channel_count),
            |_| crate::nn::normal(&mut rng, 1.0).tanh(),
        );
        (z, labels, real)
    }

    #[test]
    fn test_training_build_path() {
        let gan = Gan::with_seed(small_config(), BuildMode::Training, 42).unwrap();
        assert!(gan.generator_params().is_empty());
        assert!(gan.discriminator_params().is_empty());
    }

    #[test]
    fn test_inference_build_paths_unimplemented() {
        for mode in [BuildMode::GeneratorOnly, BuildMode::DiscriminatorOnly] {
            let err = Gan::with_seed(small_config(), mode, 42).unwrap_err();
            assert!(matches!(err, Error::Unimplemented(_)), "{mode:?}: {err}");
        }
    }

    #[test]
    fn test_invalid_config_fails_before_build_path() {
        let config = GanConfig {
            image_size: 24,
            ..small_config()
        };
        // Even the unimplemented paths validate first.
        for mode in [
            BuildMode::Training,
            BuildMode::GeneratorOnly,
            BuildMode::DiscriminatorOnly,
        ] {
            assert!(matches!(
                Gan::new(config.clone(), mode),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_training_graph_shapes_and_losses() {
        let config = small_config();
        let mut gan = Gan::with_seed(config.clone(), BuildMode::Training, 42).unwrap();
        let (z, labels, real) = small_batch(&config, 3);

        let graph = gan.training_graph(&z, &labels, &real).unwrap();
        assert_eq!(graph.fake_image.dim(), (3, 16, 16, 1));
        assert_eq!(graph.fake_image_eval.dim(), (3, 16, 16, 1));
        assert_eq!(graph.fake_prob.dim(), (3, 1));
        assert_eq!(graph.fake_logit.dim(), (3, 1));
        assert_eq!(graph.class_logits_fake.dim(), (3, 4));
        assert_eq!(graph.real_logit.dim(), (3, 1));
        assert_eq!(graph.class_logits_real.dim(), (3, 4));

        assert!(graph.d_loss_real.is_finite() && graph.d_loss_real >= 0.0);
        assert!(graph.d_loss_fake.is_finite() && graph.d_loss_fake >= 0.0);
        assert!(graph.fake_prob.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_discriminator_passes_share_one_parameter_set() {
        let config = small_config();
        let mut gan = Gan::with_seed(config.clone(), BuildMode::Training, 42).unwrap();
        let (z, labels, real) = small_batch(&config, 2);

        gan.training_graph(&z, &labels, &real).unwrap();
        let generator_tensors = gan.generator_params().len();
        let discriminator_tensors = gan.discriminator_params().len();
        let scalar_count = gan.num_parameters();

        // A second assembly reuses everything: same tensors, same counts.
        gan.training_graph(&z, &labels, &real).unwrap();
        assert_eq!(gan.generator_params().len(), generator_tensors);
        assert_eq!(gan.discriminator_params().len(), discriminator_tensors);
        assert_eq!(gan.num_parameters(), scalar_count);
    }

    #[test]
    fn test_seeded_containers_reproduce() {
        let config = small_config();
        let (z, labels, real) = small_batch(&config, 2);

        let mut a = Gan::with_seed(config.clone(), BuildMode::Training, 7).unwrap();
        let mut b = Gan::with_seed(config, BuildMode::Training, 7).unwrap();

        let ga = a.training_graph(&z, &labels, &real).unwrap();
        let gb = b.training_graph(&z, &labels, &real).unwrap();
        assert_eq!(ga.fake_image, gb.fake_image);
        assert_eq!(ga.d_loss_real, gb.d_loss_real);
        assert_eq!(ga.d_loss_fake, gb.d_loss_fake);
    }

    #[test]
    fn test_train_and_eval_images_differ() {
        // Train-mode normalization sees batch statistics, eval-mode the
        // (fresh) running statistics; the two generated batches disagree.
        let config = small_config();
        let mut gan = Gan::with_seed(config.clone(), BuildMode::Training, 42).unwrap();
        let (z, labels, real) = small_batch(&config, 2);

        let graph = gan.training_graph(&z, &labels, &real).unwrap();
        let diff: f32 = graph
            .fake_image
            .iter()
            .zip(graph.fake_image_eval.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff > 1e-3, "expected differing train/eval images, diff={diff}");
    }

    #[test]
    fn test_batch_size_mismatch_rejected() {
        let config = small_config();
        let mut gan = Gan::with_seed(config.clone(), BuildMode::Training, 42).unwrap();
        let (z, labels, _) = small_batch(&config, 2);
        let real = Array4::<f32>::zeros((3, 16, 16, 1));
        assert!(matches!(
            gan.training_graph(&z, &labels, &real),
            Err(Error::InvalidInput(_))
        ));
    }
}
