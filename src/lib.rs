//! Conditional image GAN architecture.
//!
//! `imaginar` assembles a DCGAN-style conditional adversarial pair over
//! [ndarray]:
//!
//! - **Generator**: latent code plus class label → synthetic image batch
//!   bounded to [-1, 1].
//! - **Discriminator**: image batch → real/fake probability, the matching
//!   pre-activation logit, and raw per-class scores.
//! - **Container**: wires both together for training-mode graph
//!   construction, sharing discriminator parameters between its fake and
//!   real passes, and computes the two discriminator loss terms.
//!
//! This is declarative model assembly only. There is no optimizer, gradient
//! computation, data loading or checkpointing here; external training code
//! consumes the exposed tensors and losses. Parameter reuse is explicit:
//! components are pure functions of their inputs given a [`ParamStore`], and
//! sharing parameters means passing the same store into both invocations.
//!
//! # Example
//!
//! ```
//! use imaginar::{latent, BuildMode, Conditioning, Gan, GanConfig};
//! use ndarray::Array4;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> imaginar::Result<()> {
//! let config = GanConfig {
//!     class_count: 4,
//!     image_size: 16,
//!     channel_count: 1,
//!     code_dim: 8,
//!     conditioning: Conditioning::LatentConcat,
//! };
//! let mut gan = Gan::with_seed(config, BuildMode::Training, 42)?;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let z = latent::sample_batch(&mut rng, 2, 8);
//! let real = Array4::zeros((2, 16, 16, 1));
//!
//! let graph = gan.training_graph(&z, &[0, 3], &real)?;
//! assert_eq!(graph.fake_image.dim(), (2, 16, 16, 1));
//! assert!(graph.d_loss_real.is_finite());
//! # Ok(())
//! # }
//! ```

mod config;
mod discriminator;
mod error;
mod gan;
mod generator;
mod params;

pub mod latent;
pub mod loss;
pub mod nn;

pub use config::{Conditioning, GanConfig};
pub use discriminator::{Discriminator, DiscriminatorOutput};
pub use error::{Error, Result};
pub use gan::{BuildMode, Gan, TrainingGraph};
pub use generator::Generator;
pub use latent::LatentCode;
pub use nn::Mode;
pub use params::{ParamRef, ParamStore};
