//! Configuration for the conditional GAN.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the class label is fed to the generator.
///
/// `LatentConcat` is the conventional conditional-GAN input conditioning:
/// the one-hot label is concatenated with the latent code before the first
/// layer. Whether this mechanism is the right one for this architecture has
/// not been validated against alternatives (e.g. projection conditioning),
/// so it stays configurable rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conditioning {
    /// Concatenate the one-hot label with the latent code.
    LatentConcat,
    /// Ignore the label; plain unconditional DCGAN input.
    Unconditional,
}

/// Immutable configuration shared by generator, discriminator and container.
///
/// Set once at construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanConfig {
    /// Number of image classes the GAN conditions on.
    pub class_count: usize,
    /// Square image edge length; must be divisible by 16.
    pub image_size: usize,
    /// Color channels of generated and real images.
    pub channel_count: usize,
    /// Dimension of the latent noise vector.
    pub code_dim: usize,
    /// Label conditioning mechanism.
    pub conditioning: Conditioning,
}

impl Default for GanConfig {
    fn default() -> Self {
        Self {
            class_count: 10,
            image_size: 64,
            channel_count: 3,
            code_dim: 128,
            conditioning: Conditioning::LatentConcat,
        }
    }
}

impl GanConfig {
    /// Validate the configuration before any layer is built.
    ///
    /// The generator projects the latent code onto a `image_size / 16`
    /// feature map and upsamples it by 2 four times, so `image_size` must be
    /// divisible by 16; all counts must be strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.class_count == 0 {
            return Err(Error::InvalidConfig("class_count must be positive".into()));
        }
        if self.channel_count == 0 {
            return Err(Error::InvalidConfig(
                "channel_count must be positive".into(),
            ));
        }
        if self.code_dim == 0 {
            return Err(Error::InvalidConfig("code_dim must be positive".into()));
        }
        if self.image_size == 0 || self.image_size % 16 != 0 {
            return Err(Error::InvalidConfig(format!(
                "image_size must be a positive multiple of 16, got {}",
                self.image_size
            )));
        }
        Ok(())
    }

    /// Spatial edge length of the projected feature map the generator
    /// upsamples from (`image_size / 16`).
    #[must_use]
    pub fn projection_size(&self) -> usize {
        self.image_size / 16
    }

    /// Width of the generator input after label conditioning.
    #[must_use]
    pub fn conditioned_dim(&self) -> usize {
        match self.conditioning {
            Conditioning::LatentConcat => self.code_dim + self.class_count,
            Conditioning::Unconditional => self.code_dim,
        }
    }
}
