//! Latent code sampling and latent-space operations.

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::nn::normal;

/// A single point in the generator's latent space.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentCode {
    /// The latent vector.
    pub vector: Array1<f32>,
}

impl LatentCode {
    /// Wrap an existing vector.
    #[must_use]
    pub fn new(vector: Array1<f32>) -> Self {
        Self { vector }
    }

    /// Sample from a standard normal distribution.
    pub fn sample<R: Rng>(rng: &mut R, dim: usize) -> Self {
        let vector = Array1::from_shape_fn(dim, |_| normal(rng, 1.0));
        Self { vector }
    }

    /// Dimension of the latent code.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    /// L2 norm.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize to unit length; near-zero vectors are returned unchanged.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let n = self.norm();
        if n < 1e-10 {
            return self.clone();
        }
        Self {
            vector: &self.vector / n,
        }
    }

    /// Linear interpolation towards `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        assert_eq!(self.dim(), other.dim(), "latent dimensions must match");
        Self {
            vector: &self.vector * (1.0 - t) + &other.vector * t,
        }
    }

    /// Spherical linear interpolation towards `other`.
    ///
    /// Falls back to [`Self::lerp`] for near-zero or near-parallel vectors.
    #[must_use]
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        assert_eq!(self.dim(), other.dim(), "latent dimensions must match");

        let norm_self = self.norm();
        let norm_other = other.norm();
        if norm_self < 1e-10 || norm_other < 1e-10 {
            return self.lerp(other, t);
        }

        let dot = self.vector.dot(&other.vector);
        let cos_omega = (dot / (norm_self * norm_other)).clamp(-1.0, 1.0);
        let omega = cos_omega.acos();
        if omega.abs() < 1e-6 {
            return self.lerp(other, t);
        }

        let sin_omega = omega.sin();
        let factor_self = ((1.0 - t) * omega).sin() / sin_omega;
        let factor_other = (t * omega).sin() / sin_omega;
        Self {
            vector: &self.vector * factor_self + &other.vector * factor_other,
        }
    }
}

/// Sample a `(batch, dim)` matrix of standard-normal latent codes, ready to
/// feed the generator.
pub fn sample_batch<R: Rng>(rng: &mut R, batch: usize, dim: usize) -> Array2<f32> {
    Array2::from_shape_fn((batch, dim), |_| normal(rng, 1.0))
}
