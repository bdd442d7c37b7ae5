//! Weight initializers.

use ndarray::ArrayD;
use rand::Rng;

/// Sample from N(0, std²) using the Box-Muller transform.
pub(crate) fn normal<R: Rng>(rng: &mut R, std: f64) -> f32 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (z * std) as f32
}

/// Glorot-normal tensor: N(0, 2 / (fan_in + fan_out)).
pub(crate) fn glorot_normal<R: Rng>(
    rng: &mut R,
    shape: &[usize],
    fan_in: usize,
    fan_out: usize,
) -> ArrayD<f32> {
    let std = (2.0 / (fan_in + fan_out) as f64).sqrt();
    let mut tensor = ArrayD::zeros(shape.to_vec());
    for v in tensor.iter_mut() {
        *v = normal(rng, std);
    }
    tensor
}

/// Batch-norm scale initializer: N(1.0, 0.02²).
pub(crate) fn gamma_init<R: Rng>(rng: &mut R, dim: usize) -> ArrayD<f32> {
    let mut tensor = ArrayD::zeros(vec![dim]);
    for v in tensor.iter_mut() {
        *v = 1.0 + normal(rng, 0.02);
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normal_roughly_centered() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f32> = (0..10_000).map(|_| normal(&mut rng, 1.0)).collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let var = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>()
            / samples.len() as f32;
        assert!(mean.abs() < 0.05, "mean {mean} too far from 0");
        assert!((var - 1.0).abs() < 0.1, "variance {var} too far from 1");
    }

    #[test]
    fn test_glorot_normal_shape_and_scale() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = glorot_normal(&mut rng, &[64, 256], 64, 256);
        assert_eq!(t.shape(), &[64, 256]);

        let expected_std = (2.0f32 / (64.0 + 256.0)).sqrt();
        let var = t.iter().map(|v| v * v).sum::<f32>() / t.len() as f32;
        assert!((var.sqrt() - expected_std).abs() < 0.01);
    }

    #[test]
    fn test_gamma_init_near_one() {
        let mut rng = StdRng::seed_from_u64(42);
        let g = gamma_init(&mut rng, 512);
        let mean = g.iter().sum::<f32>() / g.len() as f32;
        assert!((mean - 1.0).abs() < 0.01);
        assert!(g.iter().all(|v| (v - 1.0).abs() < 0.2));
    }
}
