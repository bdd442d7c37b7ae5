//! Tensor encoding helpers: one-hot labels and flattening.

use ndarray::{Array2, Array4};

use crate::error::{Error, Result};

/// One-hot encode a label batch into `(n, class_count)`.
///
/// Each row has exactly one 1.0 at the label index; a label outside
/// `[0, class_count)` is rejected.
pub fn one_hot(labels: &[usize], class_count: usize) -> Result<Array2<f32>> {
    let mut out = Array2::zeros((labels.len(), class_count));
    for (row, &label) in labels.iter().enumerate() {
        if label >= class_count {
            return Err(Error::InvalidInput(format!(
                "label {label} out of range for {class_count} classes"
            )));
        }
        out[[row, label]] = 1.0;
    }
    Ok(out)
}

/// Flatten `(n, h, w, c)` feature maps into `(n, h·w·c)` rows.
pub fn flatten(x: &Array4<f32>) -> Result<Array2<f32>> {
    let (n, h, w, c) = x.dim();
    Ok(x.to_owned().into_shape_with_order((n, h * w * c))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;
    use proptest::prelude::*;

    #[test]
    fn test_one_hot_basic() {
        let encoded = one_hot(&[2, 0], 4).unwrap();
        assert_eq!(encoded.dim(), (2, 4));
        assert_eq!(encoded.row(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(encoded.row(1).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_out_of_range() {
        assert!(matches!(
            one_hot(&[4], 4),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_one_hot_empty_batch() {
        let encoded = one_hot(&[], 4).unwrap();
        assert_eq!(encoded.dim(), (0, 4));
    }

    #[test]
    fn test_flatten_layout() {
        let mut x = Array4::zeros((1, 2, 2, 2));
        let mut counter = 0.0;
        for v in x.iter_mut() {
            *v = counter;
            counter += 1.0;
        }
        let flat = flatten(&x).unwrap();
        assert_eq!(flat.dim(), (1, 8));
        // Channel-fastest order: (h, w, c) flattens to h·w·c in row-major.
        assert_eq!(flat.row(0).to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    proptest! {
        #[test]
        fn test_one_hot_exactly_one_set(label in 0usize..10) {
            let encoded = one_hot(&[label], 10).unwrap();
            let row = encoded.row(0);
            prop_assert_eq!(row.sum(), 1.0);
            prop_assert_eq!(row[label], 1.0);
            prop_assert_eq!(row.iter().filter(|v| **v != 0.0).count(), 1);
        }

        #[test]
        fn test_flatten_shape(n in 1usize..4, h in 1usize..6, c in 1usize..5) {
            let x = Array4::<f32>::zeros((n, h, h, c));
            let flat = flatten(&x).unwrap();
            prop_assert_eq!(flat.dim(), (n, h * h * c));
        }
    }
}
