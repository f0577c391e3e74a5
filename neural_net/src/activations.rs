use ndarray::Array2;

/// Rectified linear unit, applied elementwise to hidden pre-activations.
pub(crate) fn relu(z: f32) -> f32 {
    z.max(0.0)
}

/// Derivative of `relu`: 1 where the pre-activation was positive, 0 elsewhere.
pub(crate) fn relu_prime(z: f32) -> f32 {
    if z > 0.0 { 1.0 } else { 0.0 }
}

/// Softmax over the class dimension, one distribution per sample column.
///
/// The per-column maximum is subtracted before exponentiating so large
/// pre-activations do not overflow. Pathological inputs may still produce
/// NaN columns; those propagate to the caller instead of being masked.
pub(crate) fn softmax(z: &Array2<f32>) -> Array2<f32> {
    let mut out = z.to_owned();

    for mut col in out.columns_mut() {
        let max = col.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        col.mapv_inplace(|v| (v - max).exp());

        let sum = col.sum();
        col.mapv_inplace(|v| v / sum);
    }

    out
}
