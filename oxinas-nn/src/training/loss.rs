use ndarray::Array2;

/// An interface for classification losses.
pub trait Loss: Send + Sync {
    /// Returns the batch-mean loss of `logits` against `targets`,
    /// and its gradient with respect to the logits.
    fn evaluate(&self, logits: &Array2<f32>, targets: &Array2<f32>) -> (f32, Array2<f32>);
}

/// Softmax cross-entropy against one-hot targets.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrossEntropy;

impl Loss for CrossEntropy {
    /// # Examples
    /// ```
    /// use ndarray::array;
    /// use oxinas_nn::training::{CrossEntropy, Loss};
    ///
    /// let logits = array![[0.0f32, 0.0], [10.0, -10.0]];
    /// let targets = array![[1.0f32, 0.0], [1.0, 0.0]];
    /// let (loss, grad) = CrossEntropy.evaluate(&logits, &targets);
    ///
    /// // ln 2 for the undecided row, ~0 for the confident one.
    /// assert!((loss - std::f32::consts::LN_2 / 2.0).abs() < 1e-4);
    /// assert!((grad[[0, 0]] + 0.25).abs() < 1e-6);
    /// ```
    fn evaluate(&self, logits: &Array2<f32>, targets: &Array2<f32>) -> (f32, Array2<f32>) {
        let batch = logits.nrows().max(1) as f32;
        // -log softmax(x)_k = logsumexp(x) - x_k, which keeps NaNs visible.
        let mut loss = 0.0;
        for (row, target) in logits.rows().into_iter().zip(targets.rows()) {
            let max = row.fold(f32::NEG_INFINITY, |m, x| m.max(*x));
            let log_sum = row.iter().map(|x| (x - max).exp()).sum::<f32>().ln() + max;
            loss += row
                .iter()
                .zip(target)
                .map(|(x, t)| t * (log_sum - x))
                .sum::<f32>();
        }
        let grad = (softmax(logits) - targets) / batch;
        (loss / batch, grad)
    }
}

/// Row-wise softmax, shifted by each row's maximum.
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut probabilities = logits.to_owned();
    for mut row in probabilities.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, x| m.max(*x));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn softmax_rows_sum_to_one() {
        let p = softmax(&array![[1.0, 2.0, 3.0], [1000.0, 1000.0, -1000.0]]);
        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        assert!((p[[1, 0]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let logits = array![[0.3f32, -1.2, 2.0], [0.0, 0.5, -0.5]];
        let targets = array![[0.0f32, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let (_, grad) = CrossEntropy.evaluate(&logits, &targets);
        let h = 1e-2;
        for i in 0..2 {
            for j in 0..3 {
                let mut plus = logits.clone();
                plus[[i, j]] += h;
                let mut minus = logits.clone();
                minus[[i, j]] -= h;
                let numeric = (CrossEntropy.evaluate(&plus, &targets).0
                    - CrossEntropy.evaluate(&minus, &targets).0)
                    / (2.0 * h);
                assert!((numeric - grad[[i, j]]).abs() < 1e-3);
            }
        }
    }
}
