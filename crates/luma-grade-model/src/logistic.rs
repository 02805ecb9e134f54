//! One-vs-rest logistic regression over HOG descriptors.
//!
//! Three binary classifiers (one per brightness grade) are fit by plain
//! batch gradient descent on the sigmoid cross-entropy gradient. Inference
//! takes the argmax of the linear scores; the sigmoid is monotone, so it is
//! skipped at prediction time.

use log::{debug, error, info};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use luma_grade_core::{BrightnessLabel, ClassIndexModel};

/// Gradient-descent settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrainParams {
    /// Number of full-batch gradient steps per class.
    pub num_steps: usize,
    /// Step size.
    pub learning_rate: f32,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            num_steps: 1000,
            learning_rate: 5e-3,
        }
    }
}

/// Errors raised by [`train`].
#[derive(thiserror::Error, Debug)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyDataset,
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    RowCountMismatch { rows: usize, labels: usize },
    #[error("feature matrix has zero columns")]
    ZeroFeatures,
}

/// Trained linear classifier: per-class weight rows plus biases.
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticModel {
    /// `num_classes` × `num_features`.
    weights: DMatrix<f32>,
    biases: DVector<f32>,
}

impl LogisticModel {
    pub(crate) fn from_parts(weights: DMatrix<f32>, biases: DVector<f32>) -> Self {
        debug_assert_eq!(weights.nrows(), biases.len());
        Self { weights, biases }
    }

    /// Descriptor length this model was trained for.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.weights.nrows()
    }

    pub(crate) fn weights(&self) -> &DMatrix<f32> {
        &self.weights
    }

    pub(crate) fn biases(&self) -> &DVector<f32> {
        &self.biases
    }
}

impl ClassIndexModel for LogisticModel {
    /// Argmax of the per-class linear scores.
    ///
    /// A feature vector of the wrong length violates the model contract; it
    /// is reported as an out-of-range class index so the caller surfaces it
    /// as a configuration error instead of a panic here.
    fn predict_class(&self, features: &[f32]) -> usize {
        if features.len() != self.num_features() {
            error!(
                "feature vector length {} does not match model input length {}",
                features.len(),
                self.num_features()
            );
            return self.num_classes();
        }

        let x = DVector::from_column_slice(features);
        let scores = &self.weights * &x + &self.biases;

        let mut best = 0;
        for c in 1..scores.len() {
            if scores[c] > scores[best] {
                best = c;
            }
        }
        best
    }
}

#[inline]
fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Fit a one-vs-rest logistic regression.
///
/// `features` is one descriptor per row; `labels` must have one entry per
/// row. Every class in [`BrightnessLabel::ALL`] gets its own binary
/// classifier, whether or not the class occurs in the data.
pub fn train(
    features: &DMatrix<f32>,
    labels: &[BrightnessLabel],
    params: &TrainParams,
) -> Result<LogisticModel, TrainError> {
    let n = features.nrows();
    let d = features.ncols();
    if n == 0 {
        return Err(TrainError::EmptyDataset);
    }
    if n != labels.len() {
        return Err(TrainError::RowCountMismatch {
            rows: n,
            labels: labels.len(),
        });
    }
    if d == 0 {
        return Err(TrainError::ZeroFeatures);
    }

    info!(
        "training logistic regression: {n} samples, {d} features, {} steps, lr {}",
        params.num_steps, params.learning_rate
    );

    let num_classes = BrightnessLabel::ALL.len();
    let inv_n = 1.0 / n as f32;
    let xt = features.transpose();

    let mut weights = DMatrix::<f32>::zeros(num_classes, d);
    let mut biases = DVector::<f32>::zeros(num_classes);

    for (c, class) in BrightnessLabel::ALL.iter().enumerate() {
        let target = DVector::<f32>::from_iterator(
            n,
            labels
                .iter()
                .map(|l| if l == class { 1.0f32 } else { 0.0f32 }),
        );

        let mut w = DVector::<f32>::zeros(d);
        let mut b = 0.0f32;

        for _ in 0..params.num_steps {
            let mut p = features * &w;
            p.add_scalar_mut(b);
            p.apply(|v| *v = sigmoid(*v));

            let err = p - &target;
            let grad = (&xt * &err) * inv_n;
            w.axpy(-params.learning_rate, &grad, 1.0);
            b -= params.learning_rate * err.sum() * inv_n;
        }

        debug!("class {class}: |w| = {:.4}, b = {b:.4}", w.norm());
        weights.row_mut(c).copy_from(&w.transpose());
        biases[c] = b;
    }

    Ok(LogisticModel::from_parts(weights, biases))
}
