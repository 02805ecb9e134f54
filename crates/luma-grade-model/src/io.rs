//! JSON persistence for trained models.
//!
//! The artifact stores the raw per-class weight rows and biases together
//! with the expected descriptor length, so a loaded model can be checked
//! against the extractor configuration before serving.

use std::fs;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::logistic::LogisticModel;

/// Errors raised when loading or saving a model artifact.
#[derive(thiserror::Error, Debug)]
pub enum ModelIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("model declares {declared} classes but stores {got} weight rows")]
    ClassCount { declared: usize, got: usize },
    #[error("weight row {row} has length {got}, expected {expected}")]
    RowLength {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("model stores {got} biases, expected {expected}")]
    BiasCount { got: usize, expected: usize },
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelRecord {
    num_features: usize,
    num_classes: usize,
    /// One row per class, in class-index order.
    weights: Vec<Vec<f32>>,
    biases: Vec<f32>,
}

impl ModelRecord {
    fn validate(&self) -> Result<(), ModelIoError> {
        if self.weights.len() != self.num_classes {
            return Err(ModelIoError::ClassCount {
                declared: self.num_classes,
                got: self.weights.len(),
            });
        }
        for (row, w) in self.weights.iter().enumerate() {
            if w.len() != self.num_features {
                return Err(ModelIoError::RowLength {
                    row,
                    got: w.len(),
                    expected: self.num_features,
                });
            }
        }
        if self.biases.len() != self.num_classes {
            return Err(ModelIoError::BiasCount {
                got: self.biases.len(),
                expected: self.num_classes,
            });
        }
        Ok(())
    }
}

impl From<&LogisticModel> for ModelRecord {
    fn from(model: &LogisticModel) -> Self {
        let weights = (0..model.num_classes())
            .map(|c| model.weights().row(c).iter().copied().collect())
            .collect();
        Self {
            num_features: model.num_features(),
            num_classes: model.num_classes(),
            weights,
            biases: model.biases().iter().copied().collect(),
        }
    }
}

impl LogisticModel {
    /// Load a model artifact from JSON on disk, validating its shape.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ModelIoError> {
        let raw = fs::read_to_string(path)?;
        let record: ModelRecord = serde_json::from_str(&raw)?;
        record.validate()?;

        let weights = DMatrix::from_row_iterator(
            record.num_classes,
            record.num_features,
            record.weights.iter().flat_map(|row| row.iter().copied()),
        );
        let biases = DVector::from_vec(record.biases);
        Ok(LogisticModel::from_parts(weights, biases))
    }

    /// Write this model to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ModelIoError> {
        let record = ModelRecord::from(self);
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(path, json)?;
        Ok(())
    }
}
