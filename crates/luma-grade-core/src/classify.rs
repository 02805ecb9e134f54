//! Adapter between an opaque linear classifier and [`BrightnessLabel`].

use crate::label::BrightnessLabel;

/// Contract satisfied by a trained classifier.
///
/// The core never inspects weights or serialization; it only asks for the
/// class index of one feature vector. Implementations must be deterministic
/// for a fixed model and input.
pub trait ClassIndexModel {
    /// Class index for a single descriptor row.
    fn predict_class(&self, features: &[f32]) -> usize;
}

/// Errors produced when mapping model output to a label.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// The model returned an index with no entry in the label table. This is
    /// a model/label-table mismatch, i.e. a configuration error, and is
    /// surfaced rather than coerced to some default label.
    #[error("model predicted class index {index}, outside the {num_labels}-label table")]
    ClassIndexOutOfRange { index: usize, num_labels: usize },
}

/// Classify a descriptor with `model` and map the class index through the
/// fixed `0→Low, 1→Optimal, 2→High` table.
pub fn classify_features<M>(features: &[f32], model: &M) -> Result<BrightnessLabel, ClassifyError>
where
    M: ClassIndexModel + ?Sized,
{
    let index = model.predict_class(features);
    BrightnessLabel::from_class_index(index).ok_or(ClassifyError::ClassIndexOutOfRange {
        index,
        num_labels: BrightnessLabel::ALL.len(),
    })
}
