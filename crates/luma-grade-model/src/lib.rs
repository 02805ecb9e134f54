//! Linear brightness classifier and the end-to-end frame pipeline.
//!
//! The classifier is a one-vs-rest logistic regression trained by batch
//! gradient descent ([`train`]); a trained [`LogisticModel`] implements the
//! [`ClassIndexModel`](luma_grade_core::ClassIndexModel) contract consumed
//! by `luma-grade-core`. Models persist as a small JSON artifact
//! ([`LogisticModel::load_json`] / [`LogisticModel::write_json`]).
//!
//! [`FramePipeline`] wires the pieces for one video stream:
//! descriptor extraction, classification and temporal smoothing.

mod io;
mod logistic;
mod pipeline;

pub use io::ModelIoError;
pub use logistic::{train, LogisticModel, TrainError, TrainParams};
pub use pipeline::{FrameGrade, FramePipeline, PipelineError};
