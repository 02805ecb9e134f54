//! Core types and algorithms for camera-frame brightness grading.
//!
//! This crate is intentionally small and purely computational. It does *not*
//! decode images, talk to the network, or know how the classifier weights are
//! trained or persisted. Given a greyscale raster it produces a HOG-style
//! descriptor, maps a model's class index to a brightness label, and smooths
//! a per-frame label stream over a bounded window.
//!
//! Per-frame data flow:
//!
//! ```text
//! GrayFrameView -> hog_descriptor -> classify_features -> LabelSmoother
//! ```
//!
//! The descriptor and the classification are pure functions and safe to run
//! in parallel across frames; a [`LabelSmoother`] is sequential state owned
//! by one logical video stream.

mod classify;
mod frame;
mod hog;
mod label;
mod logger;
mod smoother;

pub use classify::{classify_features, ClassIndexModel, ClassifyError};
pub use frame::{FrameError, GrayFrame, GrayFrameView, FRAME_SIZE};
pub use hog::{descriptor_len, hog_descriptor, HogParams};
pub use label::BrightnessLabel;
pub use logger::init_with_level;
pub use smoother::{LabelSmoother, DEFAULT_SMOOTHING_WINDOW};
