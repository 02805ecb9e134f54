//! End-to-end frame grading for one video stream.

use serde::Serialize;

use luma_grade_core::{
    classify_features, hog_descriptor, BrightnessLabel, ClassIndexModel, ClassifyError,
    GrayFrameView, HogParams, LabelSmoother, FRAME_SIZE,
};

/// Errors raised while grading a frame.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("expected a {expected}x{expected} frame, got {width}x{height}")]
    UnexpectedFrameSize {
        width: usize,
        height: usize,
        expected: usize,
    },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Result of grading one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameGrade {
    /// Label of this frame alone.
    pub raw: BrightnessLabel,
    /// Majority label over the recent window; the value callers should show.
    pub smoothed: BrightnessLabel,
}

/// Extract → classify → smooth for a sequence of frames.
///
/// The pipeline owns the smoothing window, so create one pipeline per
/// logical video stream and feed it frames in temporal order. Extraction and
/// classification are pure; only [`process`](Self::process) mutates state.
pub struct FramePipeline<M: ClassIndexModel> {
    model: M,
    hog: HogParams,
    smoother: LabelSmoother,
}

impl<M: ClassIndexModel> FramePipeline<M> {
    /// Pipeline with default descriptor layout and smoothing window.
    pub fn new(model: M) -> Self {
        Self {
            model,
            hog: HogParams::default(),
            smoother: LabelSmoother::new(),
        }
    }

    /// Override the descriptor layout. Must match the layout the model was
    /// trained with.
    pub fn with_hog_params(mut self, hog: HogParams) -> Self {
        self.hog = hog;
        self
    }

    /// Override the smoothing window length.
    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.smoother = LabelSmoother::with_capacity(window);
        self
    }

    /// Grade a frame and fold it into the smoothing window.
    ///
    /// Frames must be `FRAME_SIZE`×`FRAME_SIZE`, the resolution used during
    /// training; resizing is the caller's concern.
    pub fn process(&mut self, frame: &GrayFrameView<'_>) -> Result<FrameGrade, PipelineError> {
        let raw = self.classify_frame(frame)?;
        let smoothed = self.smoother.smooth(raw);
        Ok(FrameGrade { raw, smoothed })
    }

    /// Classify a frame without touching the smoothing window.
    ///
    /// Retrying this after a failure is safe; a retried frame must only be
    /// folded into the window once, via [`process`](Self::process).
    pub fn classify_frame(
        &self,
        frame: &GrayFrameView<'_>,
    ) -> Result<BrightnessLabel, PipelineError> {
        if frame.width != FRAME_SIZE || frame.height != FRAME_SIZE {
            return Err(PipelineError::UnexpectedFrameSize {
                width: frame.width,
                height: frame.height,
                expected: FRAME_SIZE,
            });
        }
        let features = hog_descriptor(frame, &self.hog);
        Ok(classify_features(&features, &self.model)?)
    }

    /// Clear the smoothing window, e.g. between unrelated sessions.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_grade_core::GrayFrame;
    use std::cell::Cell;

    /// Stub model replaying a fixed class-index sequence.
    struct Replay {
        indices: Vec<usize>,
        next: Cell<usize>,
    }

    impl Replay {
        fn new(indices: Vec<usize>) -> Self {
            Self {
                indices,
                next: Cell::new(0),
            }
        }
    }

    impl ClassIndexModel for Replay {
        fn predict_class(&self, _features: &[f32]) -> usize {
            let i = self.next.get();
            self.next.set(i + 1);
            self.indices[i]
        }
    }

    fn blank_frame() -> GrayFrame {
        GrayFrame::new(FRAME_SIZE, FRAME_SIZE, vec![128; FRAME_SIZE * FRAME_SIZE])
            .expect("valid frame")
    }

    #[test]
    fn smooths_the_replayed_label_stream() {
        // Low, Low, Optimal, Low, High: majority Low throughout.
        let mut pipeline = FramePipeline::new(Replay::new(vec![0, 0, 1, 0, 2]));
        let frame = blank_frame();

        let mut last = None;
        for _ in 0..5 {
            last = Some(pipeline.process(&frame.view()).expect("grade"));
        }
        let grade = last.unwrap();
        assert_eq!(grade.raw, BrightnessLabel::High);
        assert_eq!(grade.smoothed, BrightnessLabel::Low);
    }

    #[test]
    fn rejects_frames_of_the_wrong_size() {
        let mut pipeline = FramePipeline::new(Replay::new(vec![0]));
        let frame = GrayFrame::new(64, 64, vec![0; 64 * 64]).expect("valid frame");
        assert!(matches!(
            pipeline.process(&frame.view()),
            Err(PipelineError::UnexpectedFrameSize {
                width: 64,
                height: 64,
                ..
            })
        ));
    }

    #[test]
    fn propagates_model_contract_violations() {
        let mut pipeline = FramePipeline::new(Replay::new(vec![7]));
        let frame = blank_frame();
        assert!(matches!(
            pipeline.process(&frame.view()),
            Err(PipelineError::Classify(_))
        ));
    }

    #[test]
    fn reset_starts_a_fresh_window() {
        let mut pipeline = FramePipeline::new(Replay::new(vec![2, 2, 0]));
        let frame = blank_frame();
        pipeline.process(&frame.view()).expect("grade");
        pipeline.process(&frame.view()).expect("grade");
        pipeline.reset();
        let grade = pipeline.process(&frame.view()).expect("grade");
        assert_eq!(grade.smoothed, BrightnessLabel::Low);
    }
}
