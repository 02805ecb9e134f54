//! Bulk loading and featurization of labelled training images.
//!
//! Directories are walked in sorted order and featurized in fixed-size
//! batches; decoding inside a batch runs in parallel, which bounds both
//! memory use and thread fan-out for large datasets. Unreadable files are
//! skipped with a warning rather than aborting a long training run.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use log::{info, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;

use luma_grade_core::{
    descriptor_len, hog_descriptor, BrightnessLabel, FrameError, GrayFrame, HogParams, FRAME_SIZE,
};

/// Errors raised while decoding a single image file.
#[derive(thiserror::Error, Debug)]
pub enum FrameLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Errors raised while building the training set.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no image files under {dir}")]
    EmptyDirectory { dir: PathBuf },
    #[error("no readable training images were found")]
    EmptyDataset,
    #[error("feature row {row} has length {got}, expected {expected}")]
    InconsistentFeatureLength {
        row: usize,
        got: usize,
        expected: usize,
    },
}

/// Dataset loading settings.
#[derive(Clone, Copy, Debug)]
pub struct DatasetOptions {
    /// Images decoded per parallel batch.
    pub batch_size: usize,
    /// Descriptor layout, shared with serving.
    pub hog: HogParams,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            hog: HogParams::default(),
        }
    }
}

/// Decode an image file into the fixed-size greyscale serving raster:
/// decode, convert to luma, resize to `FRAME_SIZE`×`FRAME_SIZE` (bilinear).
pub fn decode_frame(path: &Path) -> Result<GrayFrame, FrameLoadError> {
    let decoded = image::ImageReader::open(path)?.decode()?;
    let gray = image::imageops::resize(
        &decoded.to_luma8(),
        FRAME_SIZE as u32,
        FRAME_SIZE as u32,
        FilterType::Triangle,
    );
    Ok(GrayFrame::new(FRAME_SIZE, FRAME_SIZE, gray.into_raw())?)
}

fn featurize_dir(
    dir: &Path,
    label: BrightnessLabel,
    opts: &DatasetOptions,
    rows: &mut Vec<Vec<f32>>,
    labels: &mut Vec<BrightnessLabel>,
) -> Result<(), DatasetError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(DatasetError::EmptyDirectory {
            dir: dir.to_path_buf(),
        });
    }

    let batch_size = opts.batch_size.max(1);
    let num_batches = paths.len().div_ceil(batch_size);
    for (i, batch) in paths.chunks(batch_size).enumerate() {
        let features: Vec<Option<Vec<f32>>> = batch
            .par_iter()
            .map(|path| match decode_frame(path) {
                Ok(frame) => Some(hog_descriptor(&frame.view(), &opts.hog)),
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    None
                }
            })
            .collect();

        let mut valid = 0usize;
        for row in features.into_iter().flatten() {
            rows.push(row);
            labels.push(label);
            valid += 1;
        }
        info!(
            "featurized batch {}/{num_batches} of {} ({label}): {valid}/{} readable",
            i + 1,
            dir.display(),
            batch.len()
        );
    }
    Ok(())
}

/// Featurize every labelled directory into one training matrix.
///
/// Rows keep directory order, so label indices line up with the returned
/// label vector. All rows share the analytic descriptor length for
/// `FRAME_SIZE` frames; a mismatch means the extractor configuration drifted
/// and is surfaced rather than fed to training.
pub fn load_training_set(
    dirs: &[(PathBuf, BrightnessLabel)],
    opts: &DatasetOptions,
) -> Result<(DMatrix<f32>, Vec<BrightnessLabel>), DatasetError> {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (dir, label) in dirs {
        featurize_dir(dir, *label, opts, &mut rows, &mut labels)?;
    }
    if rows.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    let expected = descriptor_len(FRAME_SIZE, FRAME_SIZE, &opts.hog);
    for (row, features) in rows.iter().enumerate() {
        if features.len() != expected {
            return Err(DatasetError::InconsistentFeatureLength {
                row,
                got: features.len(),
                expected,
            });
        }
    }

    let features = DMatrix::from_row_iterator(
        rows.len(),
        expected,
        rows.iter().flat_map(|row| row.iter().copied()),
    );
    Ok((features, labels))
}
