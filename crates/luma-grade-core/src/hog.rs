//! HOG-style brightness descriptor.
//!
//! Central-difference gradients over the interior pixels, 40°-wide
//! orientation bins accumulated per 8×8 cell, and overlapping 2×2-cell
//! blocks that are L2-normalized into the final feature vector. The vector
//! length is a function of the image size and the parameters only, and the
//! trained classifier depends on it exactly, so the arithmetic here is
//! pinned by tests rather than left to refactoring drift.

use serde::{Deserialize, Serialize};

use crate::frame::GrayFrameView;

/// Stabilizer added to the block norm so all-zero blocks (flat image
/// regions) divide cleanly instead of producing NaN.
const NORM_EPS: f32 = 1e-6;

/// Descriptor layout parameters.
///
/// The defaults (8-pixel cells, 2×2-cell blocks, 9 bins) are the layout the
/// shipped models were trained against; changing any of them changes the
/// descriptor length and invalidates existing weights.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HogParams {
    /// Cell edge in pixels.
    pub cell_size: usize,
    /// Block edge in cells.
    pub block_size: usize,
    /// Number of orientation bins over [0°, 360°).
    pub num_bins: usize,
}

impl Default for HogParams {
    fn default() -> Self {
        Self {
            cell_size: 8,
            block_size: 2,
            num_bins: 9,
        }
    }
}

impl HogParams {
    /// Cell grid dimensions for a given frame size.
    ///
    /// Trailing pixels that do not fill a complete cell are dropped, never
    /// padded. The same counts drive both the histogram pass and the block
    /// pass, so frames whose edges are not multiples of the cell size stay
    /// in bounds.
    fn cell_grid(&self, width: usize, height: usize) -> (usize, usize) {
        // cell_size < 2 would let the cell grid overrun the w-2 gradient
        // grid; treat it, like zero bins/blocks, as an empty layout.
        if self.cell_size < 2 || self.block_size == 0 || self.num_bins == 0 {
            return (0, 0);
        }
        if width < 3 || height < 3 || width <= self.cell_size || height <= self.cell_size {
            return (0, 0);
        }
        (
            (width - self.cell_size) / self.cell_size,
            (height - self.cell_size) / self.cell_size,
        )
    }
}

/// Descriptor length produced by [`hog_descriptor`] for a `width`×`height`
/// frame, computed analytically.
pub fn descriptor_len(width: usize, height: usize, params: &HogParams) -> usize {
    let (cells_x, cells_y) = params.cell_grid(width, height);
    if params.block_size == 0 || cells_x < params.block_size || cells_y < params.block_size {
        return 0;
    }
    let blocks_x = cells_x - (params.block_size - 1);
    let blocks_y = cells_y - (params.block_size - 1);
    blocks_x * blocks_y * params.block_size * params.block_size * params.num_bins
}

/// Extract the block-normalized gradient-histogram descriptor of a frame.
///
/// Deterministic and pure: no shared state, safe to call concurrently on
/// different frames. The output length equals
/// [`descriptor_len(width, height, params)`](descriptor_len).
pub fn hog_descriptor(frame: &GrayFrameView<'_>, params: &HogParams) -> Vec<f32> {
    let w = frame.width;
    let h = frame.height;
    let (cells_x, cells_y) = params.cell_grid(w, h);
    if params.block_size == 0 || cells_x < params.block_size || cells_y < params.block_size {
        return Vec::new();
    }

    // Gradient pass: central differences over the interior, row-major with
    // stride w-2. Orientation is shifted into [0°, 360°]; the 360° endpoint
    // from atan2 = π folds back to bin 0 through the modulo below.
    let gw = w - 2;
    let gh = h - 2;
    let mut magnitude = vec![0f32; gw * gh];
    let mut orientation = vec![0f32; gw * gh];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let dx = frame.get(x + 1, y) as f32 - frame.get(x - 1, y) as f32;
            let dy = frame.get(x, y + 1) as f32 - frame.get(x, y - 1) as f32;
            let idx = (y - 1) * gw + (x - 1);
            magnitude[idx] = (dx * dx + dy * dy).sqrt();
            orientation[idx] = dy.atan2(dx).to_degrees() + 180.0;
        }
    }

    // Cell pass: magnitude-weighted orientation histograms over
    // non-overlapping cells of the gradient grid, row-major.
    let bin_width = 360.0 / params.num_bins as f32;
    let mut cell_hists = vec![0f32; cells_x * cells_y * params.num_bins];
    for cy in 0..cells_y {
        for cx in 0..cells_x {
            let hist_base = (cy * cells_x + cx) * params.num_bins;
            for py in 0..params.cell_size {
                let row = (cy * params.cell_size + py) * gw + cx * params.cell_size;
                for px in 0..params.cell_size {
                    let idx = row + px;
                    let bin = (orientation[idx] / bin_width).floor() as usize % params.num_bins;
                    cell_hists[hist_base + bin] += magnitude[idx];
                }
            }
        }
    }

    // Block pass: 2×2-cell windows sliding by one cell in each axis, each
    // concatenated and L2-normalized independently.
    let blocks_x = cells_x - (params.block_size - 1);
    let blocks_y = cells_y - (params.block_size - 1);
    let mut features =
        Vec::with_capacity(blocks_x * blocks_y * params.block_size * params.block_size * params.num_bins);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let start = features.len();
            for iy in 0..params.block_size {
                for ix in 0..params.block_size {
                    let cell = (by + iy) * cells_x + bx + ix;
                    let base = cell * params.num_bins;
                    features.extend_from_slice(&cell_hists[base..base + params.num_bins]);
                }
            }
            let norm = features[start..]
                .iter()
                .map(|v| v * v)
                .sum::<f32>()
                .sqrt()
                + NORM_EPS;
            for v in &mut features[start..] {
                *v /= norm;
            }
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::GrayFrame;
    use approx::assert_relative_eq;

    fn frame_from_fn(w: usize, h: usize, f: impl Fn(usize, usize) -> u8) -> GrayFrame {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        GrayFrame::new(w, h, data).expect("test frame")
    }

    /// 128×128, cell 8, block 2, 9 bins: 15×15 cells, 14×14 blocks of 36
    /// values. The trained models assume this exact length.
    #[test]
    fn golden_descriptor_length_for_128() {
        let params = HogParams::default();
        assert_eq!(descriptor_len(128, 128, &params), 14 * 14 * 36);
        assert_eq!(descriptor_len(128, 128, &params), 7056);

        let frame = frame_from_fn(128, 128, |x, y| ((x * 7 + y * 13) % 251) as u8);
        assert_eq!(hog_descriptor(&frame.view(), &params).len(), 7056);
    }

    #[test]
    fn extraction_is_deterministic() {
        let params = HogParams::default();
        let frame = frame_from_fn(128, 128, |x, y| ((x * x + 3 * y) % 256) as u8);
        let a = hog_descriptor(&frame.view(), &params);
        let b = hog_descriptor(&frame.view(), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn flat_frame_yields_all_zero_descriptor() {
        let params = HogParams::default();
        let frame = frame_from_fn(128, 128, |_, _| 90);
        let features = hog_descriptor(&frame.view(), &params);
        assert_eq!(features.len(), 7056);
        // Zero gradients everywhere; the epsilon keeps the division finite.
        assert!(features.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn blocks_are_unit_norm_for_textured_input() {
        let params = HogParams::default();
        let frame = frame_from_fn(128, 128, |x, y| (((x / 4) % 2) as u8 * 200) ^ (y as u8 & 1));
        let features = hog_descriptor(&frame.view(), &params);

        for block in features.chunks(params.block_size * params.block_size * params.num_bins) {
            let sum_sq: f32 = block.iter().map(|v| v * v).sum();
            if sum_sq > 0.0 {
                assert_relative_eq!(sum_sq, 1.0, epsilon = 1e-3);
            }
            assert!(block.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    /// 130×130 is not a multiple of the cell size; the trailing two pixel
    /// rows/columns are dropped and the block grid matches the 128×128 one.
    #[test]
    fn partial_trailing_cells_are_dropped() {
        let params = HogParams::default();
        assert_eq!(descriptor_len(130, 130, &params), 7056);

        let frame = frame_from_fn(130, 130, |x, y| ((x * 5 + y * 11) % 253) as u8);
        let features = hog_descriptor(&frame.view(), &params);
        assert_eq!(features.len(), 7056);
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn too_small_frames_produce_empty_descriptor() {
        let params = HogParams::default();
        assert_eq!(descriptor_len(8, 8, &params), 0);
        let frame = frame_from_fn(8, 8, |x, _| (x * 30) as u8);
        assert!(hog_descriptor(&frame.view(), &params).is_empty());
    }

    /// A pure horizontal ramp has dx > 0, dy = 0 everywhere, i.e. a single
    /// orientation of 180°, which lands in bin floor(180/40) = 4.
    #[test]
    fn uniform_horizontal_gradient_fills_one_bin() {
        let params = HogParams::default();
        let frame = frame_from_fn(128, 128, |x, _| x as u8);
        let features = hog_descriptor(&frame.view(), &params);

        for block in features.chunks(params.num_bins) {
            for (bin, v) in block.iter().enumerate() {
                if bin == 4 {
                    assert!(*v > 0.0);
                } else {
                    assert_eq!(*v, 0.0);
                }
            }
        }
    }
}
