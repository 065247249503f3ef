use ndarray::{Array2, ArrayView2};

/// Cubic convolution coefficient used by PyTorch's bicubic mode.
const CUBIC_A: f32 = -0.75;

/// Single-channel relative depth estimate, indexed `[row, col]`.
///
/// Values are whatever the estimator produces (disparity-like for Depth
/// Anything); nothing here assumes a range.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    values: Array2<f32>,
}

impl DepthMap {
    pub fn new(values: Array2<f32>) -> Self {
        Self { values }
    }

    /// Builds a map from row-major values. Fails if the length is wrong.
    pub fn from_vec(width: u32, height: u32, values: Vec<f32>) -> Result<Self, Box<dyn std::error::Error>> {
        let values = Array2::from_shape_vec((height as usize, width as usize), values)?;
        Ok(Self { values })
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            values: Array2::from_elem((height as usize, width as usize), value),
        }
    }

    pub fn width(&self) -> u32 {
        self.values.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.values.nrows() as u32
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Smallest and largest finite-or-not value, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Resamples to `width` x `height` with bicubic interpolation.
    ///
    /// Half-pixel centres, a = -0.75 and edge clamping, so the result matches
    /// `torch.nn.functional.interpolate(mode="bicubic", align_corners=False)`.
    /// Output is not clamped: cubic overshoot past the input range is kept.
    pub fn resize_bicubic(&self, width: u32, height: u32) -> DepthMap {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        let horizontal = resample_axis(self.values.view(), width as usize, Axis2::Cols);
        let both = resample_axis(horizontal.view(), height as usize, Axis2::Rows);
        DepthMap::new(both)
    }
}

#[derive(Clone, Copy)]
enum Axis2 {
    Rows,
    Cols,
}

fn resample_axis(src: ArrayView2<'_, f32>, out_len: usize, axis: Axis2) -> Array2<f32> {
    let (rows, cols) = src.dim();
    let in_len = match axis {
        Axis2::Rows => rows,
        Axis2::Cols => cols,
    };
    let taps = cubic_taps(in_len, out_len);

    let out_shape = match axis {
        Axis2::Rows => (out_len, cols),
        Axis2::Cols => (rows, out_len),
    };
    let mut out = Array2::<f32>::zeros(out_shape);

    for (o, tap) in taps.iter().enumerate() {
        match axis {
            Axis2::Cols => {
                for r in 0..rows {
                    let mut acc = 0.0;
                    for (idx, w) in tap {
                        acc += src[[r, *idx]] * w;
                    }
                    out[[r, o]] = acc;
                }
            }
            Axis2::Rows => {
                for c in 0..cols {
                    let mut acc = 0.0;
                    for (idx, w) in tap {
                        acc += src[[*idx, c]] * w;
                    }
                    out[[o, c]] = acc;
                }
            }
        }
    }
    out
}

/// For each output position, the four clamped source indices and weights.
fn cubic_taps(in_len: usize, out_len: usize) -> Vec<[(usize, f32); 4]> {
    let scale = in_len as f32 / out_len as f32;
    let last = in_len.saturating_sub(1) as isize;
    (0..out_len)
        .map(|o| {
            let center = (o as f32 + 0.5) * scale - 0.5;
            let base = center.floor();
            let t = center - base;
            let weights = cubic_weights(t);
            let mut tap = [(0usize, 0.0f32); 4];
            for (k, w) in weights.iter().enumerate() {
                let idx = (base as isize + k as isize - 1).clamp(0, last);
                tap[k] = (idx as usize, *w);
            }
            tap
        })
        .collect()
}

fn cubic_weights(t: f32) -> [f32; 4] {
    let a = CUBIC_A;
    let near = |x: f32| ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0;
    let far = |x: f32| ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a;
    [far(t + 1.0), near(t), near(1.0 - t), far(2.0 - t)]
}
