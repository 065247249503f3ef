use std::collections::VecDeque;

use ndarray::Array2;

use super::depth_map::DepthMap;

/// Sliding-window mean over the most recent depth maps.
///
/// Holds at most `capacity` maps; pushing into a full window evicts the
/// oldest. Until the window fills, the mean covers only the maps received so
/// far. A capacity of 1 passes maps through unchanged.
pub struct TemporalSmoother {
    capacity: usize,
    window: VecDeque<DepthMap>,
}

impl TemporalSmoother {
    /// `capacity` below 1 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Adds a map and returns the element-wise mean of the window.
    ///
    /// Every map in a window must share dimensions; a mismatched push is
    /// rejected and leaves the window untouched.
    pub fn push(&mut self, depth: DepthMap) -> Result<DepthMap, Box<dyn std::error::Error>> {
        if let Some(front) = self.window.front() {
            if front.dimensions() != depth.dimensions() {
                return Err(format!(
                    "depth map {:?} does not match smoothing window {:?}",
                    depth.dimensions(),
                    front.dimensions()
                )
                .into());
            }
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(depth);

        Ok(self.mean())
    }

    fn mean(&self) -> DepthMap {
        if self.window.len() == 1 {
            return self.window[0].clone();
        }
        let (w, h) = self.window[0].dimensions();
        let mut sum = Array2::<f32>::zeros((h as usize, w as usize));
        for map in &self.window {
            sum += map.values();
        }
        sum /= self.window.len() as f32;
        DepthMap::new(sum)
    }
}
