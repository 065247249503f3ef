use ndarray::ArrayView3;

/// A decoded or rendered raster: packed 8-bit pixels in row-major order.
///
/// Decoded frames are RGB24 at native resolution. Rendered depth frames are
/// RGB24 at the target resolution. The `index` is the zero-based decode
/// position and is carried through the pipeline unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Returns an RGB copy scaled to `width` x `height`.
    ///
    /// Uses a triangle (bilinear) filter, which averages source pixels when
    /// shrinking. Returns a plain clone when the size already matches.
    pub fn resized(&self, width: u32, height: u32) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.dimensions() == (width, height) {
            return Ok(self.clone());
        }
        if self.channels != 3 {
            return Err(format!("cannot resize {}-channel frame", self.channels).into());
        }
        let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or("Failed to create image from frame data")?;
        let scaled = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Ok(Frame::new(scaled.into_raw(), width, height, 3, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
