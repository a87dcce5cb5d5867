use ndarray::{s, ArrayView3};

/// A single video frame or rendered image: contiguous pixel bytes in
/// row-major order, tagged with the tick sequence it belongs to.
///
/// Pixel layout conversion happens at I/O boundaries and in
/// [`Frame::to_rgb`]; the heatmap domain only ever works on RGB.
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

    /// A solid RGB frame, mostly useful as a stand-in source frame.
    pub fn filled_rgb(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let pixels = (width as usize) * (height as usize);
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self::new(data, width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
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

    /// Returns an RGB copy of this frame, dropping the alpha channel of RGBA
    /// input. Returns `None` for layouts that have no RGB interpretation.
    pub fn to_rgb(&self) -> Option<Frame> {
        match self.channels {
            3 => Some(self.clone()),
            4 => {
                let rgb: Vec<u8> = self
                    .as_ndarray()
                    .slice(s![.., .., 0..3])
                    .iter()
                    .copied()
                    .collect();
                Some(Frame::new(rgb, self.width, self.height, 3, self.index))
            }
            _ => None,
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
