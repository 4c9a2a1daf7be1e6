/// One decoded frame: packed 8-bit BGR, row-major, no row padding.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameData {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub fn new(buffer: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(buffer.len(), width as usize * height as usize * 3);
        Self { buffer, width, height }
    }

    /// Frame filled with a single BGR color.
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let buffer = bgr
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self { buffer, width, height }
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * 3
    }
}
