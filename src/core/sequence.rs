use super::processor::CHANNELS;
use crate::error::{DatasetError, DatasetResult};

/// Stack of processed frames, shape `(frames, 3, size, size)`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceTensor {
    data: Vec<f32>,
    frames: usize,
    size: usize,
}

impl SequenceTensor {
    /// `data.len()` must equal `frames * 3 * size * size`.
    pub fn from_vec(data: Vec<f32>, frames: usize, size: usize) -> DatasetResult<Self> {
        let expected = frames * CHANNELS * size * size;
        if data.len() != expected {
            return Err(DatasetError::ShapeMismatch {
                shape: [frames, CHANNELS, size, size],
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, frames, size })
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.frames, CHANNELS, self.size, self.size]
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    fn frame_len(&self) -> usize {
        CHANNELS * self.size * self.size
    }

    /// Channel-first planes of frame `t`.
    pub fn frame(&self, t: usize) -> Option<&[f32]> {
        let len = self.frame_len();
        self.data.get(t * len..(t + 1) * len)
    }

    /// One `size`×`size` plane; channel 0 is red.
    pub fn plane(&self, t: usize, channel: usize) -> Option<&[f32]> {
        let plane = self.size * self.size;
        if channel >= CHANNELS {
            return None;
        }
        self.frame(t).map(|f| &f[channel * plane..(channel + 1) * plane])
    }

    /// Repeats the last frame until the sequence holds `frames` frames.
    pub(crate) fn pad_with_last(&mut self, frames: usize) {
        let len = self.frame_len();
        if self.frames == 0 || self.frames >= frames {
            return;
        }
        let last = self.data[(self.frames - 1) * len..].to_vec();
        for _ in self.frames..frames {
            self.data.extend_from_slice(&last);
        }
        self.frames = frames;
    }

    /// Interleaved 8-bit RGB for frame `t`, e.g. for writing an image.
    pub fn frame_rgb8(&self, t: usize) -> Option<Vec<u8>> {
        let planes: Vec<&[f32]> = (0..CHANNELS).map(|c| self.plane(t, c)).collect::<Option<_>>()?;
        let pixels = self.size * self.size;
        let mut out = Vec::with_capacity(pixels * CHANNELS);
        for i in 0..pixels {
            for plane in &planes {
                out.push((plane[i] * 255.0).round().clamp(0.0, 255.0) as u8);
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_frames() -> SequenceTensor {
        // size 1: frame 0 = (0.1, 0.2, 0.3), frame 1 = (0.4, 0.5, 0.6)
        SequenceTensor::from_vec(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 2, 1).unwrap()
    }

    #[test]
    fn indexing_frames_and_planes() {
        let t = two_frames();
        assert_eq!(t.shape(), [2, 3, 1, 1]);
        assert_eq!(t.frame(1), Some(&[0.4, 0.5, 0.6][..]));
        assert_eq!(t.plane(0, 2), Some(&[0.3][..]));
        assert!(t.frame(2).is_none());
        assert!(t.plane(0, 3).is_none());
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let err = SequenceTensor::from_vec(vec![0.0; 5], 2, 1).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ShapeMismatch {
                shape: [2, 3, 1, 1],
                expected: 6,
                got: 5
            }
        ));
    }

    #[test]
    fn padding_repeats_last_frame() {
        let mut t = two_frames();
        t.pad_with_last(4);
        assert_eq!(t.shape(), [4, 3, 1, 1]);
        assert_eq!(t.frame(3), t.frame(1));
    }

    #[test]
    fn rgb8_interleaves_planes() {
        // size 2, one frame: red plane all 1.0, green 0.0, blue 0.5
        let mut data = vec![1.0; 4];
        data.extend([0.0; 4]);
        data.extend([0.5; 4]);
        let t = SequenceTensor::from_vec(data, 1, 2).unwrap();
        let rgb = t.frame_rgb8(0).unwrap();
        assert_eq!(rgb.len(), 12);
        assert_eq!(&rgb[..3], &[255, 0, 128]);
        assert!(t.frame_rgb8(1).is_none());
    }
}
