use crate::config::Roi;
use crate::decoder::FrameData;
use crate::error::{DatasetError, DatasetResult};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use rayon::prelude::*;

pub const CHANNELS: usize = 3;

/// Turns decoded BGR frames into normalized, channel-first RGB planes:
/// crop to ROI, resize to `size`×`size`, BGR→RGB, `/ 255`.
///
/// The resize is plain two-tap bilinear interpolation (OpenCV `INTER_LINEAR`),
/// without widening the kernel when downscaling.
pub struct FrameProcessor {
    size: u32,
    resizer: Resizer,
    options: ResizeOptions,
}

impl FrameProcessor {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Interpolation(FilterType::Bilinear)),
        }
    }

    pub fn output_size(&self) -> u32 {
        self.size
    }

    /// Number of `f32` values one processed frame occupies.
    pub fn frame_len(&self) -> usize {
        CHANNELS * self.size as usize * self.size as usize
    }

    pub fn process_frame(&mut self, frame: &FrameData, roi: Roi) -> DatasetResult<Vec<f32>> {
        let mut out = vec![0.0; self.frame_len()];
        self.process_frame_into(frame, roi, &mut out)?;
        Ok(out)
    }

    pub fn process_frame_into(&mut self, frame: &FrameData, roi: Roi, out: &mut [f32]) -> DatasetResult<()> {
        if out.len() != self.frame_len() {
            return Err(DatasetError::Resize(format!(
                "output buffer holds {} values, frame needs {}",
                out.len(),
                self.frame_len()
            )));
        }

        let crop = crop_bgr(frame, roi)?;
        let src = Image::from_vec_u8(roi.width(), roi.height(), crop, PixelType::U8x3)
            .map_err(|e| DatasetError::Resize(e.to_string()))?;
        let mut dst = Image::new(self.size, self.size, PixelType::U8x3);
        self.resizer
            .resize(&src, &mut dst, &self.options)
            .map_err(|e| DatasetError::Resize(e.to_string()))?;

        let resized = dst.buffer();
        let plane = self.size as usize * self.size as usize;
        // Plane 0 is R, which sits at offset 2 in a BGR pixel.
        out.par_chunks_mut(plane).enumerate().for_each(|(channel, dst_plane)| {
            let src_offset = CHANNELS - 1 - channel;
            for (i, value) in dst_plane.iter_mut().enumerate() {
                *value = resized[i * CHANNELS + src_offset] as f32 / 255.0;
            }
        });
        Ok(())
    }
}

/// Copies `frame[y1..y2, x1..x2]` into a packed buffer.
pub fn crop_bgr(frame: &FrameData, roi: Roi) -> DatasetResult<Vec<u8>> {
    if !roi.fits_within(frame.width, frame.height) {
        return Err(DatasetError::RoiOutOfBounds {
            roi: roi.as_array(),
            width: frame.width,
            height: frame.height,
        });
    }
    let stride = frame.row_stride();
    let x_start = roi.x1 as usize * CHANNELS;
    let x_end = roi.x2 as usize * CHANNELS;
    let mut crop = Vec::with_capacity(roi.width() as usize * roi.height() as usize * CHANNELS);
    for row in frame.buffer.chunks_exact(stride).skip(roi.y1 as usize).take(roi.height() as usize) {
        crop.extend_from_slice(&row[x_start..x_end]);
    }
    Ok(crop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_takes_the_requested_rectangle() {
        // 4x2 frame, pixel (x, y) = [x, y, 9]
        let mut buffer = Vec::new();
        for y in 0..2u8 {
            for x in 0..4u8 {
                buffer.extend_from_slice(&[x, y, 9]);
            }
        }
        let frame = FrameData::new(buffer, 4, 2);
        let crop = crop_bgr(&frame, Roi::new(1, 1, 3, 2)).unwrap();
        assert_eq!(crop, vec![1, 1, 9, 2, 1, 9]);
    }

    #[test]
    fn roi_outside_frame_is_rejected() {
        let frame = FrameData::solid(32, 16, [0, 0, 0]);
        let err = crop_bgr(&frame, Roi::new(0, 0, 33, 16)).unwrap_err();
        assert!(matches!(err, DatasetError::RoiOutOfBounds { width: 32, height: 16, .. }));
    }

    #[test]
    fn output_is_rgb_channel_first_and_normalized() {
        let mut proc = FrameProcessor::new(16);
        let frame = FrameData::solid(40, 30, [10, 128, 250]);
        let out = proc.process_frame(&frame, Roi::new(5, 5, 35, 25)).unwrap();
        assert_eq!(out.len(), 3 * 16 * 16);

        let plane = 16 * 16;
        let expect = [250.0 / 255.0, 128.0 / 255.0, 10.0 / 255.0];
        for (channel, expected) in expect.iter().enumerate() {
            for v in &out[channel * plane..(channel + 1) * plane] {
                assert!((v - expected).abs() <= 1.0 / 255.0, "channel {channel}: {v}");
            }
        }
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn roi_selects_region_before_resize() {
        // left half blue, right half red (BGR)
        let (w, h) = (20u32, 10u32);
        let mut buffer = Vec::new();
        for _ in 0..h {
            for x in 0..w {
                buffer.extend_from_slice(if x < 10 { &[255, 0, 0] } else { &[0, 0, 255] });
            }
        }
        let frame = FrameData::new(buffer, w, h);
        let mut proc = FrameProcessor::new(8);
        let out = proc.process_frame(&frame, Roi::new(10, 0, 20, 10)).unwrap();
        let plane = 64;
        assert!(out[..plane].iter().all(|v| *v > 0.99), "red plane");
        assert!(out[2 * plane..].iter().all(|v| *v < 0.01), "blue plane");
    }

    /// OpenCV INTER_LINEAR along one axis: half-pixel centers, two taps,
    /// source coordinate clamped at the borders.
    fn inter_linear_row(src: &[f32], dst_len: usize) -> Vec<f32> {
        let scale = src.len() as f64 / dst_len as f64;
        (0..dst_len)
            .map(|x| {
                let fx = (x as f64 + 0.5) * scale - 0.5;
                let mut sx = fx.floor() as isize;
                let mut a = fx - sx as f64;
                if sx < 0 {
                    sx = 0;
                    a = 0.0;
                }
                if sx as usize >= src.len() - 1 {
                    sx = src.len() as isize - 1;
                    a = 0.0;
                }
                let sx = sx as usize;
                let next = (sx + 1).min(src.len() - 1);
                (src[sx] as f64 * (1.0 - a) + src[next] as f64 * a) as f32
            })
            .collect()
    }

    #[test]
    fn downscale_matches_inter_linear_on_fine_detail() {
        // default ROI size, columns alternating black/white
        let (w, h) = (450u32, 400u32);
        let row: Vec<f32> = (0..w).map(|x| if x % 2 == 0 { 0.0 } else { 255.0 }).collect();
        let mut buffer = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..h {
            for v in &row {
                buffer.extend_from_slice(&[*v as u8; 3]);
            }
        }
        let frame = FrameData::new(buffer, w, h);

        let mut proc = FrameProcessor::new(256);
        let out = proc.process_frame(&frame, Roi::new(0, 0, w, h)).unwrap();
        let expected = inter_linear_row(&row, 256);

        let plane = 256 * 256;
        for channel in 0..3 {
            for y in [0usize, 128, 255] {
                let start = channel * plane + y * 256;
                for (x, (got, want)) in out[start..start + 256].iter().zip(&expected).enumerate() {
                    let got = got * 255.0;
                    assert!(
                        (got - want).abs() <= 2.0,
                        "channel {channel} row {y} col {x}: got {got}, want {want}"
                    );
                }
            }
        }
    }
}
