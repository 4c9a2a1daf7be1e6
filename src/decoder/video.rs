use super::{FrameData, FrameSource, VideoBackend};
use crate::error::{DatasetError, DatasetResult};
use opencv::{core, imgproc, prelude::*, videoio};
use std::path::{Path, PathBuf};

/// Decodes containers through OpenCV's `VideoCapture` (CAP_ANY backend).
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    pub fn new() -> Self {
        Self
    }
}

fn open_capture(path: &Path) -> DatasetResult<videoio::VideoCapture> {
    let name = path
        .to_str()
        .ok_or_else(|| DatasetError::decoder(path, "path is not valid UTF-8"))?;
    videoio::VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|e| DatasetError::decoder(path, e))
}

impl VideoBackend for OpenCvBackend {
    fn frame_count(&self, path: &Path) -> DatasetResult<usize> {
        let mut capture = open_capture(path)?;
        let opened = capture.is_opened().map_err(|e| DatasetError::decoder(path, e))?;
        let count = if opened {
            capture
                .get(videoio::CAP_PROP_FRAME_COUNT)
                .map_err(|e| DatasetError::decoder(path, e))?
        } else {
            0.0
        };
        let _ = capture.release();
        // Containers without an index report -1 or NaN.
        Ok(if count.is_finite() && count > 0.0 { count as usize } else { 0 })
    }

    fn open<'a>(&'a self, path: &Path) -> DatasetResult<Box<dyn FrameSource + 'a>> {
        let capture = open_capture(path)?;
        let source = CaptureSource {
            capture,
            path: path.to_path_buf(),
        };
        if !source.capture.is_opened().map_err(|e| DatasetError::decoder(path, e))? {
            return Err(DatasetError::decoder(path, "failed to open video file"));
        }
        Ok(Box::new(source))
    }
}

struct CaptureSource {
    capture: videoio::VideoCapture,
    path: PathBuf,
}

impl CaptureSource {
    fn to_bgr(&self, frame: Mat) -> DatasetResult<Mat> {
        let code = match frame.channels() {
            3 => return Ok(frame),
            1 => imgproc::COLOR_GRAY2BGR,
            4 => imgproc::COLOR_BGRA2BGR,
            n => {
                return Err(DatasetError::decoder(&self.path, format!("unsupported channel count {n}")));
            }
        };
        let mut bgr = Mat::default();
        imgproc::cvt_color(&frame, &mut bgr, code, 0, core::AlgorithmHint::ALGO_HINT_DEFAULT)
            .map_err(|e| DatasetError::decoder(&self.path, e))?;
        Ok(bgr)
    }
}

impl FrameSource for CaptureSource {
    fn seek(&mut self, frame_index: usize) -> DatasetResult<()> {
        self.capture
            .set(videoio::CAP_PROP_POS_FRAMES, frame_index as f64)
            .map_err(|e| DatasetError::decoder(&self.path, e))?;
        Ok(())
    }

    fn read_frame(&mut self) -> DatasetResult<Option<FrameData>> {
        let mut frame = Mat::default();
        if !self
            .capture
            .read(&mut frame)
            .map_err(|e| DatasetError::decoder(&self.path, e))?
        {
            return Ok(None); // EOF
        }
        if frame.empty() {
            return Ok(None);
        }

        let mut bgr = self.to_bgr(frame)?;
        if !bgr.is_continuous() {
            bgr = bgr.try_clone().map_err(|e| DatasetError::decoder(&self.path, e))?;
        }
        let width = bgr.cols() as u32;
        let height = bgr.rows() as u32;
        let data = bgr.data_bytes().map_err(|e| DatasetError::decoder(&self.path, e))?;
        Ok(Some(FrameData::new(data.to_vec(), width, height)))
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}
