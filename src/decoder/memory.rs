//! In-memory videos, for tests and for exercising the pipeline without codecs.

use super::{FrameData, FrameSource, VideoBackend};
use crate::error::{DatasetError, DatasetResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SyntheticVideo {
    frames: Vec<FrameData>,
    /// Count advertised by the "container"; may exceed the decodable frames.
    reported_frames: usize,
}

impl SyntheticVideo {
    pub fn from_frames(frames: Vec<FrameData>) -> Self {
        let reported_frames = frames.len();
        Self {
            frames,
            reported_frames,
        }
    }

    /// `frame_count` frames of one color; frame `i` carries `i % 256` in its
    /// blue channel so order survives the pipeline.
    pub fn solid(width: u32, height: u32, frame_count: usize, bgr: [u8; 3]) -> Self {
        let frames = (0..frame_count)
            .map(|i| FrameData::solid(width, height, [(i % 256) as u8, bgr[1], bgr[2]]))
            .collect();
        Self::from_frames(frames)
    }

    /// Advertise `reported` frames while only the existing ones decode.
    pub fn reporting(mut self, reported: usize) -> Self {
        self.reported_frames = reported;
        self
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    videos: HashMap<PathBuf, SyntheticVideo>,
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, video: SyntheticVideo) {
        self.videos.insert(path.into(), video);
    }

    pub fn with_video(mut self, path: impl Into<PathBuf>, video: SyntheticVideo) -> Self {
        self.insert(path, video);
        self
    }

    /// Handles opened since construction.
    pub fn opened_handles(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Handles currently open.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl VideoBackend for MemoryBackend {
    fn frame_count(&self, path: &Path) -> DatasetResult<usize> {
        Ok(self.videos.get(path).map_or(0, |v| v.reported_frames))
    }

    fn open<'a>(&'a self, path: &Path) -> DatasetResult<Box<dyn FrameSource + 'a>> {
        let video = self
            .videos
            .get(path)
            .ok_or_else(|| DatasetError::decoder(path, "failed to open video file"))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySource {
            frames: &video.frames,
            cursor: 0,
            live: Arc::clone(&self.live),
        }))
    }
}

struct MemorySource<'a> {
    frames: &'a [FrameData],
    cursor: usize,
    live: Arc<AtomicUsize>,
}

impl FrameSource for MemorySource<'_> {
    fn seek(&mut self, frame_index: usize) -> DatasetResult<()> {
        self.cursor = frame_index;
        Ok(())
    }

    fn read_frame(&mut self) -> DatasetResult<Option<FrameData>> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }
}

impl Drop for MemorySource<'_> {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_video_reports_zero_frames() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.frame_count(Path::new("missing.mp4")).unwrap(), 0);
        assert!(backend.open(Path::new("missing.mp4")).is_err());
    }

    #[test]
    fn handles_are_counted_and_released() {
        let backend = MemoryBackend::new().with_video("a.mp4", SyntheticVideo::solid(4, 4, 3, [0, 0, 0]));
        {
            let mut src = backend.open(Path::new("a.mp4")).unwrap();
            src.seek(2).unwrap();
            assert_eq!(src.read_frame().unwrap().map(|f| f.buffer[0]), Some(2));
            assert!(src.read_frame().unwrap().is_none());
            assert_eq!(backend.live_handles(), 1);
        }
        assert_eq!(backend.live_handles(), 0);
        assert_eq!(backend.opened_handles(), 1);
    }
}
