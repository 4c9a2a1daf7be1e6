//! Video decoding seam.
//!
//! The dataset never talks to a codec directly: it asks a [`VideoBackend`] for
//! frame counts and for fresh [`FrameSource`] handles. A handle lives for one
//! sample access and is released when dropped.

pub mod frame_data;
pub mod memory;
#[cfg(feature = "opencv")]
pub mod video;

use crate::error::DatasetResult;
use std::path::Path;

pub use frame_data::FrameData;
pub use memory::MemoryBackend;
#[cfg(feature = "opencv")]
pub use video::OpenCvBackend;

/// An open, positioned video stream.
pub trait FrameSource {
    /// Position the stream so the next read returns frame `frame_index`.
    fn seek(&mut self, frame_index: usize) -> DatasetResult<()>;

    /// Next frame in BGR order, `None` at end of stream.
    fn read_frame(&mut self) -> DatasetResult<Option<FrameData>>;
}

pub trait VideoBackend: Send + Sync {
    /// Number of frames the container reports. Videos that cannot be opened
    /// report 0 rather than failing.
    fn frame_count(&self, path: &Path) -> DatasetResult<usize>;

    fn open<'a>(&'a self, path: &Path) -> DatasetResult<Box<dyn FrameSource + 'a>>;
}

impl<B: VideoBackend + ?Sized> VideoBackend for &B {
    fn frame_count(&self, path: &Path) -> DatasetResult<usize> {
        (**self).frame_count(path)
    }

    fn open<'a>(&'a self, path: &Path) -> DatasetResult<Box<dyn FrameSource + 'a>> {
        (**self).open(path)
    }
}
