use super::processor::FrameProcessor;
use super::sequence::SequenceTensor;
use crate::config::{DatasetConfig, Roi, ShortReadPolicy};
use crate::decoder::VideoBackend;
use crate::error::{DatasetError, DatasetResult};
use std::path::Path;
use tracing::debug;

/// Post-processing applied to every extracted sequence.
pub type SequenceTransform = Box<dyn Fn(SequenceTensor) -> SequenceTensor + Send + Sync>;

/// Decodes `seq_len` consecutive frames starting at a window start and runs
/// each through the [`FrameProcessor`].
///
/// Every call opens its own decoder handle and drops it before returning, so
/// no state is carried from one sample to the next.
pub struct SequenceExtractor {
    seq_len: usize,
    output_size: u32,
    short_read: ShortReadPolicy,
    transform: Option<SequenceTransform>,
}

impl SequenceExtractor {
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            seq_len: config.seq_len,
            output_size: config.output_size,
            short_read: config.short_read,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: SequenceTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn set_transform(&mut self, transform: Option<SequenceTransform>) {
        self.transform = transform;
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn extract<B: VideoBackend + ?Sized>(
        &self,
        backend: &B,
        video: &Path,
        start: usize,
        roi: Roi,
    ) -> DatasetResult<SequenceTensor> {
        let mut processor = FrameProcessor::new(self.output_size);
        let frame_len = processor.frame_len();
        let mut data = Vec::with_capacity(frame_len * self.seq_len);
        let mut read = 0;

        {
            let mut source = backend.open(video)?;
            source.seek(start)?;
            while read < self.seq_len {
                let Some(frame) = source.read_frame()? else {
                    break; // EOF
                };
                data.resize(data.len() + frame_len, 0.0);
                processor.process_frame_into(&frame, roi, &mut data[read * frame_len..])?;
                read += 1;
            }
        }

        if read == 0 {
            return Err(DatasetError::EmptySequence {
                path: video.to_path_buf(),
                start,
            });
        }

        let mut seq = SequenceTensor::from_vec(data, read, self.output_size as usize)?;
        if read < self.seq_len {
            debug!(
                video = %video.display(),
                start,
                read,
                expected = self.seq_len,
                policy = ?self.short_read,
                "short read"
            );
            match self.short_read {
                ShortReadPolicy::Truncate => {}
                ShortReadPolicy::PadLast => seq.pad_with_last(self.seq_len),
                ShortReadPolicy::Reject => {
                    return Err(DatasetError::ShortRead {
                        path: video.to_path_buf(),
                        start,
                        expected: self.seq_len,
                        got: read,
                    });
                }
            }
        }

        Ok(match &self.transform {
            Some(transform) => transform(seq),
            None => seq,
        })
    }
}
