pub mod extractor;
pub mod indexer;
pub mod processor;
pub mod sequence;

pub use extractor::{SequenceExtractor, SequenceTransform};
pub use indexer::{index_windows, label_window, window_overlaps, WindowLabel, ANOMALOUS, NORMAL};
pub use processor::FrameProcessor;
pub use sequence::SequenceTensor;
