//! Sliding-window sample preparation for video anomaly detection.
//!
//! Annotations name closed frame ranges of anomalous events; every window of
//! `seq_len` consecutive frames becomes one sample labeled 1.0 if it touches an
//! event and 0.0 otherwise. Frames are decoded lazily, cropped to the video's
//! region of interest and returned as `(seq_len, 3, 256, 256)` RGB tensors.

pub mod annotation;
pub mod config;
pub mod core;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod logging;

pub use annotation::{load_annotation, Annotation, EventRange};
pub use config::{DatasetConfig, Roi, ShortReadPolicy};
pub use dataset::{AnomalyDataset, DatasetSummary, LabeledSequence, Sample, SequenceDataset, VideoSummary};
pub use error::{DatasetError, DatasetResult};
