//! Map-style datasets over sliding windows of annotated videos.
//!
//! [`AnomalyDataset::from_annotation`] covers one video,
//! [`AnomalyDataset::from_label_dir`] every annotation in a directory. Both
//! lay videos out as `<project>/label/<name>.json` next to
//! `<project>/video/<name>.mp4`.

use crate::annotation::load_annotation;
use crate::config::{DatasetConfig, Roi};
use crate::core::{index_windows, SequenceExtractor, SequenceTensor, SequenceTransform, ANOMALOUS};
use crate::decoder::VideoBackend;
use crate::error::{DatasetError, DatasetResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One addressable window.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub video: Arc<Path>,
    pub start: usize,
    pub label: f32,
    pub roi: Roi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSequence {
    pub sequence: SequenceTensor,
    pub label: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub annotation: PathBuf,
    pub video: PathBuf,
    pub frame_count: usize,
    pub events: usize,
    pub roi: Roi,
    /// Index of this video's first sample in the dataset.
    pub first_sample: usize,
    pub samples: usize,
    pub positives: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub seq_len: usize,
    pub fps: u32,
    pub samples: usize,
    pub positives: usize,
    pub videos: Vec<VideoSummary>,
}

/// Size and indexed access, the contract training loops consume.
pub trait SequenceDataset {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> DatasetResult<LabeledSequence>;
}

/// `<annotation dir>/../<video_dir_name>/<stem>.<video_extension>`
pub fn video_path_for(annotation: &Path, config: &DatasetConfig) -> PathBuf {
    let project_dir = annotation.parent().and_then(Path::parent).unwrap_or_else(|| Path::new(""));
    let stem = annotation.file_stem().unwrap_or_default();
    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(&config.video_extension);
    project_dir.join(&config.video_dir_name).join(file_name)
}

/// Every `*.json` file directly inside `label_dir`, sorted by file name.
pub fn discover_annotations(label_dir: &Path) -> DatasetResult<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| DatasetError::Io {
        path: label_dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(label_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

pub struct AnomalyDataset<B> {
    backend: B,
    config: DatasetConfig,
    extractor: SequenceExtractor,
    samples: Vec<Sample>,
    videos: Vec<VideoSummary>,
}

impl<B: VideoBackend> AnomalyDataset<B> {
    /// Dataset over the single video belonging to `annotation`.
    pub fn from_annotation(annotation: &Path, config: DatasetConfig, backend: B) -> DatasetResult<Self> {
        Self::from_annotations(&[annotation.to_path_buf()], config, backend)
    }

    /// Dataset over every annotation in `label_dir`, concatenated in file-name order.
    pub fn from_label_dir(label_dir: &Path, config: DatasetConfig, backend: B) -> DatasetResult<Self> {
        let annotations = discover_annotations(label_dir)?;
        if annotations.is_empty() {
            warn!(dir = %label_dir.display(), "no annotation files found");
        }
        Self::from_annotations(&annotations, config, backend)
    }

    /// Indexes `annotations` in the given order. Any unreadable or malformed
    /// record aborts the whole build.
    pub fn from_annotations(annotations: &[PathBuf], config: DatasetConfig, backend: B) -> DatasetResult<Self> {
        config.validate()?;

        let mut samples = Vec::new();
        let mut videos = Vec::with_capacity(annotations.len());
        for ann_path in annotations {
            let annotation = load_annotation(ann_path, config.default_roi)?;
            let video_path = video_path_for(ann_path, &config);
            let frame_count = backend.frame_count(&video_path)?;
            if frame_count == 0 {
                warn!(video = %video_path.display(), "video reports no frames, skipping");
            }

            let windows = index_windows(frame_count, config.seq_len, &annotation.events);
            let positives = windows.iter().filter(|w| w.label == ANOMALOUS).count();
            debug!(
                annotation = %ann_path.display(),
                frame_count,
                events = annotation.events.len(),
                samples = windows.len(),
                positives,
                "indexed video"
            );

            let video: Arc<Path> = Arc::from(video_path.as_path());
            videos.push(VideoSummary {
                annotation: ann_path.clone(),
                video: video_path,
                frame_count,
                events: annotation.events.len(),
                roi: annotation.roi,
                first_sample: samples.len(),
                samples: windows.len(),
                positives,
            });
            samples.extend(windows.into_iter().map(|w| Sample {
                video: Arc::clone(&video),
                start: w.start,
                label: w.label,
                roi: annotation.roi,
            }));
        }

        info!(
            videos = videos.len(),
            samples = samples.len(),
            seq_len = config.seq_len,
            fps = config.fps,
            "dataset indexed"
        );

        Ok(Self {
            extractor: SequenceExtractor::new(&config),
            backend,
            config,
            samples,
            videos,
        })
    }

    pub fn with_transform(mut self, transform: SequenceTransform) -> Self {
        self.extractor.set_transform(Some(transform));
        self
    }
}

impl<B> AnomalyDataset<B> {
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn videos(&self) -> &[VideoSummary] {
        &self.videos
    }

    pub fn positives(&self) -> usize {
        self.samples.iter().filter(|s| s.label == ANOMALOUS).count()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            seq_len: self.config.seq_len,
            fps: self.config.fps,
            samples: self.samples.len(),
            positives: self.positives(),
            videos: self.videos.clone(),
        }
    }
}

impl<B: VideoBackend> SequenceDataset for AnomalyDataset<B> {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> DatasetResult<LabeledSequence> {
        let sample = self.samples.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.samples.len(),
        })?;
        let sequence = self
            .extractor
            .extract(&self.backend, &sample.video, sample.start, sample.roi)?;
        Ok(LabeledSequence {
            sequence,
            label: sample.label,
        })
    }
}
