use crate::error::{DatasetError, DatasetResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Region of interest as `(x1, y1, x2, y2)` pixel corners, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Roi {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.x2 <= width && self.y2 <= height
    }

    pub fn as_array(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl std::str::FromStr for Roi {
    type Err = String;

    /// Parses `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>().map_err(|e| format!("bad roi component {p:?}: {e}")))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [x1, y1, x2, y2] if x1 < x2 && y1 < y2 => Ok(Roi::new(*x1, *y1, *x2, *y2)),
            [_, _, _, _] => Err(format!("roi {s:?} needs x1 < x2 and y1 < y2")),
            _ => Err(format!("roi {s:?} needs four comma-separated values")),
        }
    }
}

/// What the extractor does when the decoder runs out of frames before `seq_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ShortReadPolicy {
    /// Return only the frames that were read.
    #[default]
    Truncate,
    /// Repeat the last decoded frame up to `seq_len`.
    PadLast,
    /// Fail with [`DatasetError::ShortRead`].
    Reject,
}

pub const DEFAULT_ROI: Roi = Roi::new(1150, 300, 1600, 700);
pub const DEFAULT_OUTPUT_SIZE: u32 = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Consecutive frames per sample.
    pub seq_len: usize,
    /// Frame rate of the source footage. Annotations are frame indices, so this
    /// is carried for reference only and never enters the labeling.
    pub fps: u32,
    /// Used for every video whose annotation has no `roi`.
    pub default_roi: Roi,
    /// Side length of the square frames fed to the model.
    pub output_size: u32,
    pub short_read: ShortReadPolicy,
    /// Sibling directory of the label directory holding the videos.
    pub video_dir_name: String,
    pub video_extension: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seq_len: 8,
            fps: 8,
            default_roi: DEFAULT_ROI,
            output_size: DEFAULT_OUTPUT_SIZE,
            short_read: ShortReadPolicy::Truncate,
            video_dir_name: "video".to_string(),
            video_extension: "mp4".to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn from_json_file(path: &Path) -> DatasetResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DatasetResult<()> {
        if self.seq_len == 0 {
            return Err(DatasetError::InvalidConfig("seq_len must be at least 1".into()));
        }
        if self.output_size == 0 {
            return Err(DatasetError::InvalidConfig("output_size must be at least 1".into()));
        }
        if self.default_roi.is_empty() {
            return Err(DatasetError::InvalidConfig(format!(
                "default_roi {:?} is empty",
                self.default_roi.as_array()
            )));
        }
        if self.video_extension.is_empty() {
            return Err(DatasetError::InvalidConfig("video_extension is empty".into()));
        }
        Ok(())
    }
}
