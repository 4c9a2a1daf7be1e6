//! Per-video annotation records.
//!
//! A record looks like
//! `{"annotations": {"event_frame": [[120, 180], [400, 410]], "roi": [1150, 300, 1600, 700]}}`
//! where `event_frame` lists closed frame-index ranges of anomalous events and
//! the optional `roi` overrides the caller's default crop.

use crate::config::Roi;
use crate::error::{DatasetError, DatasetResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Closed interval of frame indices `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRange {
    pub start: i64,
    pub end: i64,
}

impl EventRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub events: Vec<EventRange>,
    pub roi: Roi,
}

// Internal types for JSON deserialization
#[derive(Deserialize)]
struct AnnotationRecord {
    annotations: AnnotationBody,
}

#[derive(Deserialize)]
struct AnnotationBody {
    event_frame: Vec<[Number; 2]>,
    #[serde(default)]
    roi: Option<[Number; 4]>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Integral value, truncating floats toward zero.
    fn to_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.is_finite() && v.abs() < i64::MAX as f64 => Some(v.trunc() as i64),
            Number::Float(_) => None,
        }
    }
}

pub fn load_annotation(path: &Path, default_roi: Roi) -> DatasetResult<Annotation> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_annotation(&text, path, default_roi)
}

/// Parses a record already in memory; `path` is only used in error messages.
pub fn parse_annotation(text: &str, path: &Path, default_roi: Roi) -> DatasetResult<Annotation> {
    let record: AnnotationRecord = serde_json::from_str(text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |msg: String| DatasetError::Annotation {
        path: path.to_path_buf(),
        msg,
    };

    let mut events = Vec::with_capacity(record.annotations.event_frame.len());
    for (i, [s, e]) in record.annotations.event_frame.into_iter().enumerate() {
        let (Some(start), Some(end)) = (s.to_i64(), e.to_i64()) else {
            return Err(invalid(format!("event_frame[{i}] is not an integer pair")));
        };
        if start > end {
            return Err(invalid(format!("event_frame[{i}] has start {start} > end {end}")));
        }
        events.push(EventRange::new(start, end));
    }

    let roi = match record.annotations.roi {
        None => default_roi,
        Some(coords) => {
            let mut px = [0u32; 4];
            for (slot, n) in px.iter_mut().zip(coords) {
                *slot = n
                    .to_i64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| invalid("roi values must be non-negative integers".into()))?;
            }
            let roi = Roi::new(px[0], px[1], px[2], px[3]);
            if roi.is_empty() {
                return Err(invalid(format!("roi {px:?} needs x1 < x2 and y1 < y2")));
            }
            roi
        }
    };

    Ok(Annotation { events, roi })
}
