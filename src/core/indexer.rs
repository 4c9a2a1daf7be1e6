use crate::annotation::EventRange;

pub const ANOMALOUS: f32 = 1.0;
pub const NORMAL: f32 = 0.0;

/// One sliding-window position inside a single video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLabel {
    pub start: usize,
    pub label: f32,
}

/// Closed-interval intersection of `[start, end]` with an event range.
#[inline]
pub fn window_overlaps(start: usize, end: usize, range: &EventRange) -> bool {
    let (start, end) = (start as i64, end as i64);
    !(end < range.start || start > range.end)
}

/// 1.0 if the window touches any event range, else 0.0. An empty window
/// (`seq_len == 0`) covers no frames and is always normal.
pub fn label_window(start: usize, seq_len: usize, events: &[EventRange]) -> f32 {
    if seq_len == 0 {
        return NORMAL;
    }
    let end = start + seq_len - 1;
    if events.iter().any(|r| window_overlaps(start, end, r)) {
        ANOMALOUS
    } else {
        NORMAL
    }
}

/// Every unit-stride window start in `0..=frame_count - seq_len`, labeled.
///
/// Videos shorter than `seq_len` yield nothing. `seq_len` must be at least 1;
/// the dataset config enforces that before indexing.
pub fn index_windows(frame_count: usize, seq_len: usize, events: &[EventRange]) -> Vec<WindowLabel> {
    if seq_len == 0 || frame_count < seq_len {
        return Vec::new();
    }
    (0..=frame_count - seq_len)
        .map(|start| WindowLabel {
            start,
            label: label_window(start, seq_len, events),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(windows: &[WindowLabel]) -> Vec<usize> {
        windows.iter().map(|w| w.start).collect()
    }

    #[test]
    fn window_count_and_order() {
        for (frame_count, seq_len) in [(1, 1), (8, 8), (20, 8), (100, 3), (9, 1)] {
            let windows = index_windows(frame_count, seq_len, &[]);
            assert_eq!(windows.len(), frame_count - seq_len + 1);
            assert_eq!(starts(&windows), (0..=frame_count - seq_len).collect::<Vec<_>>());
            assert!(windows.iter().all(|w| w.label == NORMAL));
        }
    }

    #[test]
    fn short_video_yields_nothing() {
        assert!(index_windows(7, 8, &[EventRange::new(0, 10)]).is_empty());
        assert!(index_windows(0, 1, &[]).is_empty());
    }

    #[test]
    fn single_event_scenario() {
        let windows = index_windows(20, 8, &[EventRange::new(5, 9)]);
        assert_eq!(windows.len(), 13);
        for w in &windows {
            let expected = if w.start <= 9 { ANOMALOUS } else { NORMAL };
            assert_eq!(w.label, expected, "start {}", w.start);
        }
    }

    #[test]
    fn boundary_touching_counts_as_overlap() {
        // window end == range start
        assert!(window_overlaps(0, 7, &EventRange::new(7, 12)));
        // window start == range end
        assert!(window_overlaps(12, 19, &EventRange::new(7, 12)));
        // one frame apart on either side
        assert!(!window_overlaps(0, 6, &EventRange::new(7, 12)));
        assert!(!window_overlaps(13, 20, &EventRange::new(7, 12)));
    }

    #[test]
    fn window_inside_range_and_range_inside_window() {
        assert!(window_overlaps(10, 12, &EventRange::new(0, 100)));
        assert!(window_overlaps(0, 100, &EventRange::new(50, 50)));
    }

    #[test]
    fn any_of_several_ranges_marks_anomalous() {
        let events = [EventRange::new(100, 120), EventRange::new(2, 3), EventRange::new(50, 60)];
        assert_eq!(label_window(0, 4, &events), ANOMALOUS);
        assert_eq!(label_window(10, 4, &events), NORMAL);
        assert_eq!(label_window(57, 4, &events), ANOMALOUS);

        let windows = index_windows(30, 4, &events);
        let positives: Vec<usize> = windows
            .iter()
            .filter(|w| w.label == ANOMALOUS)
            .map(|w| w.start)
            .collect();
        assert_eq!(positives, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_window_is_normal() {
        assert_eq!(label_window(0, 0, &[EventRange::new(0, 10)]), NORMAL);
        assert_eq!(label_window(5, 0, &[EventRange::new(0, 10)]), NORMAL);
    }

    #[test]
    fn range_order_does_not_change_labels() {
        let a = [EventRange::new(3, 5), EventRange::new(20, 25)];
        let b = [EventRange::new(20, 25), EventRange::new(3, 5)];
        assert_eq!(index_windows(40, 6, &a), index_windows(40, 6, &b));
    }
}
