//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

/// Appends `v` and, if that takes the deque past `cap`, drops exactly one
/// element from the front. Returns the dropped element.
pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) -> Option<T> {
    dq.push_back(v);
    if dq.len() > cap {
        dq.pop_front()
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

/// Ordered trailing window of `(label, value)` points, oldest first.
#[derive(Debug, Clone)]
pub struct Series {
    points: VecDeque<Point>,
    cap: usize,
}

impl Series {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap.saturating_add(1)),
            cap,
        }
    }

    /// Returns the evicted point, if the window was already full.
    pub fn push(&mut self, label: impl Into<String>, value: f64) -> Option<Point> {
        let p = Point {
            label: label.into(),
            value,
        };
        push_capped(&mut self.points, p, self.cap)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn last(&self) -> Option<f64> {
        self.points.back().map(|p| p.value)
    }

    /// `(x, y)` pairs for plotting, x being the slot index. Non-finite values
    /// keep their slot but are not plotted.
    pub fn plot_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.value.is_finite())
            .map(|(i, p)| (i as f64, p.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_capped_drops_one_from_front() {
        let mut dq: VecDeque<u32> = VecDeque::new();
        for v in 0..3 {
            assert_eq!(push_capped(&mut dq, v, 3), None);
        }
        assert_eq!(push_capped(&mut dq, 3, 3), Some(0));
        assert_eq!(dq, [1, 2, 3]);
    }

    #[test]
    fn series_keeps_trailing_window_in_order() {
        let mut s = Series::new(4);
        for v in 1..=10 {
            s.push("", v as f64);
        }
        assert_eq!(s.len(), 4);
        assert_eq!(s.values(), vec![7.0, 8.0, 9.0, 10.0]);
        assert_eq!(s.last(), Some(10.0));
        assert!(s.labels().iter().all(|l| l.is_empty()));
    }

    #[test]
    fn eviction_reports_oldest_point() {
        let mut s = Series::new(2);
        assert!(s.push("a", 1.0).is_none());
        assert!(s.push("b", 2.0).is_none());
        let gone = s.push("c", 3.0).unwrap();
        assert_eq!(gone.label, "a");
        assert_eq!(s.labels(), vec!["b", "c"]);
    }

    #[test]
    fn plot_points_skip_non_finite_but_keep_slots() {
        let mut s = Series::new(5);
        s.push("", 10.0);
        s.push("", f64::NAN);
        s.push("", -4.0);
        assert_eq!(s.len(), 3);
        assert_eq!(s.plot_points(), vec![(0.0, 10.0), (2.0, -4.0)]);
    }
}
