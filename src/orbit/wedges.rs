//! Equal-area wedge tracking (Kepler's second law).
//!
//! Keeps the last `num_wedges + 1` positions and measures the triangle each
//! consecutive pair spans with the focus:
//!
//! ```text
//! A = ½·|x₁·y₂ - y₁·x₂|
//! ```
//!
//! With a fixed mean-anomaly step the triangles approximate equal sectors,
//! so their coefficient of variation stays small.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{KeplerError, KeplerResult};
use crate::orbit::vec2::Vec2;

/// Default number of wedges displayed.
pub const DEFAULT_NUM_WEDGES: usize = 8;

/// Area at which the color weight saturates, as a multiple of the mean.
const COLOR_SATURATION: f64 = 1.5;

/// Triangle area between the focus and two points.
#[must_use]
pub fn triangle_area(p1: Vec2, p2: Vec2) -> f64 {
    0.5 * p1.cross(&p2).abs()
}

/// Bounded FIFO of recent body positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryHistory {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl TrajectoryHistory {
    /// Create an empty history holding at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, dropping the oldest when full.
    pub fn push(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }

    /// Consecutive `(older, newer)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.iter().zip(self.points.iter().skip(1)).map(|(a, b)| (*a, *b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Summary statistics over the current wedge areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WedgeAreaStats {
    /// Areas in history order, most recent last.
    pub areas: Vec<f64>,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub std: f64,
    /// Coefficient of variation in percent; 0 when the mean is 0.
    pub cv: f64,
}

impl WedgeAreaStats {
    /// Compute statistics for a list of areas. `None` if the list is empty.
    #[must_use]
    pub fn from_areas(areas: Vec<f64>) -> Option<Self> {
        if areas.is_empty() {
            return None;
        }
        let n = areas.len() as f64;
        let mean = areas.iter().sum::<f64>() / n;
        let variance = areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let cv = if mean > 0.0 { std / mean * 100.0 } else { 0.0 };
        Some(Self {
            areas,
            mean,
            std,
            cv,
        })
    }

    /// Number of wedges the statistics cover.
    #[must_use]
    pub fn count(&self) -> usize {
        self.areas.len()
    }

    /// Area of the most recent wedge.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.areas.last().copied()
    }
}

/// Triangle `{focus, p_i, p_{i+1}}` handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WedgePolygon {
    /// Focus, older point, newer point.
    pub vertices: [Vec2; 3],
    /// Triangle area.
    pub area: f64,
    /// `clamp(area / (1.5·mean), 0, 1)`, 0 when the mean is 0.
    pub color_weight: f64,
}

/// Maintains the trajectory history and derives wedge areas from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaWedgeTracker {
    history: TrajectoryHistory,
    num_wedges: usize,
}

impl Default for AreaWedgeTracker {
    fn default() -> Self {
        Self {
            history: TrajectoryHistory::new(DEFAULT_NUM_WEDGES + 1),
            num_wedges: DEFAULT_NUM_WEDGES,
        }
    }
}

impl AreaWedgeTracker {
    /// Create a tracker showing `num_wedges` wedges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWedgeCount` for zero.
    pub fn new(num_wedges: usize) -> KeplerResult<Self> {
        if num_wedges == 0 {
            return Err(KeplerError::InvalidWedgeCount(num_wedges));
        }
        Ok(Self {
            history: TrajectoryHistory::new(num_wedges + 1),
            num_wedges,
        })
    }

    /// Record a new body position.
    pub fn record(&mut self, x: f64, y: f64) {
        self.history.push(Vec2::new(x, y));
    }

    /// Areas of the triangles between consecutive points, most recent last.
    #[must_use]
    pub fn areas(&self) -> Vec<f64> {
        self.history
            .pairs()
            .map(|(p1, p2)| triangle_area(p1, p2))
            .collect()
    }

    /// Statistics over [`AreaWedgeTracker::areas`]; `None` below two points.
    #[must_use]
    pub fn stats(&self) -> Option<WedgeAreaStats> {
        if self.history.len() < 2 {
            return None;
        }
        WedgeAreaStats::from_areas(self.areas())
    }

    /// Area of the newest wedge.
    #[must_use]
    pub fn latest_area(&self) -> Option<f64> {
        self.areas().last().copied()
    }

    /// Wedge polygons with normalized color weights.
    #[must_use]
    pub fn wedges(&self) -> Vec<WedgePolygon> {
        let areas = self.areas();
        if areas.is_empty() {
            return Vec::new();
        }
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;

        self.history
            .pairs()
            .zip(areas)
            .map(|((p1, p2), area)| {
                let color_weight = if mean > 0.0 {
                    (area / (mean * COLOR_SATURATION)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                WedgePolygon {
                    vertices: [Vec2::ORIGIN, p1, p2],
                    area,
                    color_weight,
                }
            })
            .collect()
    }

    /// Drop all recorded points.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub const fn history(&self) -> &TrajectoryHistory {
        &self.history
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.history.capacity()
    }

    #[must_use]
    pub const fn num_wedges(&self) -> usize {
        self.num_wedges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let tracker = AreaWedgeTracker::default();
        assert_eq!(tracker.capacity(), 9);
        assert_eq!(tracker.num_wedges(), 8);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_zero_wedges_rejected() {
        assert!(matches!(
            AreaWedgeTracker::new(0),
            Err(KeplerError::InvalidWedgeCount(0))
        ));
    }

    #[test]
    fn test_fifo_eviction_keeps_latest_in_order() {
        let mut tracker = AreaWedgeTracker::new(3).expect("valid");
        for i in 0..10 {
            tracker.record(f64::from(i), 0.0);
        }
        let xs: Vec<f64> = tracker.history().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(tracker.history().latest(), Some(Vec2::new(9.0, 0.0)));
    }

    #[test]
    fn test_stats_undefined_below_two_points() {
        let mut tracker = AreaWedgeTracker::default();
        assert!(tracker.stats().is_none());
        assert!(tracker.wedges().is_empty());
        tracker.record(1.0, 0.0);
        assert!(tracker.stats().is_none());
        assert!(tracker.areas().is_empty());
        assert!(tracker.latest_area().is_none());
    }

    #[test]
    fn test_triangle_area_shoelace() {
        let area = triangle_area(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((area - 0.5).abs() < f64::EPSILON);
        let reversed = triangle_area(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert!((reversed - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_areas_and_stats() {
        let mut tracker = AreaWedgeTracker::default();
        tracker.record(1.0, 0.0);
        tracker.record(0.0, 1.0); // area 0.5
        tracker.record(-2.0, 0.0); // area 1.0

        assert_eq!(tracker.areas(), vec![0.5, 1.0]);
        let stats = tracker.stats().expect("two wedges");
        assert!((stats.mean - 0.75).abs() < 1e-12);
        assert!((stats.std - 0.25).abs() < 1e-12);
        assert!((stats.cv - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.latest(), Some(1.0));
        assert_eq!(tracker.latest_area(), Some(1.0));
    }

    #[test]
    fn test_zero_mean_gives_zero_cv() {
        let mut tracker = AreaWedgeTracker::default();
        tracker.record(1.0, 0.0);
        tracker.record(2.0, 0.0);
        let stats = tracker.stats().expect("one wedge");
        assert!(stats.mean.abs() < f64::EPSILON);
        assert!(stats.cv.abs() < f64::EPSILON);
        assert!(tracker.wedges()[0].color_weight.abs() < f64::EPSILON);
    }

    #[test]
    fn test_wedge_polygons() {
        let mut tracker = AreaWedgeTracker::default();
        tracker.record(1.0, 0.0);
        tracker.record(0.0, 1.0);
        tracker.record(-4.0, 0.0);

        let wedges = tracker.wedges();
        assert_eq!(wedges.len(), 2);
        assert_eq!(wedges[0].vertices[0], Vec2::ORIGIN);
        assert_eq!(wedges[0].vertices[1], Vec2::new(1.0, 0.0));
        assert_eq!(wedges[1].vertices[2], Vec2::new(-4.0, 0.0));
        // mean = 1.25, saturation at 1.875
        assert!((wedges[0].color_weight - 0.5 / 1.875).abs() < 1e-12);
        assert!((wedges[1].color_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear() {
        let mut tracker = AreaWedgeTracker::default();
        tracker.record(1.0, 0.0);
        tracker.record(0.0, 1.0);
        tracker.clear();
        assert_eq!(tracker.len(), 0);
        assert!(tracker.stats().is_none());
    }

    #[test]
    fn test_stats_from_empty_areas() {
        assert!(WedgeAreaStats::from_areas(Vec::new()).is_none());
    }
}
