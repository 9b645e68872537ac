//! Trajectory recording module

use crate::common::types::Point2D;
use serde::{Deserialize, Serialize};

/// Chronological sequence of positions visited by the robot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Point2D>,
}

impl Trajectory {
    /// Create a trajectory starting at `start`
    pub fn starting_at(start: Point2D) -> Self {
        Trajectory { points: vec![start] }
    }

    /// Create an empty trajectory with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Trajectory {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample
    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point2D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2D> {
        self.points.iter()
    }

    /// X coordinates in order, as plotted by front-ends
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// Y coordinates in order
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Total path length travelled
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| nalgebra::distance(&w[0], &w[1]))
            .sum()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
