//! Common utilities and types for the Prometheus simulator
pub mod angles;

/// Common types used across the codebase
pub mod types {
    use nalgebra::{Point2, Vector2};
    use serde::{Deserialize, Serialize};

    /// A 2D point in the world frame (meters)
    pub type Point2D = Point2<f64>;

    /// A 2D pose (x, y, theta)
    ///
    /// `theta` is the accumulated heading in radians and is never wrapped.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Pose2D {
        pub x: f64,
        pub y: f64,
        pub theta: f64,
    }

    impl Pose2D {
        /// Create a new pose
        pub fn new(x: f64, y: f64, theta: f64) -> Self {
            Pose2D { x, y, theta }
        }

        /// Pose at the origin facing along +x
        pub fn origin() -> Self {
            Pose2D::new(0.0, 0.0, 0.0)
        }

        /// Position part of the pose
        pub fn position(&self) -> Point2D {
            Point2D::new(self.x, self.y)
        }

        /// Unit vector pointing along the heading
        pub fn heading_vector(&self) -> Vector2<f64> {
            Vector2::new(self.theta.cos(), self.theta.sin())
        }
    }

    impl Default for Pose2D {
        fn default() -> Self {
            Pose2D::origin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heading_vector_is_unit_length() {
        let pose = Pose2D::new(1.0, -2.0, 7.5);
        assert_relative_eq!(pose.heading_vector().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_position_drops_heading() {
        let pose = Pose2D::new(1.5, -0.5, 3.0);
        assert_eq!(pose.position(), Point2D::new(1.5, -0.5));
    }
}
