// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box and query region utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(&point);
        }
        bbox
    }

    /// Box from the native layout `[min_x, min_y, min_z, max_x, max_y, max_z]`
    pub fn from_array(bounds: [f64; 6]) -> Self {
        Self::new(
            Point3::new(bounds[0], bounds[1], bounds[2]),
            Point3::new(bounds[3], bounds[4], bounds[5]),
        )
    }

    /// Native layout `[min_x, min_y, min_z, max_x, max_y, max_z]`
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Closed-interval overlap test
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.intersects(&BoundingBox::new(*point, *point))
    }

    /// Euclidean distance from a point to the box, zero inside
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        // max/min instead of clamp: empty or NaN bounds must not panic
        let clamped = Point3::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
            point.z.max(self.min.z).min(self.max.z),
        );
        (point - clamped).norm()
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - other.min).amax() < tolerance && (self.max - other.max).amax() < tolerance
    }
}

/// Region used by the spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingRegion {
    Box(BoundingBox),
    Sphere { center: Point3<f64>, radius: f64 },
}

impl BoundingRegion {
    pub fn sphere(center: Point3<f64>, radius: f64) -> Self {
        Self::Sphere { center, radius }
    }
}

impl From<BoundingBox> for BoundingRegion {
    fn from(bbox: BoundingBox) -> Self {
        Self::Box(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        assert!(bbox.is_empty());
        bbox.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        bbox.expand_to_include(&Point3::new(-1.0, -2.0, -3.0));

        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_array_layout() {
        let bbox = BoundingBox::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        assert_eq!(bbox.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(BoundingBox::from_array(bbox.to_array()), bbox);
    }

    #[test]
    fn test_distance_and_intersection() {
        let unit = BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(unit.distance_to(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert!((unit.distance_to(&Point3::new(3.0, 0.5, 0.5)) - 2.0).abs() < 1e-12);

        let touching = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let apart = BoundingBox::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert!(unit.intersects(&touching));
        assert!(!unit.intersects(&apart));
    }

    #[test]
    fn test_distance_to_degenerate_boxes() {
        let point = Point3::new(0.5, 0.5, 0.5);
        assert_eq!(BoundingBox::empty().distance_to(&point), f64::INFINITY);

        let nan_axis = BoundingBox::new(Point3::new(f64::NAN, 0.0, 0.0), Point3::new(f64::NAN, 1.0, 1.0));
        assert_eq!(nan_axis.distance_to(&point), 0.0);
    }
}
