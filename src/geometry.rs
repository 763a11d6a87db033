// src/geometry.rs - Point arithmetic and the circle/line primitives

use serde::Serialize;
use std::f64::consts::PI;
use std::ops::{Add, Div, Mul, Sub};

use crate::angular_span::AngularSpan;

/// 2-D point (or vector) in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians)
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product
    #[inline]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).norm()
    }

    /// Direction angle of this vector in (-π, π]
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Normalizes an undirected orientation into [0, π)
#[inline]
pub fn normalize_orientation(angle: f64) -> f64 {
    let norm = angle.rem_euclid(PI);
    if norm >= PI - 1e-12 {
        0.0
    } else {
        norm
    }
}

/// Smallest difference between two undirected orientations, in [0, π/2]
#[inline]
pub fn orientation_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(PI);
    diff.min(PI - diff)
}

/// A circle fitted to a contour, together with the contour points it explains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    /// Support points in the order they were claimed
    pub points: Vec<Point>,
    /// Contour indices of `points`
    pub indices: Vec<usize>,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Extent of the largest contiguous arc covered by the support points
    pub angle_range: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            points: Vec::new(),
            indices: Vec::new(),
            start_angle: 0.0,
            end_angle: 0.0,
            angle_range: 0.0,
        }
    }

    /// Absolute radial distance of `p` from the circle boundary
    #[inline]
    pub fn distance(&self, p: Point) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }

    /// Angle of `p` around the center, in (-π, π]
    #[inline]
    pub fn angle_of(&self, p: Point) -> f64 {
        (p - self.center).angle()
    }

    pub fn set_angular_span(&mut self, span: AngularSpan) {
        self.start_angle = span.start_angle;
        self.end_angle = span.end_angle;
        self.angle_range = span.angle_range;
    }

    /// Length of the covered arc
    pub fn arc_length(&self) -> f64 {
        self.radius * self.angle_range
    }
}

/// A straight segment: anchor point, unit direction and the projected extent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub point: Point,
    pub dir: Point,
    pub points: Vec<Point>,
    pub indices: Vec<usize>,
    pub start_pos: f64,
    pub end_pos: f64,
}

impl Line {
    /// `dir` is expected to be a unit vector
    pub fn new(point: Point, dir: Point) -> Self {
        Self {
            point,
            dir,
            points: Vec::new(),
            indices: Vec::new(),
            start_pos: 0.0,
            end_pos: 0.0,
        }
    }

    /// Perpendicular distance of `p` from the infinite line
    #[inline]
    pub fn distance(&self, p: Point) -> f64 {
        (p - self.point).cross(self.dir).abs()
    }

    /// Signed position of `p` along the direction, relative to the anchor
    #[inline]
    pub fn projection(&self, p: Point) -> f64 {
        (p - self.point).dot(self.dir)
    }

    pub fn start_point(&self) -> Point {
        self.point + self.dir * self.start_pos
    }

    pub fn end_point(&self) -> Point {
        self.point + self.dir * self.end_pos
    }

    pub fn length(&self) -> f64 {
        self.end_pos - self.start_pos
    }

    /// Undirected orientation in [0, π)
    pub fn orientation(&self) -> f64 {
        normalize_orientation(self.dir.angle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_approx_eq!(a.distance(b), 5.0);
        assert_approx_eq!(Point::new(1.0, 0.0).cross(Point::new(0.0, 1.0)), 1.0);
        assert_approx_eq!(a.dot(b), 16.0);
    }

    #[test]
    fn orientation_wraps_mod_pi() {
        assert_approx_eq!(normalize_orientation(-FRAC_PI_2), FRAC_PI_2);
        assert_approx_eq!(normalize_orientation(PI), 0.0);
        assert_approx_eq!(orientation_difference(0.05, PI - 0.05), 0.1);
        assert_approx_eq!(orientation_difference(0.0, FRAC_PI_2), FRAC_PI_2);
    }

    #[test]
    fn line_distance_and_extent() {
        let mut line = Line::new(Point::new(10.0, 10.0), Point::new(1.0, 0.0));
        assert_approx_eq!(line.distance(Point::new(3.0, 12.5)), 2.5);
        assert_approx_eq!(line.projection(Point::new(3.0, 12.5)), -7.0);
        line.start_pos = -5.0;
        line.end_pos = 15.0;
        assert_approx_eq!(line.length(), 20.0);
        assert_eq!(line.start_point(), Point::new(5.0, 10.0));
        assert_eq!(line.end_point(), Point::new(25.0, 10.0));
    }

    #[test]
    fn circle_distance_is_radial() {
        let circle = Circle::new(Point::new(0.0, 0.0), 10.0);
        assert_approx_eq!(circle.distance(Point::new(12.0, 0.0)), 2.0);
        assert_approx_eq!(circle.distance(Point::new(0.0, -7.0)), 3.0);
        assert_approx_eq!(circle.angle_of(Point::new(0.0, 5.0)), FRAC_PI_2);
    }
}
