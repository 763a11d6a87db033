// src/orientation.rs - Dominant boundary direction of a set of contours

use std::f64::consts::PI;

use crate::geometry::{normalize_orientation, Point};

/// Offsets (degrees) added to the principal orientation to form line candidates
pub const DEFAULT_ORIENTATION_OFFSETS_DEG: [f64; 5] = [0.0, 90.0, 60.0, 45.0, 30.0];

/// Length-weighted edge-direction histogram over [0, π)
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationEstimator {
    /// Histogram resolution over [0, π)
    pub num_bins: usize,
    /// Index distance between the two endpoints of each boundary edge
    pub stride: usize,
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self {
            num_bins: 180,
            stride: 5,
        }
    }
}

impl OrientationEstimator {
    pub fn new(num_bins: usize, stride: usize) -> Self {
        Self {
            num_bins: num_bins.max(1),
            stride: stride.max(1),
        }
    }

    /// Principal orientation in [0, π) of the supplied contours.
    ///
    /// Edges join points `stride` apart along each contour, so pixel staircase
    /// steps average out. Their angles (mod π) are accumulated with length
    /// weights, the histogram is smoothed circularly, and the peak bin is refined
    /// by the weighted doubled-angle mean of the edges in it and its neighbours.
    /// Returns 0 when no usable edge exists.
    pub fn estimate<'a, I>(&self, contours: I) -> f64
    where
        I: IntoIterator<Item = &'a [Point]>,
    {
        let bins = self.num_bins.max(1);
        let bin_width = PI / bins as f64;
        let mut histogram = vec![0.0f64; bins];
        let mut edges: Vec<(f64, f64, usize)> = Vec::new();

        for contour in contours {
            let n = contour.len();
            if n < 2 {
                continue;
            }
            let step = self.stride.clamp(1, n - 1);
            for i in 0..n {
                let delta = contour[(i + step) % n] - contour[i];
                let weight = delta.norm();
                if weight <= f64::EPSILON {
                    continue;
                }
                let theta = normalize_orientation(delta.angle());
                let bin = ((theta / bin_width) as usize).min(bins - 1);
                histogram[bin] += weight;
                edges.push((theta, weight, bin));
            }
        }

        if edges.is_empty() {
            return 0.0;
        }

        let smoothed = smooth_circular(&histogram);
        let peak = smoothed
            .iter()
            .enumerate()
            .fold(0usize, |best, (i, &v)| if v > smoothed[best] { i } else { best });

        // Doubled angles make θ and θ + π coincide on the unit circle
        let (mut sin_sum, mut cos_sum) = (0.0f64, 0.0f64);
        for &(theta, weight, bin) in &edges {
            if circular_bin_distance(bin, peak, bins) <= 1 {
                sin_sum += weight * (2.0 * theta).sin();
                cos_sum += weight * (2.0 * theta).cos();
            }
        }

        if sin_sum.abs() <= f64::EPSILON && cos_sum.abs() <= f64::EPSILON {
            return (peak as f64 + 0.5) * bin_width;
        }
        normalize_orientation(sin_sum.atan2(cos_sum) / 2.0)
    }
}

/// Principal orientation with the default estimator
pub fn estimate_orientation<'a, I>(contours: I) -> f64
where
    I: IntoIterator<Item = &'a [Point]>,
{
    OrientationEstimator::default().estimate(contours)
}

/// Candidate line orientations: `principal` plus each offset (degrees), in [0, π)
pub fn candidate_orientations(principal: f64, offsets_deg: &[f64]) -> Vec<f64> {
    offsets_deg
        .iter()
        .map(|offset| normalize_orientation(principal + offset.to_radians()))
        .collect()
}

/// [1, 2, 1] / 4 smoothing with wraparound
fn smooth_circular(histogram: &[f64]) -> Vec<f64> {
    let n = histogram.len();
    (0..n)
        .map(|i| {
            let prev = histogram[(i + n - 1) % n];
            let next = histogram[(i + 1) % n];
            (prev + 2.0 * histogram[i] + next) / 4.0
        })
        .collect()
}

#[inline]
fn circular_bin_distance(a: usize, b: usize, bins: usize) -> usize {
    let d = if a > b { a - b } else { b - a };
    d.min(bins - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::orientation_difference;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    fn square_contour(origin: Point, side: usize, rotation: f64) -> Vec<Point> {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(side as f64, 0.0),
            Point::new(side as f64, side as f64),
            Point::new(0.0, side as f64),
        ];
        let (s, c) = rotation.sin_cos();
        let mut points = Vec::with_capacity(side * 4);
        for k in 0..4 {
            let from = corners[k];
            let to = corners[(k + 1) % 4];
            for i in 0..side {
                let p = from + (to - from) * (i as f64 / side as f64);
                points.push(origin + Point::new(c * p.x - s * p.y, s * p.x + c * p.y));
            }
        }
        points
    }

    #[test]
    fn axis_aligned_square_is_zero_or_right_angle() {
        let square = square_contour(Point::new(50.0, 50.0), 100, 0.0);
        let angle = estimate_orientation([square.as_slice()]);
        assert!((0.0..PI).contains(&angle));
        let near_zero = orientation_difference(angle, 0.0) < 1e-3;
        let near_right = orientation_difference(angle, FRAC_PI_2) < 1e-3;
        assert!(near_zero || near_right, "unexpected orientation {}", angle);
    }

    #[test]
    fn rotated_square_follows_rotation() {
        let rotation = 20f64.to_radians();
        let square = square_contour(Point::new(200.0, 100.0), 100, rotation);
        let angle = estimate_orientation([square.as_slice()]);
        let diff = orientation_difference(angle, rotation)
            .min(orientation_difference(angle, rotation + FRAC_PI_2));
        assert!(diff < 0.5f64.to_radians(), "unexpected orientation {}", angle.to_degrees());
    }

    #[test]
    fn aggregates_over_several_contours() {
        let a = square_contour(Point::new(0.0, 0.0), 60, 10f64.to_radians());
        let b = square_contour(Point::new(300.0, 0.0), 80, 10f64.to_radians());
        let angle = estimate_orientation([a.as_slice(), b.as_slice()]);
        let diff = orientation_difference(angle, 10f64.to_radians())
            .min(orientation_difference(angle, 100f64.to_radians()));
        assert!(diff < 0.5f64.to_radians());
    }

    #[test]
    fn is_deterministic() {
        let square = square_contour(Point::new(5.0, 5.0), 40, 0.3);
        let first = estimate_orientation([square.as_slice()]);
        let second = estimate_orientation([square.as_slice()]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_defaults_to_zero() {
        let empty: Vec<&[Point]> = Vec::new();
        assert_eq!(estimate_orientation(empty), 0.0);
        let single = [Point::new(1.0, 1.0)];
        assert_eq!(estimate_orientation([&single[..]]), 0.0);
    }

    #[test]
    fn candidates_add_offsets_mod_pi() {
        let candidates = candidate_orientations(FRAC_PI_2, &DEFAULT_ORIENTATION_OFFSETS_DEG);
        assert_eq!(candidates.len(), 5);
        assert_approx_eq!(candidates[0], FRAC_PI_2);
        assert_approx_eq!(candidates[1], 0.0);
        assert_approx_eq!(candidates[2], 150f64.to_radians());
        assert_approx_eq!(candidates[3], 135f64.to_radians());
        assert_approx_eq!(candidates[4], 120f64.to_radians());
    }
}
