// src/curve_detector.rs - Greedy multi-pass circle extraction over a single contour

use log::{debug, trace};
use rand::Rng;

use crate::angular_span::{angular_span, AngularSpan};
use crate::circle_fit::{circle_from_points, is_collinear};
use crate::errors::{CurveDetectorError, Result};
use crate::geometry::{Circle, Point};
use crate::sampling::{Rejection, RejectionStats, SamplingPool};

/// Parameters for one curve detection call
#[derive(Debug, Clone, PartialEq)]
pub struct CurveParams {
    /// Trials per pass, also the number of sampling attempts per trial
    pub num_iterations: usize,
    /// Minimum support count for a circle to be accepted
    pub min_points: usize,
    /// Support tolerance as a fraction of the fitted radius
    pub max_error_ratio_to_radius: f64,
    /// Index window for companion sampling and support walks
    pub cluster_epsilon: usize,
    /// Minimum covered arc, radians
    pub min_angle: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            num_iterations: 200_000,
            min_points: 200,
            max_error_ratio_to_radius: 0.02,
            cluster_epsilon: 30,
            min_angle: 90f64.to_radians(),
            min_radius: 80.0,
            max_radius: 400.0,
        }
    }
}

/// A scored candidate from one trial, before its support is claimed
struct CircleTrial {
    center: Point,
    radius: f64,
    span: AngularSpan,
    support: Vec<usize>,
}

impl CircleTrial {
    fn into_circle(self, contour: &[Point]) -> Circle {
        let mut circle = Circle::new(self.center, self.radius);
        circle.set_angular_span(self.span);
        circle.points = self.support.iter().map(|&i| contour[i]).collect();
        circle.indices = self.support;
        circle
    }
}

/// Check that a contour is long enough for a detection run
pub fn check_contour_length(points: usize, min_points: usize) -> Result<()> {
    let required = min_points.max(3);
    if points < required {
        return Err(CurveDetectorError::InsufficientData {
            points,
            min_points: required,
        });
    }
    Ok(())
}

/// Extract circles from a closed contour.
///
/// Each pass draws `num_iterations` trials, keeps the one with the most support
/// points (first found wins ties) and, if it reaches `min_points`, claims its
/// support and records it. Passes repeat until no trial qualifies. Circles are
/// returned in discovery order and never share support points.
///
/// # Arguments
/// * `contour` - Ordered, cyclic boundary points
/// * `params` - Detection parameters
/// * `rng` - Random source for sampling; pass a seeded generator for reproducible runs
pub fn detect_curves<R: Rng + ?Sized>(
    contour: &[Point],
    params: &CurveParams,
    rng: &mut R,
) -> Vec<Circle> {
    if let Err(e) = check_contour_length(contour.len(), params.min_points) {
        debug!("Skipping curve detection: {}", e);
        return Vec::new();
    }

    let mut pool = SamplingPool::new(contour.len());
    let mut circles = Vec::new();

    while !pool.is_exhausted() {
        let mut best: Option<CircleTrial> = None;
        let mut stats = RejectionStats::default();

        for _ in 0..params.num_iterations {
            match run_trial(contour, &pool, params, rng) {
                Ok(trial) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| trial.support.len() > b.support.len());
                    if better {
                        best = Some(trial);
                    }
                }
                Err(rejection) => stats.record(rejection),
            }
        }

        trace!(
            "Curve pass {}: {} unused points, rejections: {}",
            circles.len(),
            pool.unused_count(),
            stats
        );

        let best = match best {
            Some(trial) if trial.support.len() >= params.min_points => trial,
            _ => break,
        };

        pool.claim(&best.support);
        let circle = best.into_circle(contour);
        debug!(
            "Circle {}: center=({:.2}, {:.2}) radius={:.2} angle={:.1}deg points={}",
            circles.len(),
            circle.center.x,
            circle.center.y,
            circle.radius,
            circle.angle_range.to_degrees(),
            circle.points.len()
        );
        circles.push(circle);
    }

    circles
}

fn run_trial<R: Rng + ?Sized>(
    contour: &[Point],
    pool: &SamplingPool,
    params: &CurveParams,
    rng: &mut R,
) -> std::result::Result<CircleTrial, Rejection> {
    let (seed, [second, third]) = pool
        .sample::<_, 2>(rng, params.cluster_epsilon, params.num_iterations)
        .ok_or(Rejection::NoQualifyingSample)?;

    let (p1, p2, p3) = (contour[seed], contour[second], contour[third]);
    if is_collinear(p1, p2, p3) {
        return Err(Rejection::Degenerate);
    }

    let circle = circle_from_points(p1, p2, p3).map_err(|_| Rejection::Degenerate)?;
    if circle.radius < params.min_radius || circle.radius > params.max_radius {
        return Err(Rejection::RadiusOutOfRange);
    }

    let tolerance = circle.radius * params.max_error_ratio_to_radius;
    let support = pool.walk_support(seed, params.cluster_epsilon, |i| {
        circle.distance(contour[i]) < tolerance
    });

    let angles: Vec<f64> = support.iter().map(|&i| circle.angle_of(contour[i])).collect();
    let span = angular_span(&angles).ok_or(Rejection::NarrowSpan)?;
    if span.angle_range < params.min_angle {
        return Err(Rejection::NarrowSpan);
    }

    Ok(CircleTrial {
        center: circle.center,
        radius: circle.radius,
        span,
        support,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::f64::consts::TAU;

    fn circle_contour(center: Point, radius: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f64 * TAU / n as f64;
                center + Point::from_angle(t) * radius
            })
            .collect()
    }

    fn test_params() -> CurveParams {
        CurveParams {
            num_iterations: 300,
            min_points: 20,
            max_error_ratio_to_radius: 0.02,
            cluster_epsilon: 10,
            min_angle: 60f64.to_radians(),
            min_radius: 10.0,
            max_radius: 500.0,
        }
    }

    #[test]
    fn short_contour_is_insufficient() {
        assert!(matches!(
            check_contour_length(19, 20),
            Err(CurveDetectorError::InsufficientData { points: 19, min_points: 20 })
        ));
        assert!(check_contour_length(2, 0).is_err());
        assert!(check_contour_length(20, 20).is_ok());
    }

    #[test]
    fn contour_one_short_of_min_points_yields_nothing() {
        let params = test_params();
        let contour = circle_contour(Point::new(0.0, 0.0), 40.0, params.min_points - 1);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(detect_curves(&contour, &params, &mut rng).is_empty());
    }

    #[test]
    fn exact_circle_is_recovered_and_fully_claimed() {
        let contour = circle_contour(Point::new(50.0, -20.0), 30.0, 120);
        let mut rng = StdRng::seed_from_u64(42);
        let circles = detect_curves(&contour, &test_params(), &mut rng);

        assert_eq!(circles.len(), 1);
        let circle = &circles[0];
        assert_approx_eq!(circle.center.x, 50.0, 1e-6);
        assert_approx_eq!(circle.center.y, -20.0, 1e-6);
        assert_approx_eq!(circle.radius, 30.0, 1e-6);
        // One direction takes n/2 steps, the other n/2 - 1
        assert_eq!(circle.points.len(), 119);
        assert_eq!(circle.points.len(), circle.indices.len());
        assert!(circle.angle_range > 350f64.to_radians());
    }

    #[test]
    fn radius_bounds_exclude_circle() {
        let contour = circle_contour(Point::new(0.0, 0.0), 30.0, 120);
        let params = CurveParams {
            min_radius: 40.0,
            ..test_params()
        };
        let mut rng = StdRng::seed_from_u64(5);
        assert!(detect_curves(&contour, &params, &mut rng).is_empty());
    }

    #[test]
    fn straight_contour_has_no_circles() {
        // Thin rectangle: sampled triples are collinear or fit huge radii
        let mut contour: Vec<Point> = (0..100).map(|i| Point::new(i as f64, 0.0)).collect();
        contour.extend((0..100).rev().map(|i| Point::new(i as f64, 1.0)));
        let params = CurveParams {
            max_radius: 60.0,
            min_angle: 90f64.to_radians(),
            ..test_params()
        };
        let mut rng = StdRng::seed_from_u64(9);
        assert!(detect_curves(&contour, &params, &mut rng).is_empty());
    }

    #[test]
    fn two_arcs_do_not_share_support() {
        // S-shaped contour: two half circles meeting at the origin
        let mut contour = Vec::new();
        for i in 0..90 {
            let t = std::f64::consts::PI * (1.0 - i as f64 / 90.0);
            contour.push(Point::new(40.0, 0.0) + Point::from_angle(t) * 40.0);
        }
        for i in 0..90 {
            let t = -std::f64::consts::PI * i as f64 / 90.0;
            contour.push(Point::new(-40.0, 0.0) + Point::from_angle(t) * 40.0);
        }
        let mut rng = StdRng::seed_from_u64(17);
        let circles = detect_curves(&contour, &test_params(), &mut rng);

        assert!(!circles.is_empty());
        let mut seen = HashSet::new();
        for circle in &circles {
            for &index in &circle.indices {
                assert!(seen.insert(index), "index {} claimed twice", index);
            }
        }
    }
}
