// src/line_detector.rs - Greedy multi-pass line segment extraction over a single contour

use log::{debug, trace};
use rand::Rng;

use crate::curve_detector::check_contour_length;
use crate::geometry::{orientation_difference, Line, Point};
use crate::sampling::{Rejection, RejectionStats, SamplingPool};

/// Two sampled points closer than this do not define a direction
const MIN_SAMPLE_SEPARATION: f64 = 1e-9;

/// Parameters for one line detection call
#[derive(Debug, Clone, PartialEq)]
pub struct LineParams {
    /// Trials per pass, also the number of sampling attempts per trial
    pub num_iterations: usize,
    /// Minimum support count for a segment to be accepted
    pub min_points: usize,
    /// Absolute perpendicular-distance tolerance
    pub max_error: f64,
    /// Index window for companion sampling and support walks
    pub cluster_epsilon: usize,
    /// Minimum projected segment length
    pub min_length: f64,
    /// Largest deviation from a candidate orientation a sampled direction may have, radians
    pub orientation_tolerance: f64,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            num_iterations: 20_000,
            min_points: 30,
            max_error: 2.0,
            cluster_epsilon: 10,
            min_length: 30.0,
            orientation_tolerance: 10f64.to_radians(),
        }
    }
}

struct LineTrial {
    line: Line,
    support: Vec<usize>,
}

impl LineTrial {
    fn into_line(self, contour: &[Point]) -> Line {
        let mut line = self.line;
        line.points = self.support.iter().map(|&i| contour[i]).collect();
        line.indices = self.support;
        line
    }
}

/// Closest candidate orientation to `angle` and its undirected difference
pub fn closest_orientation(angle: f64, orientations: &[f64]) -> Option<(f64, f64)> {
    orientations
        .iter()
        .map(|&o| (o, orientation_difference(angle, o)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Extract straight segments from a closed contour.
///
/// When `orientations` is non-empty every sampled direction is snapped to the
/// nearest candidate, and trials further than `orientation_tolerance` from all
/// candidates are discarded. An empty slice leaves directions unconstrained.
/// Segments are returned in discovery order and never share support points.
pub fn detect_lines<R: Rng + ?Sized>(
    contour: &[Point],
    params: &LineParams,
    orientations: &[f64],
    rng: &mut R,
) -> Vec<Line> {
    if let Err(e) = check_contour_length(contour.len(), params.min_points) {
        debug!("Skipping line detection: {}", e);
        return Vec::new();
    }

    let mut pool = SamplingPool::new(contour.len());
    let mut lines = Vec::new();

    while !pool.is_exhausted() {
        let mut best: Option<LineTrial> = None;
        let mut stats = RejectionStats::default();

        for _ in 0..params.num_iterations {
            match run_trial(contour, &pool, params, orientations, rng) {
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
            "Line pass {}: {} unused points, rejections: {}",
            lines.len(),
            pool.unused_count(),
            stats
        );

        let best = match best {
            Some(trial) if trial.support.len() >= params.min_points => trial,
            _ => break,
        };

        pool.claim(&best.support);
        let line = best.into_line(contour);
        debug!(
            "Line {}: orientation={:.1}deg length={:.1} points={}",
            lines.len(),
            line.orientation().to_degrees(),
            line.length(),
            line.points.len()
        );
        lines.push(line);
    }

    lines
}

fn run_trial<R: Rng + ?Sized>(
    contour: &[Point],
    pool: &SamplingPool,
    params: &LineParams,
    orientations: &[f64],
    rng: &mut R,
) -> std::result::Result<LineTrial, Rejection> {
    let (seed, [companion]) = pool
        .sample::<_, 1>(rng, params.cluster_epsilon, params.num_iterations)
        .ok_or(Rejection::NoQualifyingSample)?;

    let anchor = contour[seed];
    let delta = contour[companion] - anchor;
    let separation = delta.norm();
    if separation < MIN_SAMPLE_SEPARATION {
        return Err(Rejection::Degenerate);
    }

    let dir = match closest_orientation(delta.angle(), orientations) {
        Some((_, diff)) if diff > params.orientation_tolerance => {
            return Err(Rejection::OrientationMismatch)
        }
        Some((orientation, _)) => Point::from_angle(orientation),
        None => delta / separation,
    };

    let mut line = Line::new(anchor, dir);
    let support = pool.walk_support(seed, params.cluster_epsilon, |i| {
        line.distance(contour[i]) <= params.max_error
    });

    let (start_pos, end_pos) = support
        .iter()
        .map(|&i| line.projection(contour[i]))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        });
    if support.is_empty() || end_pos - start_pos < params.min_length {
        return Err(Rejection::TooShort);
    }

    line.start_pos = start_pos;
    line.end_pos = end_pos;
    Ok(LineTrial { line, support })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;

    fn segment_contour(from: Point, to: Point, steps: usize) -> Vec<Point> {
        (0..steps)
            .map(|i| from + (to - from) * (i as f64 / steps as f64))
            .collect()
    }

    fn test_params() -> LineParams {
        LineParams {
            num_iterations: 200,
            min_points: 20,
            max_error: 0.5,
            cluster_epsilon: 6,
            min_length: 20.0,
            orientation_tolerance: 5f64.to_radians(),
        }
    }

    #[test]
    fn closest_orientation_is_undirected() {
        let candidates = [0.0, FRAC_PI_2];
        let (best, diff) = closest_orientation(-0.1, &candidates).unwrap();
        assert_eq!(best, 0.0);
        assert_approx_eq!(diff, 0.1);
        let (best, _) = closest_orientation(-FRAC_PI_2 + 0.05, &candidates).unwrap();
        assert_eq!(best, FRAC_PI_2);
        assert!(closest_orientation(0.3, &[]).is_none());
    }

    #[test]
    fn triangle_sides_are_recovered_without_constraints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(120.0, 0.0);
        let c = Point::new(60.0, 90.0);
        let mut contour = segment_contour(a, b, 120);
        contour.extend(segment_contour(b, c, 108));
        contour.extend(segment_contour(c, a, 108));

        let mut rng = StdRng::seed_from_u64(21);
        let lines = detect_lines(&contour, &test_params(), &[], &mut rng);

        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.length() > 90.0, "segment too short: {}", line.length());
            assert_approx_eq!(line.dir.norm(), 1.0);
        }
    }

    #[test]
    fn mismatched_orientations_reject_everything() {
        // Horizontal segment loop, candidates only near 45 degrees
        let mut contour = segment_contour(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 100);
        contour.extend(segment_contour(Point::new(100.0, 0.0), Point::new(0.0, 0.0), 100));
        let candidates = [45f64.to_radians()];
        let mut rng = StdRng::seed_from_u64(2);
        assert!(detect_lines(&contour, &test_params(), &candidates, &mut rng).is_empty());
    }

    #[test]
    fn snapped_direction_matches_candidate() {
        let mut contour = segment_contour(Point::new(0.0, 0.0), Point::new(100.0, 2.0), 100);
        contour.extend(segment_contour(Point::new(100.0, 2.0), Point::new(100.0, 60.0), 58));
        contour.extend(segment_contour(Point::new(100.0, 60.0), Point::new(0.0, 0.0), 117));
        let candidates = [0.0];
        let params = LineParams {
            max_error: 1.5,
            ..test_params()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let lines = detect_lines(&contour, &params, &candidates, &mut rng);

        assert!(!lines.is_empty());
        for line in &lines {
            assert_approx_eq!(line.orientation(), 0.0);
        }
    }

    #[test]
    fn too_few_points_gives_no_lines() {
        let params = test_params();
        let contour = segment_contour(Point::new(0.0, 0.0), Point::new(50.0, 0.0), params.min_points - 1);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(detect_lines(&contour, &params, &[], &mut rng).is_empty());
    }
}
