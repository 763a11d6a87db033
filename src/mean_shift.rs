// src/mean_shift.rs - 1-D mode seeking with a Gaussian kernel

use std::f64::consts::PI;

use crate::geometry::normalize_orientation;

/// Find the modes of a set of scalar values by mean shift.
///
/// Every value is shifted towards the kernel-weighted mean of all values until
/// it moves less than `tolerance` or `max_iterations` is reached. Converged
/// points within `merge_tolerance` of an existing mode are folded into it
/// (running mean). Modes are returned sorted ascending.
///
/// # Arguments
/// * `values` - Input samples, in any order
/// * `bandwidth` - Gaussian kernel standard deviation
/// * `tolerance` - Shift magnitude below which a point counts as converged
/// * `max_iterations` - Upper bound on shifts per point
/// * `merge_tolerance` - Distance under which two converged points share a mode
pub fn cluster(
    values: &[f64],
    bandwidth: f64,
    tolerance: f64,
    max_iterations: usize,
    merge_tolerance: f64,
) -> Vec<f64> {
    let bandwidth = bandwidth.max(f64::EPSILON);
    let mut modes: Vec<(f64, usize)> = Vec::new();

    for &start in values.iter().filter(|v| v.is_finite()) {
        let mut x = start;
        for _ in 0..max_iterations {
            let shifted = shift(x, values, bandwidth);
            let moved = (shifted - x).abs();
            x = shifted;
            if moved < tolerance {
                break;
            }
        }

        match modes.iter_mut().find(|(m, _)| (*m - x).abs() <= merge_tolerance) {
            Some((m, count)) => {
                *count += 1;
                *m += (x - *m) / *count as f64;
            }
            None => modes.push((x, 1)),
        }
    }

    let mut result: Vec<f64> = modes.into_iter().map(|(m, _)| m).collect();
    result.sort_by(|a, b| a.total_cmp(b));
    result
}

/// Mean shift over undirected orientations, which wrap at π.
///
/// The half-turn circle is cut inside its widest gap and values below the cut
/// are lifted by π, so orientations on either side of 0/π land in one mode.
/// Modes are normalized back into [0, π) and returned sorted ascending.
pub fn cluster_orientations(
    orientations: &[f64],
    bandwidth: f64,
    tolerance: f64,
    max_iterations: usize,
    merge_tolerance: f64,
) -> Vec<f64> {
    let mut sorted: Vec<f64> = orientations
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| normalize_orientation(v))
        .collect();
    if sorted.is_empty() {
        return Vec::new();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    // Upper end of the widest gap, starting from the wraparound gap
    let mut widest = sorted[0] + PI - sorted[sorted.len() - 1];
    let mut cut = sorted[0];
    for pair in sorted.windows(2) {
        if pair[1] - pair[0] > widest {
            widest = pair[1] - pair[0];
            cut = pair[1];
        }
    }

    let unwrapped: Vec<f64> = sorted
        .iter()
        .map(|&v| if v < cut { v + PI } else { v })
        .collect();

    let mut modes: Vec<f64> = cluster(&unwrapped, bandwidth, tolerance, max_iterations, merge_tolerance)
        .into_iter()
        .map(normalize_orientation)
        .collect();
    modes.sort_by(|a, b| a.total_cmp(b));
    modes
}

fn shift(x: f64, values: &[f64], bandwidth: f64) -> f64 {
    let (mut weighted, mut total) = (0.0f64, 0.0f64);
    for &v in values.iter().filter(|v| v.is_finite()) {
        let d = (x - v) / bandwidth;
        let w = (-0.5 * d * d).exp();
        weighted += w * v;
        total += w;
    }
    if total > 0.0 {
        weighted / total
    } else {
        x
    }
}
