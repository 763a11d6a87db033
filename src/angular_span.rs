use std::f64::consts::TAU;

/// Largest contiguous arc covered by a set of angles around a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularSpan {
    /// First covered angle after the largest gap
    pub start_angle: f64,
    /// Last covered angle before the largest gap
    pub end_angle: f64,
    /// Covered extent, 2π minus the largest gap
    pub angle_range: f64,
}

/// Compute the largest covered arc of `angles` (radians, any order, repeats allowed).
///
/// The gaps between consecutive sorted angles and the wraparound gap from the
/// last angle back to the first are scanned once in ascending order, starting
/// with the wraparound gap; a later gap replaces the maximum only when strictly
/// larger. Returns `None` for an empty slice.
pub fn angular_span(angles: &[f64]) -> Option<AngularSpan> {
    match angles {
        [] => None,
        [single] => Some(AngularSpan {
            start_angle: *single,
            end_angle: *single,
            angle_range: 0.0,
        }),
        _ => {
            let mut sorted = angles.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));

            let first = sorted[0];
            let last = sorted[sorted.len() - 1];

            let mut max_gap = first + TAU - last;
            let mut start_angle = first;
            let mut end_angle = last;

            for pair in sorted.windows(2) {
                let gap = pair[1] - pair[0];
                if gap > max_gap {
                    max_gap = gap;
                    start_angle = pair[1];
                    end_angle = pair[0];
                }
            }

            Some(AngularSpan {
                start_angle,
                end_angle,
                angle_range: TAU - max_gap,
            })
        }
    }
}
