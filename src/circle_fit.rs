use crate::errors::{CurveDetectorError, Result};
use crate::geometry::{Circle, Point};

/// Determinant magnitude below which the fitter refuses a triple
pub const DETERMINANT_EPSILON: f64 = 1e-7;

/// Cross-product magnitude below which a sampled triple is treated as collinear
pub const COLLINEARITY_THRESHOLD: f64 = 0.001;

/// Returns true when `p1`, `p2`, `p3` are too close to collinear to define a circle
#[inline]
pub fn is_collinear(p1: Point, p2: Point, p3: Point) -> bool {
    (p2 - p1).cross(p3 - p1).abs() < COLLINEARITY_THRESHOLD
}

/// Circumcircle of three points.
///
/// # Returns
/// The circle through all three points, or `CurveDetectorError::DegenerateInput`
/// when the points are collinear within `DETERMINANT_EPSILON`.
pub fn circle_from_points(p1: Point, p2: Point, p3: Point) -> Result<Circle> {
    let offset = p2.x * p2.x + p2.y * p2.y;
    let bc = (p1.x * p1.x + p1.y * p1.y - offset) / 2.0;
    let cd = (offset - p3.x * p3.x - p3.y * p3.y) / 2.0;
    let det = (p1.x - p2.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p2.y);

    if det.abs() < DETERMINANT_EPSILON {
        return Err(CurveDetectorError::DegenerateInput);
    }

    let idet = 1.0 / det;
    let center = Point::new(
        (bc * (p2.y - p3.y) - cd * (p1.y - p2.y)) * idet,
        (cd * (p1.x - p2.x) - bc * (p2.x - p3.x)) * idet,
    );
    let radius = p2.distance(center);

    Ok(Circle::new(center, radius))
}
