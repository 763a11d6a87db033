// src/contours.rs - Boundary tracing of a binarized image into outer contours and holes

use image::GrayImage;
use imageproc::contours::{find_contours_with_threshold, BorderType};
use log::debug;

use crate::geometry::Point;

/// One traced foreground region: its outer boundary plus the boundaries of its holes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub contour: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn len(&self) -> usize {
        self.contour.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }
}

/// Trace every foreground region of `image`.
///
/// Pixels with intensity strictly greater than `threshold` are foreground.
/// Each outer border becomes a `Polygon`, and hole borders are attached to the
/// outer border that directly encloses them. Borders with fewer than 3 points
/// are dropped. Islands nested inside holes are reported as separate polygons.
pub fn find_polygons(image: &GrayImage, threshold: u8) -> Vec<Polygon> {
    let traced = find_contours_with_threshold::<i32>(image, threshold);

    let to_points = |points: &[imageproc::point::Point<i32>]| -> Vec<Point> {
        points
            .iter()
            .map(|p| Point::new(p.x as f64, p.y as f64))
            .collect()
    };

    let mut polygons = Vec::new();
    for (i, outer) in traced.iter().enumerate() {
        if outer.border_type != BorderType::Outer || outer.points.len() < 3 {
            continue;
        }

        let holes = traced
            .iter()
            .filter(|c| c.border_type == BorderType::Hole && c.parent == Some(i) && c.points.len() >= 3)
            .map(|c| to_points(&c.points))
            .collect();

        polygons.push(Polygon {
            contour: to_points(&outer.points),
            holes,
        });
    }

    debug!(
        "Traced {} borders into {} polygons ({} holes)",
        traced.len(),
        polygons.len(),
        polygons.iter().map(|p| p.holes.len()).sum::<usize>()
    );

    polygons
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn disk_image(size: u32, center: (f64, f64), outer: f64, inner: f64) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let d = ((x as f64 - center.0).powi(2) + (y as f64 - center.1).powi(2)).sqrt();
            if d <= outer && d > inner {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn filled_square_has_one_contour() {
        let image = GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Luma([200])
            } else {
                Luma([0])
            }
        });
        let polygons = find_polygons(&image, 40);
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].holes.is_empty());
        // Every border pixel of a 20x20 square
        assert_eq!(polygons[0].len(), 76);
        for p in &polygons[0].contour {
            assert!(p.x >= 10.0 && p.x <= 29.0 && p.y >= 10.0 && p.y <= 29.0);
        }
    }

    #[test]
    fn ring_keeps_its_hole() {
        let image = disk_image(80, (40.0, 40.0), 30.0, 10.0);
        let polygons = find_polygons(&image, 40);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes.len(), 1);
        assert!(polygons[0].holes[0].len() >= 3);
    }

    #[test]
    fn dim_pixels_are_background() {
        let image = GrayImage::from_fn(20, 20, |_, _| Luma([30]));
        assert!(find_polygons(&image, 40).is_empty());
    }

    #[test]
    fn separate_blobs_become_separate_polygons() {
        let image = GrayImage::from_fn(60, 30, |x, y| {
            let left = (5..20).contains(&x) && (5..20).contains(&y);
            let right = (35..55).contains(&x) && (5..25).contains(&y);
            if left || right {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let polygons = find_polygons(&image, 40);
        assert_eq!(polygons.len(), 2);
    }
}
