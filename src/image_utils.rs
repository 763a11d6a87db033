use bresenham::Bresenham;
use image::{GrayImage, Rgba, RgbaImage};

use crate::contours::Polygon;
use crate::geometry::{Circle, Line, Point};

/// Overlay colors
pub const CONTOUR_COLOR: [u8; 3] = [0, 0, 0];
pub const SUPPORT_COLOR: [u8; 3] = [255, 0, 0];
pub const CIRCLE_COLOR: [u8; 3] = [255, 0, 255];
pub const LINE_COLOR: [u8; 3] = [0, 0, 255];

/// Angular step used when rasterizing arcs, radians
const ARC_STEP: f64 = 0.02;

/// Resize an image to the specified dimensions
pub fn resize_image(
    image: &GrayImage,
    dimensions: [u32; 2],
) -> GrayImage {
    let (width, height) = (dimensions[0], dimensions[1]);
    image::imageops::resize(
        image,
        width,
        height,
        image::imageops::FilterType::Triangle,
    )
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i64, y: i64, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u64) < width as u64 && (y as u64) < height as u64
}

/// Paint a single pixel if it lies inside the image
#[inline]
fn put_color(image: &mut RgbaImage, x: i64, y: i64, color: [u8; 3]) {
    let (width, height) = image.dimensions();
    if in_bounds(x, y, width, height) {
        image.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
    }
}

/// Draw a segment between two points using Bresenham's algorithm
pub fn draw_segment(image: &mut RgbaImage, from: Point, to: Point, color: [u8; 3]) {
    let start = (from.x.round() as isize, from.y.round() as isize);
    let end = (to.x.round() as isize, to.y.round() as isize);

    // Bresenham excludes the end point
    for (x, y) in Bresenham::new(start, end) {
        put_color(image, x as i64, y as i64, color);
    }
    put_color(image, end.0 as i64, end.1 as i64, color);
}

/// Draw a closed polyline
pub fn draw_closed_polyline(image: &mut RgbaImage, points: &[Point], color: [u8; 3]) {
    if points.len() < 2 {
        return;
    }
    for i in 0..points.len() {
        draw_segment(image, points[i], points[(i + 1) % points.len()], color);
    }
}

/// Draw a square marker of `size` pixels centered on each point
pub fn draw_markers(image: &mut RgbaImage, points: &[Point], color: [u8; 3], size: u32) {
    let radius = (size / 2) as i64;
    for p in points {
        let (cx, cy) = (p.x.round() as i64, p.y.round() as i64);
        for dy in 0..size as i64 {
            for dx in 0..size as i64 {
                put_color(image, cx - radius + dx, cy - radius + dy, color);
            }
        }
    }
}

/// Draw the covered arc of a circle, from `start_angle` through `angle_range`
pub fn draw_arc(image: &mut RgbaImage, circle: &Circle, color: [u8; 3]) {
    let steps = ((circle.angle_range / ARC_STEP).ceil() as usize).max(1);
    let at = |t: f64| circle.center + Point::from_angle(t) * circle.radius;

    let mut prev = at(circle.start_angle);
    for i in 1..=steps {
        let t = circle.start_angle + circle.angle_range * i as f64 / steps as f64;
        let next = at(t);
        draw_segment(image, prev, next, color);
        prev = next;
    }
}

/// Render contours, support points and detected primitives over a grayscale image
pub fn create_overlay_image(
    image: &GrayImage,
    polygons: &[Polygon],
    circles: &[Circle],
    lines: &[Line],
) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut overlay = RgbaImage::from_fn(width, height, |x, y| {
        // Dim the background so the overlay stands out
        let v = 128 + image.get_pixel(x, y)[0] / 2;
        Rgba([v, v, v, 255])
    });

    for polygon in polygons {
        draw_closed_polyline(&mut overlay, &polygon.contour, CONTOUR_COLOR);
        for hole in &polygon.holes {
            draw_closed_polyline(&mut overlay, hole, CONTOUR_COLOR);
        }
    }

    for circle in circles {
        draw_markers(&mut overlay, &circle.points, SUPPORT_COLOR, 3);
        draw_arc(&mut overlay, circle, CIRCLE_COLOR);
    }

    for line in lines {
        draw_markers(&mut overlay, &line.points, SUPPORT_COLOR, 3);
        draw_segment(&mut overlay, line.start_point(), line.end_point(), LINE_COLOR);
    }

    overlay
}
