// src/lib.rs - Library interface for the curve detector

pub mod angular_span;
pub mod circle_fit;
pub mod config;
pub mod contours;
pub mod curve_detector;
pub mod errors;
pub mod geometry;
pub mod image_io;
pub mod image_utils;
pub mod line_detector;
pub mod mean_shift;
pub mod orientation;
pub mod output;
pub mod pipeline;
pub mod sampling;

// Re-export commonly used types and functions
pub use errors::{CurveDetectorError, Result};
pub use config::{Config, DetectionMode};
pub use geometry::{Circle, Line, Point};
pub use image_io::{InputImage, load_image, save_image};
pub use pipeline::{detect_in_image, process_image, ContourDetections, ImageDetections};

// Re-export the detection core
pub use angular_span::{angular_span, AngularSpan};
pub use circle_fit::circle_from_points;
pub use curve_detector::{detect_curves, CurveParams};
pub use line_detector::{detect_lines, LineParams};
pub use orientation::{candidate_orientations, estimate_orientation, OrientationEstimator};
pub use contours::{find_polygons, Polygon};
