use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for the curve detector
#[derive(Error, Debug)]
pub enum CurveDetectorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    /// Three points handed to the circle fitter are collinear within tolerance
    #[error("Three points are collinear")]
    DegenerateInput,

    /// Contour has fewer points than a detection run needs
    #[error("Contour has {points} points, at least {min_points} required")]
    InsufficientData {
        points: usize,
        min_points: usize,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, CurveDetectorError>;
