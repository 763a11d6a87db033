// src/config.rs - Detection configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::curve_detector::CurveParams;
use crate::errors::{CurveDetectorError, Result};
use crate::line_detector::LineParams;
use crate::orientation::DEFAULT_ORIENTATION_OFFSETS_DEG;

/// Configuration for the curve detector
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default = "default_output_base_dir")]
    pub output_base_dir: String,
    #[serde(default)]
    pub resize_dimensions: Option<[u32; 2]>,

    #[serde(default = "default_mode")]
    pub mode: DetectionMode,
    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
    /// Fixed seed for reproducible sampling; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    // Contour extraction
    #[serde(default = "default_binary_threshold")]
    pub binary_threshold: u8,
    #[serde(default = "default_min_contour_points")]
    pub min_contour_points: usize,

    // Curve detection parameters
    #[serde(default = "default_curve_num_iterations")]
    pub curve_num_iterations: usize,
    #[serde(default = "default_curve_min_points")]
    pub curve_min_points: usize,
    #[serde(default = "default_curve_max_error_ratio_to_radius")]
    pub curve_max_error_ratio_to_radius: f64,
    #[serde(default = "default_curve_cluster_epsilon")]
    pub curve_cluster_epsilon: usize,
    #[serde(default = "default_curve_min_angle_deg")]
    pub curve_min_angle_deg: f64,
    #[serde(default = "default_curve_min_radius")]
    pub curve_min_radius: f64,
    #[serde(default = "default_curve_max_radius")]
    pub curve_max_radius: f64,

    // Line detection parameters
    #[serde(default = "default_line_num_iterations")]
    pub line_num_iterations: usize,
    #[serde(default = "default_line_min_points")]
    pub line_min_points: usize,
    #[serde(default = "default_line_max_error")]
    pub line_max_error: f64,
    #[serde(default = "default_line_cluster_epsilon")]
    pub line_cluster_epsilon: usize,
    #[serde(default = "default_line_min_length")]
    pub line_min_length: f64,
    #[serde(default = "default_line_orientation_tolerance_deg")]
    pub line_orientation_tolerance_deg: f64,
    /// Offsets added to the principal orientation; empty disables the constraint
    #[serde(default = "default_line_orientation_offsets_deg")]
    pub line_orientation_offsets_deg: Vec<f64>,

    // Optional mean-shift report over detected line orientations
    #[serde(default)]
    pub cluster_line_orientations: bool,
    #[serde(default = "default_mean_shift_bandwidth")]
    pub mean_shift_bandwidth: f64,
    #[serde(default = "default_mean_shift_tolerance")]
    pub mean_shift_tolerance: f64,
    #[serde(default = "default_mean_shift_max_iterations")]
    pub mean_shift_max_iterations: usize,
    #[serde(default = "default_mean_shift_merge_tolerance")]
    pub mean_shift_merge_tolerance: f64,
}

/// Which primitives to extract
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    Curves,
    Lines,
    Both,
}

impl DetectionMode {
    pub fn detects_curves(self) -> bool {
        matches!(self, DetectionMode::Curves | DetectionMode::Both)
    }

    pub fn detects_lines(self) -> bool {
        matches!(self, DetectionMode::Lines | DetectionMode::Both)
    }
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_base_dir() -> String {
    "./output".to_string()
}

fn default_mode() -> DetectionMode {
    DetectionMode::Both
}

fn default_parallel() -> bool {
    true
}

fn default_binary_threshold() -> u8 {
    40
}

fn default_min_contour_points() -> usize {
    100
}

fn default_curve_num_iterations() -> usize {
    200_000
}

fn default_curve_min_points() -> usize {
    200
}

fn default_curve_max_error_ratio_to_radius() -> f64 {
    0.02
}

fn default_curve_cluster_epsilon() -> usize {
    30
}

fn default_curve_min_angle_deg() -> f64 {
    90.0
}

fn default_curve_min_radius() -> f64 {
    80.0
}

fn default_curve_max_radius() -> f64 {
    400.0
}

fn default_line_num_iterations() -> usize {
    20_000
}

fn default_line_min_points() -> usize {
    30
}

fn default_line_max_error() -> f64 {
    2.0
}

fn default_line_cluster_epsilon() -> usize {
    10
}

fn default_line_min_length() -> f64 {
    30.0
}

fn default_line_orientation_tolerance_deg() -> f64 {
    10.0
}

fn default_line_orientation_offsets_deg() -> Vec<f64> {
    DEFAULT_ORIENTATION_OFFSETS_DEG.to_vec()
}

fn default_mean_shift_bandwidth() -> f64 {
    0.1
}

fn default_mean_shift_tolerance() -> f64 {
    1e-3
}

fn default_mean_shift_max_iterations() -> usize {
    10
}

fn default_mean_shift_merge_tolerance() -> f64 {
    0.1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_base_dir: default_output_base_dir(),
            resize_dimensions: None,
            mode: default_mode(),
            use_parallel: default_parallel(),
            seed: None,
            binary_threshold: default_binary_threshold(),
            min_contour_points: default_min_contour_points(),
            curve_num_iterations: default_curve_num_iterations(),
            curve_min_points: default_curve_min_points(),
            curve_max_error_ratio_to_radius: default_curve_max_error_ratio_to_radius(),
            curve_cluster_epsilon: default_curve_cluster_epsilon(),
            curve_min_angle_deg: default_curve_min_angle_deg(),
            curve_min_radius: default_curve_min_radius(),
            curve_max_radius: default_curve_max_radius(),
            line_num_iterations: default_line_num_iterations(),
            line_min_points: default_line_min_points(),
            line_max_error: default_line_max_error(),
            line_cluster_epsilon: default_line_cluster_epsilon(),
            line_min_length: default_line_min_length(),
            line_orientation_tolerance_deg: default_line_orientation_tolerance_deg(),
            line_orientation_offsets_deg: default_line_orientation_offsets_deg(),
            cluster_line_orientations: false,
            mean_shift_bandwidth: default_mean_shift_bandwidth(),
            mean_shift_tolerance: default_mean_shift_tolerance(),
            mean_shift_max_iterations: default_mean_shift_max_iterations(),
            mean_shift_merge_tolerance: default_mean_shift_merge_tolerance(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CurveDetectorError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| CurveDetectorError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            CurveDetectorError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Validate detection parameters (input path existence is checked separately)
    pub fn validate(&self) -> Result<()> {
        if self.curve_num_iterations == 0 || self.line_num_iterations == 0 {
            return Err(CurveDetectorError::Config(
                "num_iterations must be > 0".to_string(),
            ));
        }

        if self.curve_cluster_epsilon == 0 || self.line_cluster_epsilon == 0 {
            return Err(CurveDetectorError::Config(
                "cluster_epsilon must be > 0".to_string(),
            ));
        }

        if self.curve_max_error_ratio_to_radius <= 0.0 {
            return Err(CurveDetectorError::Config(
                "curve_max_error_ratio_to_radius must be > 0.0".to_string(),
            ));
        }

        if self.curve_min_radius < 0.0 || self.curve_min_radius > self.curve_max_radius {
            return Err(CurveDetectorError::Config(
                "curve_min_radius must be >= 0.0 and <= curve_max_radius".to_string(),
            ));
        }

        if !(0.0..=360.0).contains(&self.curve_min_angle_deg) {
            return Err(CurveDetectorError::Config(
                "curve_min_angle_deg must be between 0.0 and 360.0".to_string(),
            ));
        }

        if self.line_max_error < 0.0 {
            return Err(CurveDetectorError::Config(
                "line_max_error must be >= 0.0".to_string(),
            ));
        }

        if self.line_min_length < 0.0 {
            return Err(CurveDetectorError::Config(
                "line_min_length must be >= 0.0".to_string(),
            ));
        }

        if !(0.0..=90.0).contains(&self.line_orientation_tolerance_deg) {
            return Err(CurveDetectorError::Config(
                "line_orientation_tolerance_deg must be between 0.0 and 90.0".to_string(),
            ));
        }

        if self.mean_shift_bandwidth <= 0.0 || self.mean_shift_merge_tolerance < 0.0 {
            return Err(CurveDetectorError::Config(
                "mean_shift_bandwidth must be > 0.0 and mean_shift_merge_tolerance >= 0.0".to_string(),
            ));
        }

        if let Some([w, h]) = self.resize_dimensions {
            if w == 0 || h == 0 {
                return Err(CurveDetectorError::Config(
                    "resize_dimensions must be non-zero".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check that the configured input path exists
    pub fn validate_input(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(CurveDetectorError::InvalidPath(input_path));
        }
        Ok(())
    }

    pub fn curve_params(&self) -> CurveParams {
        CurveParams {
            num_iterations: self.curve_num_iterations,
            min_points: self.curve_min_points,
            max_error_ratio_to_radius: self.curve_max_error_ratio_to_radius,
            cluster_epsilon: self.curve_cluster_epsilon,
            min_angle: self.curve_min_angle_deg.to_radians(),
            min_radius: self.curve_min_radius,
            max_radius: self.curve_max_radius,
        }
    }

    pub fn line_params(&self) -> LineParams {
        LineParams {
            num_iterations: self.line_num_iterations,
            min_points: self.line_min_points,
            max_error: self.line_max_error,
            cluster_epsilon: self.line_cluster_epsilon,
            min_length: self.line_min_length,
            orientation_tolerance: self.line_orientation_tolerance_deg.to_radians(),
        }
    }
}
