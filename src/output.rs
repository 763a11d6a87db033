// src/output.rs - CSV tables of detected primitives and a JSON summary per image

use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;
use serde::Serialize;

use crate::errors::Result;
use crate::pipeline::{ContourDetections, ImageDetections};

/// Per-image overview written to `summary/<name>.json`
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub contour_count: usize,
    pub hole_count: usize,
    pub processed_contours: usize,
    pub principal_orientation: Option<f64>,
    pub candidate_orientations: Vec<f64>,
    pub circle_count: usize,
    pub line_count: usize,
    pub support_point_count: usize,
    pub line_orientation_modes: Vec<f64>,
}

impl DetectionSummary {
    pub fn from_detections(image: &str, detections: &ImageDetections) -> Self {
        let circle_count = detections.circle_count();
        let line_count = detections.line_count();
        let support_point_count = detections
            .per_contour
            .iter()
            .map(|c| {
                c.circles.iter().map(|x| x.points.len()).sum::<usize>()
                    + c.lines.iter().map(|x| x.points.len()).sum::<usize>()
            })
            .sum();

        Self {
            image: image.to_string(),
            width: detections.width,
            height: detections.height,
            contour_count: detections.polygons.len(),
            hole_count: detections.polygons.iter().map(|p| p.holes.len()).sum(),
            processed_contours: detections.per_contour.len(),
            principal_orientation: detections.principal_orientation,
            candidate_orientations: detections.candidate_orientations.clone(),
            circle_count,
            line_count,
            support_point_count,
            line_orientation_modes: detections.line_orientation_modes.clone(),
        }
    }
}

/// Create `<output_dir>/<subdir>/<filename>.<ext>` and its parent directory
fn prepare_path(output_dir: &Path, subdir: &str, filename: &str, ext: &str) -> Result<PathBuf> {
    let output_path = output_dir.join(subdir).join(format!("{}.{}", filename, ext));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(output_path)
}

/// Write one row per detected circle to `circles/<filename>.csv`
pub fn write_circles_csv<P: AsRef<Path>>(
    detections: &[ContourDetections],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = prepare_path(output_dir.as_ref(), "circles", filename, "csv")?;
    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Circle_Id",
        "Contour_Id",
        "Center_X",
        "Center_Y",
        "Radius",
        "Start_Angle",
        "End_Angle",
        "Angle_Range",
        "Arc_Length",
        "Support_Points",
    ])?;

    let mut id = 0usize;
    for contour in detections {
        for circle in &contour.circles {
            writer.write_record(&[
                id.to_string(),
                contour.contour_id.to_string(),
                format!("{:.6}", circle.center.x),
                format!("{:.6}", circle.center.y),
                format!("{:.6}", circle.radius),
                format!("{:.6}", circle.start_angle),
                format!("{:.6}", circle.end_angle),
                format!("{:.6}", circle.angle_range),
                format!("{:.6}", circle.arc_length()),
                circle.points.len().to_string(),
            ])?;
            id += 1;
        }
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write one row per detected line segment to `lines/<filename>.csv`
pub fn write_lines_csv<P: AsRef<Path>>(
    detections: &[ContourDetections],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = prepare_path(output_dir.as_ref(), "lines", filename, "csv")?;
    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Line_Id",
        "Contour_Id",
        "Start_X",
        "Start_Y",
        "End_X",
        "End_Y",
        "Dir_X",
        "Dir_Y",
        "Length",
        "Orientation",
        "Support_Points",
    ])?;

    let mut id = 0usize;
    for contour in detections {
        for line in &contour.lines {
            let (start, end) = (line.start_point(), line.end_point());
            writer.write_record(&[
                id.to_string(),
                contour.contour_id.to_string(),
                format!("{:.6}", start.x),
                format!("{:.6}", start.y),
                format!("{:.6}", end.x),
                format!("{:.6}", end.y),
                format!("{:.6}", line.dir.x),
                format!("{:.6}", line.dir.y),
                format!("{:.6}", line.length()),
                format!("{:.6}", line.orientation()),
                line.points.len().to_string(),
            ])?;
            id += 1;
        }
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write every support point of every primitive to `support/<filename>.csv`.
///
/// Primitive ids match the ids used in the circle and line tables.
pub fn write_support_csv<P: AsRef<Path>>(
    detections: &[ContourDetections],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = prepare_path(output_dir.as_ref(), "support", filename, "csv")?;
    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record(["Kind", "Primitive_Id", "Contour_Id", "Point_Index", "X", "Y"])?;

    let mut circle_id = 0usize;
    let mut line_id = 0usize;
    for contour in detections {
        for circle in &contour.circles {
            for (index, p) in circle.indices.iter().zip(&circle.points) {
                writer.write_record(&[
                    "circle".to_string(),
                    circle_id.to_string(),
                    contour.contour_id.to_string(),
                    index.to_string(),
                    format!("{:.3}", p.x),
                    format!("{:.3}", p.y),
                ])?;
            }
            circle_id += 1;
        }
        for line in &contour.lines {
            for (index, p) in line.indices.iter().zip(&line.points) {
                writer.write_record(&[
                    "line".to_string(),
                    line_id.to_string(),
                    contour.contour_id.to_string(),
                    index.to_string(),
                    format!("{:.3}", p.x),
                    format!("{:.3}", p.y),
                ])?;
            }
            line_id += 1;
        }
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write the per-image summary to `summary/<filename>.json`
pub fn write_summary_json<P: AsRef<Path>>(
    summary: &DetectionSummary,
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = prepare_path(output_dir.as_ref(), "summary", filename, "json")?;
    let content = serde_json::to_string_pretty(summary)?;
    fs::write(&output_path, content)?;

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Point};

    fn sample_detections() -> Vec<ContourDetections> {
        let mut circle = Circle::new(Point::new(10.0, 10.0), 5.0);
        circle.points = vec![Point::new(15.0, 10.0), Point::new(10.0, 15.0)];
        circle.indices = vec![3, 4];
        circle.angle_range = std::f64::consts::FRAC_PI_2;

        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        line.points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        line.indices = vec![7, 8, 9];
        line.end_pos = 2.0;

        vec![
            ContourDetections { contour_id: 0, circles: vec![circle], lines: Vec::new() },
            ContourDetections { contour_id: 2, circles: Vec::new(), lines: vec![line] },
        ]
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn tables_have_one_row_per_primitive() {
        let dir = tempfile::tempdir().unwrap();
        let detections = sample_detections();

        let circles = write_circles_csv(&detections, dir.path(), "img").unwrap();
        let lines = write_lines_csv(&detections, dir.path(), "img").unwrap();
        assert_eq!(circles, dir.path().join("circles").join("img.csv"));

        let circle_rows = read_rows(&circles);
        assert_eq!(circle_rows.len(), 1);
        assert_eq!(&circle_rows[0][4], "5.000000");
        assert_eq!(&circle_rows[0][9], "2");

        let line_rows = read_rows(&lines);
        assert_eq!(line_rows.len(), 1);
        assert_eq!(&line_rows[0][1], "2");
        assert_eq!(&line_rows[0][8], "2.000000");
    }

    #[test]
    fn support_table_lists_every_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_support_csv(&sample_detections(), dir.path(), "img").unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[0][0], "circle");
        assert_eq!(&rows[0][3], "3");
        assert_eq!(&rows[4][0], "line");
        assert_eq!(&rows[4][2], "2");
        assert_eq!(&rows[4][3], "9");
    }
}
