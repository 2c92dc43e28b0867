use anyhow::{anyhow, Context, Result};
use slabfit_core::{
    containers::{Point, PointCloud},
    nalgebra::Vector3,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reader for point clouds in the plain-text `xyz` format.
///
/// Each non-empty line describes one point as either `x y z` or `x y z nx ny nz`, separated by
/// whitespace. The normal is optional and defaults to the zero vector when absent
pub struct XyzReader<R: BufRead> {
    read: R,
}

impl XyzReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).with_context(|| {
            format!(
                "Could not open file for reading: {}",
                path.as_ref().display()
            )
        })?;
        Ok(Self::from_read(BufReader::new(file)))
    }
}

impl<R: BufRead> XyzReader<R> {
    pub fn from_read(read: R) -> Self {
        Self { read }
    }

    /// Reads all points into a [PointCloud]. Blank lines are skipped; a line whose first three
    /// fields cannot be parsed as coordinates is an error
    pub fn read_cloud(self) -> Result<PointCloud> {
        let mut points = Vec::new();
        for (line_index, line) in self.read.lines().enumerate() {
            let line = line.context("Failed to read line")?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            points.push(parse_point(trimmed).with_context(|| {
                format!("Could not read point from line {}: {}", line_index + 1, trimmed)
            })?);
        }
        Ok(PointCloud::from_points(points))
    }
}

fn parse_point(line: &str) -> Result<Point> {
    let mut fields = line.split_whitespace();
    let position = parse_vector(&mut fields)?;
    // The normal is optional and defaults to zero, matching the write format leniently enough to
    // also accept lines with trailing garbage after the coordinates
    let normal = parse_vector(&mut fields).unwrap_or_else(|_| Vector3::zeros());
    Ok(Point::new(position, normal))
}

fn parse_vector<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Result<Vector3<f64>> {
    let mut components = [0.0; 3];
    for component in components.iter_mut() {
        let field = fields.next().ok_or_else(|| anyhow!("Unexpected end of line"))?;
        *component = field
            .parse()
            .with_context(|| format!("'{}' is not a coordinate", field))?;
    }
    Ok(Vector3::new(components[0], components[1], components[2]))
}
