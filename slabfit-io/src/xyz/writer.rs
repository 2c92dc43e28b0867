use anyhow::{Context, Result};
use slabfit_core::containers::PointCloud;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for point clouds in the plain-text `xyz` format. Always writes the full
/// `x y z nx ny nz` form, with zero normals for points that have none
pub struct XyzWriter<W: Write> {
    write: W,
}

impl XyzWriter<BufWriter<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).with_context(|| {
            format!(
                "Could not open file for writing: {}",
                path.as_ref().display()
            )
        })?;
        Ok(Self::from_write(BufWriter::new(file)))
    }
}

impl<W: Write> XyzWriter<W> {
    pub fn from_write(write: W) -> Self {
        Self { write }
    }

    /// Writes all points of `cloud`, one per line, and flushes the underlying writer
    pub fn write_cloud(&mut self, cloud: &PointCloud) -> Result<()> {
        for point in cloud.points() {
            let p = &point.position;
            let n = &point.normal;
            writeln!(self.write, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z)
                .context("Failed to write point")?;
        }
        self.write.flush().context("Failed to flush point data")?;
        Ok(())
    }
}
