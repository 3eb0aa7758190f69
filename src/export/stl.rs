use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use stl_io::{Normal, Triangle, Vertex};
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::math::{Point3, Vector3};
use crate::tessellation::TriangleMesh;

/// STL flavour to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Little-endian binary STL.
    #[default]
    Binary,
    /// Human-readable ASCII STL.
    Ascii,
}

/// Writes a [`TriangleMesh`] as an STL triangle soup.
///
/// Facet normals are recomputed from the winding. If the mesh encloses a
/// negative volume (inside-out winding) every triangle is written reversed,
/// so the file always has outward-facing facets.
pub struct WriteStl<'a> {
    mesh: &'a TriangleMesh,
    format: StlFormat,
    name: String,
}

impl<'a> WriteStl<'a> {
    /// Creates a new `WriteStl` operation writing binary STL.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self {
            mesh,
            format: StlFormat::default(),
            name: "hollowtext".to_owned(),
        }
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: StlFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the solid name used in ASCII output.
    ///
    /// Whitespace and control characters become `_` so the name stays a
    /// single token; an empty name falls back to `hollowtext`.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        let name: String = name
            .chars()
            .map(|c| if c.is_whitespace() || c.is_control() { '_' } else { c })
            .collect();
        if !name.is_empty() {
            self.name = name;
        }
        self
    }

    /// Writes the mesh to a file, replacing it if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Write`] if the file cannot be created or written.
    pub fn execute(&self, path: &Path) -> Result<()> {
        let to_export_error = |source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(to_export_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(to_export_error)?;
        writer.flush().map_err(to_export_error)?;
        info!(
            path = %path.display(),
            triangles = self.mesh.triangle_count(),
            format = ?self.format,
            "wrote STL"
        );
        Ok(())
    }

    /// Writes the mesh to any writer.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the writer fails.
    pub fn execute_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.write_to(writer).map_err(ExportError::Io)?;
        Ok(())
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let flip = self.mesh.signed_volume() < 0.0;
        if flip {
            debug!("mesh winding is inside-out, reversing every facet");
        }
        let facets = (0..self.mesh.triangle_count()).map(|i| oriented_facet(self.mesh, i, flip));
        match self.format {
            StlFormat::Binary => stl_io::write_stl(writer, facets),
            StlFormat::Ascii => write_ascii(writer, &self.name, facets),
        }
    }
}

/// Convenience wrapper around [`WriteStl`].
///
/// # Errors
///
/// Returns [`ExportError::Write`] if the file cannot be written.
pub fn write_stl(mesh: &TriangleMesh, path: &Path, format: StlFormat) -> Result<()> {
    WriteStl::new(mesh).with_format(format).execute(path)
}

/// Reads binary or ASCII STL into a mesh with welded vertices.
///
/// # Errors
///
/// Returns [`ExportError::Read`] if the data is not valid STL.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<TriangleMesh> {
    let indexed = stl_io::read_stl(reader).map_err(ExportError::Read)?;
    let vertices = indexed
        .vertices
        .iter()
        .map(|v| Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))
        .collect();
    #[allow(clippy::cast_possible_truncation)]
    let indices = indexed
        .faces
        .iter()
        .map(|f| f.vertices.map(|i| i as u32))
        .collect();
    Ok(TriangleMesh { vertices, indices })
}

#[allow(clippy::cast_possible_truncation)]
fn oriented_facet(mesh: &TriangleMesh, i: usize, flip: bool) -> Triangle {
    let [a, b, c] = mesh.triangle(i);
    let (b, c) = if flip { (c, b) } else { (b, c) };
    let n: Vector3 = (b - a)
        .cross(&(c - a))
        .try_normalize(1e-30)
        .unwrap_or_else(Vector3::zeros);
    let vertex = |p: Point3| Vertex::new([p.x as f32 + 0.0, p.y as f32 + 0.0, p.z as f32 + 0.0]);
    Triangle {
        normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
        vertices: [vertex(a), vertex(b), vertex(c)],
    }
}

fn write_ascii<W: Write>(
    writer: &mut W,
    name: &str,
    facets: impl Iterator<Item = Triangle>,
) -> std::io::Result<()> {
    writeln!(writer, "solid {name}")?;
    for facet in facets {
        let n = facet.normal;
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n[0], n[1], n[2])?;
        writeln!(writer, "    outer loop")?;
        for v in &facet.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v[0], v[1], v[2])?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}
