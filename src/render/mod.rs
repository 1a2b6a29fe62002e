pub mod pdfium;

use std::path::{Path, PathBuf};

pub use pdfium::PdfiumRasterizer;

/// Document-to-image rasterizer collaborator.
pub trait Rasterizer: Send + Sync {
    /// Number of pages in the source document. Must fail with a
    /// distinguishable error when the source is not a valid document.
    fn page_count(&self, source: &Path) -> crate::error::Result<usize>;

    /// Rasterize one page (1-based) into `out_dir` using the given
    /// image format and density, returning the written image path.
    fn rasterize(
        &self,
        source: &Path,
        page_index: usize,
        out_dir: &Path,
        format: &str,
        dpi: u32,
    ) -> crate::error::Result<PathBuf>;
}
