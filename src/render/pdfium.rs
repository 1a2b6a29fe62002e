// pdfium-render wrapper: page -> image file in the run's temp directory

use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;

use super::Rasterizer;
use crate::error::DicerError;

/// Resolves the path to the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable
/// 2. `vendor/pdfium/lib/` relative to the project root (for development)
fn resolve_pdfium_lib_path() -> crate::error::Result<PathBuf> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(p);
        }
        return Err(DicerError::render(format!(
            "PDFIUM_DYNAMIC_LIB_PATH is set to '{path}' but the path does not exist"
        )));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let vendor_path = PathBuf::from(&manifest_dir).join("vendor/pdfium/lib");
        if vendor_path.exists() {
            return Ok(vendor_path);
        }
    }

    Err(DicerError::render(
        "pdfium library not found: set PDFIUM_DYNAMIC_LIB_PATH or place libpdfium.so in vendor/pdfium/lib/",
    ))
}

/// Creates a new Pdfium instance by dynamically loading the shared library.
fn create_pdfium() -> crate::error::Result<Pdfium> {
    let lib_path = resolve_pdfium_lib_path()?;
    let lib_path_str = lib_path
        .to_str()
        .ok_or_else(|| DicerError::render("pdfium library path contains non-UTF-8 characters"))?;
    let bindings =
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_path_str))
            .map_err(|e| DicerError::render(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

/// Rasterizer backed by pdfium. Pages render sequentially; pdfium is
/// not safe to drive from multiple threads.
pub struct PdfiumRasterizer;

impl Rasterizer for PdfiumRasterizer {
    fn page_count(&self, source: &Path) -> crate::error::Result<usize> {
        let pdfium = create_pdfium()?;
        let document = pdfium.load_pdf_from_file(source, None).map_err(|e| {
            DicerError::invalid_input(format!(
                "{} is not a readable PDF: {e}",
                source.display()
            ))
        })?;
        Ok(document.pages().len() as usize)
    }

    fn rasterize(
        &self,
        source: &Path,
        page_index: usize,
        out_dir: &Path,
        format: &str,
        dpi: u32,
    ) -> crate::error::Result<PathBuf> {
        let pdfium = create_pdfium()?;
        let document = pdfium.load_pdf_from_file(source, None).map_err(|e| {
            DicerError::invalid_input(format!(
                "{} is not a readable PDF: {e}",
                source.display()
            ))
        })?;

        let page_index_u16 = u16::try_from(page_index.checked_sub(1).ok_or_else(|| {
            DicerError::render("page index is 1-based; got 0")
        })?)
        .map_err(|_| DicerError::render("page index exceeds u16 range"))?;

        let page = document
            .pages()
            .get(page_index_u16)
            .map_err(|e| DicerError::render(e.to_string()))?;

        // PDF default user unit: 1 point = 1/72 inch
        // At the given DPI, each point maps to (dpi / 72) pixels
        let width_pts = page.width().value;
        let height_pts = page.height().value;
        let width_px = (width_pts * dpi as f32 / 72.0).round() as i32;
        let height_px = (height_pts * dpi as f32 / 72.0).round() as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_target_height(height_px);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| DicerError::render(e.to_string()))?;

        let out_path = out_dir.join(format!("page-{page_index}.{format}"));
        bitmap.as_image().save(&out_path)?;
        Ok(out_path)
    }
}
