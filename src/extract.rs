use std::path::Path;

/// Produces one standalone output document from a contiguous page
/// range of the source.
pub trait RangeExtractor: Send + Sync {
    /// Extract pages `from..=to` (1-based, inclusive) into an output
    /// byte buffer.
    fn extract(&self, source: &Path, from: usize, to: usize) -> crate::error::Result<Vec<u8>>;
}

/// lopdf-backed extractor: loads the source, drops every page outside
/// the range and serializes what remains.
pub struct LopdfExtractor;

impl RangeExtractor for LopdfExtractor {
    fn extract(&self, source: &Path, from: usize, to: usize) -> crate::error::Result<Vec<u8>> {
        let mut document = lopdf::Document::load(source)?;

        let total = document.get_pages().len() as u32;
        let delete: Vec<u32> = (1..=total)
            .filter(|&p| (p as usize) < from || (p as usize) > to)
            .collect();
        if !delete.is_empty() {
            document.delete_pages(&delete);
        }
        document.prune_objects();

        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
