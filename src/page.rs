use std::path::PathBuf;

/// One rasterized page of the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based position in the document. Immutable once assigned.
    pub index: usize,
    /// Transient rasterized image, owned by the run's temp directory and
    /// removed with it at the end of the run.
    pub image_path: PathBuf,
    /// Decoded marker value, set exactly once by the classifier stage.
    /// `None` is the absent sentinel; an empty string is a valid marker.
    pub marker: Option<String>,
}

impl Page {
    pub fn new(index: usize, image_path: PathBuf) -> Self {
        Page {
            index,
            image_path,
            marker: None,
        }
    }
}
