//! Split a multi-page PDF into independent sub-documents keyed by
//! per-page barcode markers.
//!
//! Each page is rasterized to an image, a marker value is decoded from
//! configurable page regions through a pluggable strategy, consecutive
//! pages sharing a group key are folded into contiguous ranges, and
//! every range is extracted into its own output document. Pages without
//! a marker inherit the previous page's group, so a sub-document marked
//! only on its first and last pages stays in one piece.

pub mod config;
pub mod decode;
pub mod error;
pub mod events;
pub mod extract;
pub mod page;
pub mod pipeline;
pub mod render;

pub use config::merged::{Driver, Overrides, PageFilter, RunConfig};
pub use config::region::{Dim, PixelRect, Region};
pub use config::settings::{BardecodeOptions, Concurrency, ScanlineOptions, Settings};
pub use decode::DecoderStrategy;
pub use error::{DicerError, Result};
pub use events::{DicerEvents, Stage};
pub use extract::RangeExtractor;
pub use page::Page;
pub use pipeline::assembler::{RangeEntry, RangeTable};
pub use pipeline::orchestrator::{Dicer, ExtractedRange, SplitOutcome};
pub use render::Rasterizer;
