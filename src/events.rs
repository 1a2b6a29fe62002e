use std::path::Path;

use crate::page::Page;
use crate::pipeline::assembler::{RangeEntry, RangeTable};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ReadSource,
    Rasterize,
    Classify,
    Filter,
    AssembleRanges,
    ExtractRanges,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::ReadSource => "readSource",
            Stage::Rasterize => "rasterize",
            Stage::Classify => "classify",
            Stage::Filter => "filter",
            Stage::AssembleRanges => "assembleRanges",
            Stage::ExtractRanges => "extractRanges",
            Stage::Done => "done",
        }
    }
}

/// Lifecycle notifications fired by the pipeline.
///
/// Every method defaults to a no-op so listeners implement only what
/// they care about. Fire-and-forget: return values are not consulted.
/// Per-page classification notifications may arrive from worker threads
/// in completion order; the page data handed to range assembly is
/// always index-ordered regardless.
pub trait DicerEvents: Send + Sync {
    fn on_stage(&self, _stage: Stage) {}
    fn on_temp_dir_created(&self, _path: &Path) {}
    fn on_page_rasterized(&self, _page: &Page) {}
    fn on_all_pages_rasterized(&self, _pages: &[Page]) {}
    fn before_page_classified(&self, _page: &Page) {}
    fn on_page_classified(&self, _page: &Page) {}
    fn on_marker_rejected(&self, _page: &Page) {}
    fn on_marker_accepted(&self, _page: &Page) {}
    fn on_all_pages_classified(&self, _pages: &[Page]) {}
    fn on_range_assembled(&self, _ranges: &RangeTable) {}
    fn on_range_extracted(&self, _range: &RangeEntry, _bytes: &[u8]) {}
    fn on_all_ranges_extracted(&self) {}
}

impl<T: DicerEvents + ?Sized> DicerEvents for std::sync::Arc<T> {
    fn on_stage(&self, stage: Stage) {
        (**self).on_stage(stage)
    }
    fn on_temp_dir_created(&self, path: &Path) {
        (**self).on_temp_dir_created(path)
    }
    fn on_page_rasterized(&self, page: &Page) {
        (**self).on_page_rasterized(page)
    }
    fn on_all_pages_rasterized(&self, pages: &[Page]) {
        (**self).on_all_pages_rasterized(pages)
    }
    fn before_page_classified(&self, page: &Page) {
        (**self).before_page_classified(page)
    }
    fn on_page_classified(&self, page: &Page) {
        (**self).on_page_classified(page)
    }
    fn on_marker_rejected(&self, page: &Page) {
        (**self).on_marker_rejected(page)
    }
    fn on_marker_accepted(&self, page: &Page) {
        (**self).on_marker_accepted(page)
    }
    fn on_all_pages_classified(&self, pages: &[Page]) {
        (**self).on_all_pages_classified(pages)
    }
    fn on_range_assembled(&self, ranges: &RangeTable) {
        (**self).on_range_assembled(ranges)
    }
    fn on_range_extracted(&self, range: &RangeEntry, bytes: &[u8]) {
        (**self).on_range_extracted(range, bytes)
    }
    fn on_all_ranges_extracted(&self) {
        (**self).on_all_ranges_extracted()
    }
}

/// Fan one notification out to every registered listener.
pub(crate) fn emit_all(listeners: &[Box<dyn DicerEvents>], f: impl Fn(&dyn DicerEvents)) {
    for listener in listeners {
        f(listener.as_ref());
    }
}
