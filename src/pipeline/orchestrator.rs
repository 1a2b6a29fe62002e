use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::merged::{self, Overrides, PageFilter, RunConfig};
use crate::config::region::Region;
use crate::config::settings::Settings;
use crate::decode::{self, DecoderStrategy};
use crate::error::DicerError;
use crate::events::{DicerEvents, Stage, emit_all};
use crate::extract::{LopdfExtractor, RangeExtractor};
use crate::page::Page;
use crate::pipeline::assembler::{self, RangeEntry, RangeTable};
use crate::pipeline::classifier;
use crate::render::{PdfiumRasterizer, Rasterizer};

/// One extracted sub-document together with its range metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRange {
    pub range: RangeEntry,
    pub bytes: Vec<u8>,
}

/// Result of a completed split run. On failure nothing partial is
/// returned: the run either yields the full range table with all
/// extracted documents, or the first error encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub ranges: RangeTable,
    pub documents: Vec<ExtractedRange>,
}

/// The page-classification-and-range-assembly pipeline.
///
/// Owns instance defaults, registered lifecycle listeners and the
/// external collaborators (rasterizer, extractor, optionally a decoder
/// strategy), all injectable for testing or alternative backends.
///
/// ```no_run
/// use pdf_dicer::{Dicer, Overrides, Settings};
///
/// let dicer = Dicer::new(Settings::default());
/// let outcome = dicer.split("batch.pdf".as_ref(), &Overrides::default())?;
/// for doc in &outcome.documents {
///     println!("{}..{} -> {} bytes", doc.range.from, doc.range.to(), doc.bytes.len());
/// }
/// # Ok::<(), pdf_dicer::DicerError>(())
/// ```
pub struct Dicer {
    settings: Settings,
    filter: Option<PageFilter>,
    listeners: Vec<Box<dyn DicerEvents>>,
    rasterizer: Box<dyn Rasterizer>,
    extractor: Box<dyn RangeExtractor>,
    strategy: Option<Box<dyn DecoderStrategy>>,
}

impl Default for Dicer {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Dicer {
    pub fn new(settings: Settings) -> Self {
        Dicer {
            settings,
            filter: None,
            listeners: Vec::new(),
            rasterizer: Box::new(PdfiumRasterizer),
            extractor: Box::new(LopdfExtractor),
            strategy: None,
        }
    }

    /// Select a named decoding profile for subsequent runs. Unknown
    /// names are rejected here, before any processing.
    pub fn profile(mut self, name: &str) -> crate::error::Result<Self> {
        merged::resolve_profile(name)?;
        self.settings.profile = name.to_owned();
        Ok(self)
    }

    /// Replace the configured region list.
    pub fn regions(mut self, regions: Vec<Region>) -> Self {
        self.settings.regions = regions;
        self
    }

    /// Install the page filter predicate applied after classification.
    pub fn filter(mut self, filter: impl Fn(&Page) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Register a lifecycle listener. Listeners are independent; every
    /// registered one receives every notification.
    pub fn on(mut self, listener: impl DicerEvents + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Swap the rasterizer collaborator.
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    /// Swap the range extractor collaborator.
    pub fn with_extractor(mut self, extractor: impl RangeExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Force a decoder strategy instead of the profile-selected one.
    pub fn with_strategy(mut self, strategy: impl DecoderStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    fn emit(&self, f: impl Fn(&dyn DicerEvents)) {
        emit_all(&self.listeners, f);
    }

    fn stage(&self, stage: Stage) {
        debug!(stage = stage.as_str(), "stage transition");
        self.emit(|l| l.on_stage(stage));
    }

    /// Split `input` into one output document per assembled range.
    ///
    /// Stage order: init, readSource, rasterize, classify, filter,
    /// assembleRanges, extractRanges, done. Classification begins only
    /// after every page has been rasterized, because range assembly is
    /// order-dependent and must see the complete page sequence. Any
    /// stage failure aborts the remaining stages; no completion
    /// notification fires in that case.
    pub fn split(&self, input: &Path, overrides: &Overrides) -> crate::error::Result<SplitOutcome> {
        let config = RunConfig::new(&self.settings, overrides, self.filter.clone())?;

        let built;
        let strategy: &dyn DecoderStrategy = match &self.strategy {
            Some(s) => s.as_ref(),
            None => {
                built = decode::build_strategy(&config);
                built.as_ref()
            }
        };

        self.stage(Stage::Init);
        if input.as_os_str().is_empty() {
            return Err(DicerError::invalid_input("empty input path"));
        }

        self.stage(Stage::ReadSource);
        if !input.exists() {
            return Err(DicerError::source_not_found(input.display().to_string()));
        }

        // Rasterized page images live here and vanish with the run.
        let temp_dir = tempfile::Builder::new()
            .prefix(&config.temp_prefix)
            .tempdir()?;
        self.emit(|l| l.on_temp_dir_created(temp_dir.path()));

        self.stage(Stage::Rasterize);
        let page_count = self.rasterizer.page_count(input)?;
        debug!(page_count, "rasterizing source document");
        let mut pages = Vec::with_capacity(page_count);
        for index in 1..=page_count {
            let image_path = self.rasterizer.rasterize(
                input,
                index,
                temp_dir.path(),
                &config.image_format,
                config.dpi,
            )?;
            let page = Page::new(index, image_path);
            self.emit(|l| l.on_page_rasterized(&page));
            pages.push(page);
        }
        self.emit(|l| l.on_all_pages_rasterized(&pages));

        self.stage(Stage::Classify);
        let mut pages = classifier::classify_pages(pages, &config, strategy, &self.listeners)?;

        self.stage(Stage::Filter);
        classifier::apply_filter(&mut pages, &config, &self.listeners);
        self.emit(|l| l.on_all_pages_classified(&pages));

        self.stage(Stage::AssembleRanges);
        let ranges = assembler::assemble(&pages)?;
        debug!(ranges = ranges.len(), "range table assembled");
        self.emit(|l| l.on_range_assembled(&ranges));

        self.stage(Stage::ExtractRanges);
        let documents = self.extract_ranges(input, &ranges)?;
        for doc in &documents {
            self.emit(|l| l.on_range_extracted(&doc.range, &doc.bytes));
        }
        self.emit(|l| l.on_all_ranges_extracted());

        self.stage(Stage::Done);
        Ok(SplitOutcome { ranges, documents })
    }

    /// Produce the output documents, one per range. Extraction may run
    /// in parallel but results stay in ascending range order.
    fn extract_ranges(
        &self,
        input: &Path,
        ranges: &RangeTable,
    ) -> crate::error::Result<Vec<ExtractedRange>> {
        ranges
            .entries()
            .par_iter()
            .map(|entry| {
                let bytes = self.extractor.extract(input, entry.from, entry.to())?;
                Ok(ExtractedRange {
                    range: entry.clone(),
                    bytes,
                })
            })
            .collect()
    }
}
