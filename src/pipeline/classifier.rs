use rayon::prelude::*;

use crate::config::merged::RunConfig;
use crate::decode::DecoderStrategy;
use crate::error::DicerError;
use crate::events::{DicerEvents, emit_all};
use crate::page::Page;

/// Build a pool for one concurrency ceiling. `0` defers to rayon's
/// default sizing, `1` is effectively sequential.
fn build_pool(threads: usize) -> crate::error::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| DicerError::config(format!("failed to build worker pool: {e}")))
}

/// Resolve one page's marker by evaluating configured regions in order.
///
/// `find_map_first` keeps configured-order priority even when regions
/// run in parallel: the leftmost region that yields a value wins and
/// later regions are cancelled. A decoder failure on any region
/// surfaces as the classification's failure for the page.
pub fn classify_page(
    page: &Page,
    config: &RunConfig,
    strategy: &dyn DecoderStrategy,
    region_pool: &rayon::ThreadPool,
) -> crate::error::Result<Option<String>> {
    let outcome = region_pool.install(|| {
        config
            .regions
            .par_iter()
            .find_map_first(|region| match strategy.decode(&page.image_path, region) {
                Ok(Some(value)) => Some(Ok(value)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            })
    });

    match outcome {
        Some(Ok(value)) => Ok(Some(value)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Classify every page with bounded page-level parallelism.
///
/// Parallel results are keyed by page index and reassembled in order:
/// the returned collection is always in ascending index order no matter
/// the completion order, which range assembly depends on. Per-page
/// notifications fire from worker threads as pages finish.
pub fn classify_pages(
    mut pages: Vec<Page>,
    config: &RunConfig,
    strategy: &dyn DecoderStrategy,
    listeners: &[Box<dyn DicerEvents>],
) -> crate::error::Result<Vec<Page>> {
    let page_pool = build_pool(config.concurrency.pages)?;
    // One region pool serves every page task: the region ceiling bounds
    // region evaluations across the whole run, not per page.
    let region_pool = build_pool(config.concurrency.regions)?;

    let markers: Vec<Option<String>> = page_pool.install(|| {
        pages
            .par_iter()
            .map(|page| {
                emit_all(listeners, |l| l.before_page_classified(page));
                let marker = classify_page(page, config, strategy, &region_pool)?;

                let mut classified = page.clone();
                classified.marker = marker.clone();
                emit_all(listeners, |l| l.on_page_classified(&classified));
                Ok(marker)
            })
            .collect::<crate::error::Result<Vec<_>>>()
    })?;

    for (page, marker) in pages.iter_mut().zip(markers) {
        page.marker = marker;
    }
    Ok(pages)
}

/// Apply the optional filter predicate after classification.
///
/// The predicate is invoked for every page, including pages whose
/// marker is absent. A `false` verdict clears the marker to absent
/// before range assembly, after the rejection notification has seen
/// the original value; an absent marker stays absent under either
/// verdict.
pub fn apply_filter(pages: &mut [Page], config: &RunConfig, listeners: &[Box<dyn DicerEvents>]) {
    let Some(filter) = &config.filter else {
        return;
    };

    for page in pages.iter_mut() {
        if filter(page) {
            emit_all(listeners, |l| l.on_marker_accepted(page));
        } else {
            emit_all(listeners, |l| l.on_marker_rejected(page));
            page.marker = None;
        }
    }
}
