use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use pdf_dicer::config::merged::{Overrides, RunConfig};
use pdf_dicer::config::region::{Dim, Region};
use pdf_dicer::config::settings::Settings;
use pdf_dicer::decode::DecoderStrategy;
use pdf_dicer::error::DicerError;
use pdf_dicer::events::DicerEvents;
use pdf_dicer::page::Page;
use pdf_dicer::pipeline::classifier::{apply_filter, classify_pages};

fn region_with_top(top: f32) -> Region {
    Region {
        top: Dim::Percent(top),
        right: Dim::Percent(0.0),
        bottom: Dim::Percent(0.0),
        left: Dim::Percent(0.0),
    }
}

fn make_pages(count: usize) -> Vec<Page> {
    (1..=count)
        .map(|i| Page::new(i, PathBuf::from(format!("page-{i}.png"))))
        .collect()
}

fn config_with(
    regions: Vec<Region>,
    pages_ceiling: usize,
    regions_ceiling: usize,
) -> RunConfig {
    let overrides = Overrides {
        regions: Some(regions),
        concurrency_pages: Some(pages_ceiling),
        concurrency_regions: Some(regions_ceiling),
        ..Overrides::default()
    };
    RunConfig::new(&Settings::default(), &overrides, None).expect("config")
}

/// Answers with a fixed marker per page file name, counting every
/// decode call.
struct PathStrategy {
    calls: AtomicUsize,
}

impl PathStrategy {
    fn new() -> Self {
        PathStrategy {
            calls: AtomicUsize::new(0),
        }
    }
}

impl DecoderStrategy for PathStrategy {
    fn decode(&self, image_path: &Path, _region: &Region) -> pdf_dicer::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = image_path.file_stem().unwrap().to_string_lossy().into_owned();
        Ok(Some(stem))
    }
}

/// Answers only when asked about the region with the given top inset.
struct RegionStrategy {
    answer_top: Dim,
    value: String,
}

impl DecoderStrategy for RegionStrategy {
    fn decode(&self, _image_path: &Path, region: &Region) -> pdf_dicer::Result<Option<String>> {
        if region.top == self.answer_top {
            Ok(Some(self.value.clone()))
        } else {
            Ok(None)
        }
    }
}

struct FailingStrategy;

impl DecoderStrategy for FailingStrategy {
    fn decode(&self, _image_path: &Path, _region: &Region) -> pdf_dicer::Result<Option<String>> {
        Err(DicerError::decoder_unavailable("engine missing"))
    }
}

#[derive(Default)]
struct Recorder {
    classified: Mutex<Vec<(usize, Option<String>)>>,
    accepted: Mutex<Vec<usize>>,
    rejected: Mutex<Vec<usize>>,
}

impl DicerEvents for &'static Recorder {
    fn on_page_classified(&self, page: &Page) {
        self.classified
            .lock()
            .unwrap()
            .push((page.index, page.marker.clone()));
    }

    fn on_marker_accepted(&self, page: &Page) {
        self.accepted.lock().unwrap().push(page.index);
    }

    fn on_marker_rejected(&self, page: &Page) {
        self.rejected.lock().unwrap().push(page.index);
    }
}

// ============================================================
// 1. Ordering under parallelism
// ============================================================

#[test]
fn test_parallel_classification_preserves_page_order() {
    let config = config_with(vec![region_with_top(0.0)], 4, 1);
    let strategy = PathStrategy::new();

    let pages = classify_pages(make_pages(20), &config, &strategy, &[]).expect("classify");

    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.index, i + 1);
        assert_eq!(page.marker.as_deref(), Some(format!("page-{}", i + 1).as_str()));
    }
}

#[test]
fn test_sequential_classification_matches_parallel() {
    let sequential = classify_pages(
        make_pages(8),
        &config_with(vec![region_with_top(0.0)], 1, 1),
        &PathStrategy::new(),
        &[],
    )
    .expect("sequential");
    let parallel = classify_pages(
        make_pages(8),
        &config_with(vec![region_with_top(0.0)], 0, 0),
        &PathStrategy::new(),
        &[],
    )
    .expect("parallel");
    assert_eq!(sequential, parallel);
}

// ============================================================
// 2. Region evaluation order
// ============================================================

#[test]
fn test_first_region_hit_short_circuits() {
    let config = config_with(vec![region_with_top(0.0), region_with_top(70.0)], 1, 1);
    let strategy = PathStrategy::new();

    let pages = classify_pages(make_pages(5), &config, &strategy, &[]).expect("classify");

    assert!(pages.iter().all(|p| p.marker.is_some()));
    // First region answered every time; the second was never consulted.
    assert_eq!(strategy.calls.load(Ordering::SeqCst), 5);
}

#[test]
fn test_later_region_answers_when_earlier_is_empty() {
    let config = config_with(vec![region_with_top(0.0), region_with_top(70.0)], 1, 1);
    let strategy = RegionStrategy {
        answer_top: Dim::Percent(70.0),
        value: "bottom-marker".into(),
    };

    let pages = classify_pages(make_pages(3), &config, &strategy, &[]).expect("classify");
    assert!(pages.iter().all(|p| p.marker.as_deref() == Some("bottom-marker")));
}

#[test]
fn test_configured_region_order_wins_under_region_parallelism() {
    let config = config_with(vec![region_with_top(0.0), region_with_top(70.0)], 1, 4);
    let strategy = RegionStrategy {
        answer_top: Dim::Percent(0.0),
        value: "top-marker".into(),
    };

    let pages = classify_pages(make_pages(3), &config, &strategy, &[]).expect("classify");
    assert!(pages.iter().all(|p| p.marker.as_deref() == Some("top-marker")));
}

#[test]
fn test_no_region_hit_leaves_marker_absent() {
    let config = config_with(vec![region_with_top(0.0)], 1, 1);
    let strategy = RegionStrategy {
        answer_top: Dim::Percent(99.0),
        value: "never".into(),
    };

    let pages = classify_pages(make_pages(3), &config, &strategy, &[]).expect("classify");
    assert!(pages.iter().all(|p| p.marker.is_none()));
}

// ============================================================
// 3. Failure propagation
// ============================================================

#[test]
fn test_decoder_unavailable_fails_classification() {
    let config = config_with(vec![region_with_top(0.0)], 2, 1);
    let result = classify_pages(make_pages(4), &config, &FailingStrategy, &[]);
    assert!(matches!(result, Err(DicerError::DecoderUnavailable(_))));
}

// ============================================================
// 4. Filter application
// ============================================================

#[test]
fn test_filter_rejection_clears_marker() {
    let recorder: &'static Recorder = Box::leak(Box::new(Recorder::default()));
    let listeners: Vec<Box<dyn DicerEvents>> = vec![Box::new(recorder)];

    let settings = Settings::default();
    let overrides = Overrides::default();
    let filter = std::sync::Arc::new(|page: &Page| {
        page.marker.as_deref().is_some_and(|m| m.starts_with("keep"))
    });
    let config = RunConfig::new(&settings, &overrides, Some(filter)).expect("config");

    let mut pages = make_pages(3);
    pages[0].marker = Some("keep-1".into());
    pages[1].marker = Some("drop-2".into());
    pages[2].marker = None;

    apply_filter(&mut pages, &config, &listeners);

    assert_eq!(pages[0].marker.as_deref(), Some("keep-1"));
    assert_eq!(pages[1].marker, None, "rejected marker becomes absent");
    assert_eq!(pages[2].marker, None);

    assert_eq!(*recorder.accepted.lock().unwrap(), vec![1]);
    // Page 3 decoded nothing; the predicate still ran and said no.
    assert_eq!(*recorder.rejected.lock().unwrap(), vec![2, 3]);
}

#[test]
fn test_filter_predicate_sees_unmarked_pages() {
    let recorder: &'static Recorder = Box::leak(Box::new(Recorder::default()));
    let listeners: Vec<Box<dyn DicerEvents>> = vec![Box::new(recorder)];

    let calls = std::sync::Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let filter = std::sync::Arc::new(move |_: &Page| {
        seen.fetch_add(1, Ordering::SeqCst);
        true
    });
    let config =
        RunConfig::new(&Settings::default(), &Overrides::default(), Some(filter)).expect("config");

    let mut pages = make_pages(3);
    pages[0].marker = Some("101-a".into());
    // Pages 2 and 3 never decoded a marker.

    apply_filter(&mut pages, &config, &listeners);

    assert_eq!(
        calls.load(Ordering::SeqCst),
        3,
        "every page reaches the predicate"
    );
    assert_eq!(*recorder.accepted.lock().unwrap(), vec![1, 2, 3]);
    // An accepting verdict does not invent a marker.
    assert_eq!(pages[1].marker, None);
    assert_eq!(pages[2].marker, None);
}

#[test]
fn test_no_filter_keeps_markers_untouched() {
    let config = config_with(vec![region_with_top(0.0)], 1, 1);
    let mut pages = make_pages(2);
    pages[0].marker = Some("101-a".into());

    apply_filter(&mut pages, &config, &[]);
    assert_eq!(pages[0].marker.as_deref(), Some("101-a"));
    assert_eq!(pages[1].marker, None);
}
