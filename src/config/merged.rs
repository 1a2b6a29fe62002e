use std::sync::Arc;

use super::region::Region;
use super::settings::{BardecodeOptions, Concurrency, ScanlineOptions, Settings};
use crate::error::DicerError;
use crate::page::Page;

/// Which decoding backend a profile selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// In-process scanline analysis of the region pixels.
    Scanline,
    /// External decoding executable run against the whole page.
    Bardecode,
}

/// Page filter predicate, invoked once per classified page.
pub type PageFilter = Arc<dyn Fn(&Page) -> bool + Send + Sync>;

/// Per-call overrides, merged onto [`Settings`] to form a [`RunConfig`].
/// `Some` wins over the instance default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub regions: Option<Vec<Region>>,
    pub image_format: Option<String>,
    pub dpi: Option<u32>,
    pub concurrency_pages: Option<usize>,
    pub concurrency_regions: Option<usize>,
    pub bardecode: Option<BardecodeOptions>,
    pub scanline: Option<ScanlineOptions>,
    pub temp_prefix: Option<String>,
}

/// Map a profile name to its driver and default page image format.
/// Unrecognized names fail before any processing starts.
pub(crate) fn resolve_profile(name: &str) -> crate::error::Result<(Driver, &'static str)> {
    match name {
        "scanline" => Ok((Driver::Scanline, "png")),
        "bardecode" => Ok((Driver::Bardecode, "tif")),
        other => Err(DicerError::unknown_profile(other)),
    }
}

/// Immutable configuration snapshot for a single run.
///
/// Built once per `split()` call and shared read-only across concurrent
/// page and region tasks.
#[derive(Clone)]
pub struct RunConfig {
    pub driver: Driver,
    pub regions: Vec<Region>,
    pub image_format: String,
    pub dpi: u32,
    pub concurrency: Concurrency,
    pub bardecode: BardecodeOptions,
    pub scanline: ScanlineOptions,
    pub temp_prefix: String,
    pub filter: Option<PageFilter>,
}

impl RunConfig {
    /// Merge overrides onto settings. Override values win where present;
    /// the selected profile decides the driver and, unless overridden,
    /// the page image format.
    pub fn new(
        settings: &Settings,
        overrides: &Overrides,
        filter: Option<PageFilter>,
    ) -> crate::error::Result<Self> {
        let profile = overrides.profile.as_deref().unwrap_or(&settings.profile);
        let (driver, profile_format) = resolve_profile(profile)?;

        Ok(RunConfig {
            driver,
            regions: overrides
                .regions
                .clone()
                .unwrap_or_else(|| settings.regions.clone()),
            image_format: overrides
                .image_format
                .clone()
                .or_else(|| settings.image_format.clone())
                .unwrap_or_else(|| profile_format.to_owned()),
            dpi: overrides.dpi.unwrap_or(settings.dpi),
            concurrency: Concurrency {
                pages: overrides
                    .concurrency_pages
                    .unwrap_or(settings.concurrency.pages),
                regions: overrides
                    .concurrency_regions
                    .unwrap_or(settings.concurrency.regions),
            },
            bardecode: overrides
                .bardecode
                .clone()
                .unwrap_or_else(|| settings.bardecode.clone()),
            scanline: overrides.scanline.unwrap_or(settings.scanline),
            temp_prefix: overrides
                .temp_prefix
                .clone()
                .unwrap_or_else(|| settings.temp_prefix.clone()),
            filter,
        })
    }
}
