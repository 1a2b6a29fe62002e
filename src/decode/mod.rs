pub mod bardecode;
pub mod code128;
pub mod scanline;

use std::path::Path;

use crate::config::merged::{Driver, RunConfig};
use crate::config::region::Region;

pub use bardecode::BardecodeDecoder;
pub use scanline::ScanlineDecoder;

/// A pluggable marker decoder.
///
/// `decode` returns `Ok(Some(value))` when a marker was read inside
/// `region`, `Ok(None)` when none was found, and an error only when the
/// decoding backend itself cannot run. Such an error aborts the whole
/// run, it is not a per-page condition.
pub trait DecoderStrategy: Send + Sync {
    fn decode(&self, image_path: &Path, region: &Region) -> crate::error::Result<Option<String>>;
}

/// Build the decoder selected by the run configuration.
pub fn build_strategy(config: &RunConfig) -> Box<dyn DecoderStrategy> {
    match config.driver {
        Driver::Scanline => Box::new(ScanlineDecoder::new(config.scanline)),
        Driver::Bardecode => Box::new(BardecodeDecoder::new(config.bardecode.clone())),
    }
}
