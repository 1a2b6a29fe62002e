use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use tracing::warn;

use super::DecoderStrategy;
use crate::config::region::Region;
use crate::config::settings::BardecodeOptions;
use crate::error::DicerError;

/// External-process decoder.
///
/// The executable decodes the whole page image, so region restriction is
/// not supported at this layer. The region loop still runs, but results
/// are memoized per image path: only one subprocess is spawned per page
/// and the remaining region evaluations replay the cached answer.
pub struct BardecodeDecoder {
    options: BardecodeOptions,
    cache: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl BardecodeDecoder {
    pub fn new(options: BardecodeOptions) -> Self {
        BardecodeDecoder {
            options,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Invoke `<bin> <imagePath> [-K <serial>]` and parse its
    /// newline-delimited output.
    fn run(&self, image_path: &Path) -> crate::error::Result<Option<String>> {
        let mut command = Command::new(&self.options.bin);
        command.arg(image_path);
        if !self.options.serial.is_empty() {
            command.arg("-K").arg(&self.options.serial);
        }

        let output = command.output().map_err(|e| {
            DicerError::decoder_unavailable(format!(
                "failed to invoke {}: {e}",
                self.options.bin.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim().is_empty() {
                // Non-zero exit with no diagnostics means "no code found".
                return Ok(None);
            }
            return Err(DicerError::decoder_unavailable(format!(
                "{} exited with {}: {}",
                self.options.bin.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = stdout
            .lines()
            .filter(|line| !line.starts_with("EVALUATION MODE"))
            .map(|line| line.trim_end_matches('\r'))
            .find(|line| !line.is_empty())
            .map(str::to_owned);

        if self.options.check_evaluation
            && let Some(v) = &value
            && v.ends_with("???")
        {
            warn!(
                value = v.as_str(),
                "evaluation decoder build: trailing characters of the marker are masked"
            );
        }

        Ok(value)
    }
}

impl DecoderStrategy for BardecodeDecoder {
    fn decode(&self, image_path: &Path, _region: &Region) -> crate::error::Result<Option<String>> {
        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = cache.get(image_path) {
                return Ok(cached.clone());
            }
        }

        let value = self.run(image_path)?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(image_path.to_path_buf(), value.clone());
        Ok(value)
    }
}
