use thiserror::Error;

#[derive(Debug, Error)]
pub enum DicerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Decoder unavailable: {0}")]
    DecoderUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Extract error: {0}")]
    ExtractError(String),

    #[error("Range assembly error: {0}")]
    RangeAssemblyError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`DicerError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl DicerError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create an invalid input error.
    invalid_input => InvalidInput,
    /// Create a source not found error.
    source_not_found => SourceNotFound,
    /// Create an unknown profile error.
    unknown_profile => UnknownProfile,
    /// Create a decoder unavailable error.
    decoder_unavailable => DecoderUnavailable,
    /// Create a configuration error.
    config => ConfigError,
    /// Create a render error.
    render => RenderError,
    /// Create an extract error.
    extract => ExtractError,
    /// Create a range assembly error.
    range_assembly => RangeAssemblyError,
}

impl From<lopdf::Error> for DicerError {
    fn from(e: lopdf::Error) -> Self {
        Self::ExtractError(e.to_string())
    }
}

impl From<serde_yml::Error> for DicerError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<pdfium_render::prelude::PdfiumError> for DicerError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        Self::RenderError(e.to_string())
    }
}

impl From<image::ImageError> for DicerError {
    fn from(e: image::ImageError) -> Self {
        Self::RenderError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DicerError>;
