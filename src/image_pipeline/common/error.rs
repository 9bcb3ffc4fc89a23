use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input: {0}")]
    InputReadError(String),

    #[error("Failed to write output: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Failed to rasterize PDF: {0}")]
    RasterizeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Codec unavailable: no encoder registered for compression '{0}'")]
    CodecUnavailable(String),

    #[error("No pages to convert")]
    NoPages,

    #[error("All {attempts} quality presets failed to encode, last error: {last_error}")]
    AllPresetsFailed { attempts: usize, last_error: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Whether a failed size-control trial may move on to the next preset.
    ///
    /// Missing codecs, bad configuration and I/O failures abort the whole run.
    pub fn is_trial_recoverable(&self) -> bool {
        !matches!(
            self,
            ConversionError::CodecUnavailable(_)
                | ConversionError::InvalidConfig(_)
                | ConversionError::IoError(_)
                | ConversionError::InputReadError(_)
                | ConversionError::OutputWriteError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
