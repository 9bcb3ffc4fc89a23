//! Size budget configuration and its source/destination endpoints

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::size_control::ladder::QualityLadder;

/// Where a budgeted conversion reads from and writes to
pub enum Endpoints<'a> {
    Files {
        source: PathBuf,
        destination: PathBuf,
    },
    Streams {
        source: Box<dyn Read + 'a>,
        destination: Box<dyn Write + 'a>,
    },
}

impl Endpoints<'_> {
    /// Reads the whole source into memory.
    pub fn read_source(&mut self) -> Result<Vec<u8>> {
        match self {
            Endpoints::Files { source, .. } => std::fs::read(&*source).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", source.display(), e))
            }),
            Endpoints::Streams { source, .. } => {
                let mut data = Vec::new();
                source.read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }

    /// Writes `bytes` to the destination. Destination files are only created here.
    pub fn write_destination(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Endpoints::Files { destination, .. } => {
                let mut file = File::create(&*destination).map_err(|e| {
                    ConversionError::OutputWriteError(format!("{}: {}", destination.display(), e))
                })?;
                file.write_all(bytes).map_err(|e| {
                    ConversionError::OutputWriteError(format!("{}: {}", destination.display(), e))
                })?;
                file.flush()?;
            }
            Endpoints::Streams { destination, .. } => {
                destination.write_all(bytes)?;
                destination.flush()?;
            }
        }
        debug!(bytes = bytes.len(), "Destination written");
        Ok(())
    }
}

impl std::fmt::Debug for Endpoints<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoints::Files {
                source,
                destination,
            } => f
                .debug_struct("Files")
                .field("source", source)
                .field("destination", destination)
                .finish(),
            Endpoints::Streams { .. } => f.write_str("Streams"),
        }
    }
}

/// A maximum output size, the presets to search and the endpoints to convert between.
///
/// `max_bytes` is advisory: when no preset fits, the last preset's output is written anyway.
#[derive(Debug)]
pub struct SizeBudget<'a, P> {
    pub max_bytes: u64,
    pub ladder: QualityLadder<P>,
    pub endpoints: Endpoints<'a>,
}

impl<'a, P> SizeBudget<'a, P> {
    pub fn builder() -> SizeBudgetBuilder<'a, P> {
        SizeBudgetBuilder::default()
    }

    pub fn into_parts(self) -> (u64, QualityLadder<P>, Endpoints<'a>) {
        (self.max_bytes, self.ladder, self.endpoints)
    }
}

/// Builder for SizeBudget
pub struct SizeBudgetBuilder<'a, P> {
    max_bytes: Option<u64>,
    presets: Vec<P>,
    files: Option<(PathBuf, PathBuf)>,
    streams: Option<(Box<dyn Read + 'a>, Box<dyn Write + 'a>)>,
}

impl<P> Default for SizeBudgetBuilder<'_, P> {
    fn default() -> Self {
        Self {
            max_bytes: None,
            presets: Vec::new(),
            files: None,
            streams: None,
        }
    }
}

impl<'a, P> SizeBudgetBuilder<'a, P> {
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Appends one preset to the ladder.
    pub fn preset(mut self, preset: P) -> Self {
        self.presets.push(preset);
        self
    }

    /// Replaces the ladder.
    pub fn ladder(mut self, ladder: QualityLadder<P>) -> Self {
        self.presets = ladder.into_presets();
        self
    }

    pub fn file_pair(mut self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        self.files = Some((source.into(), destination.into()));
        self
    }

    pub fn stream_pair(mut self, source: impl Read + 'a, destination: impl Write + 'a) -> Self {
        self.streams = Some((Box::new(source), Box::new(destination)));
        self
    }

    pub fn build(self) -> Result<SizeBudget<'a, P>> {
        let max_bytes = self.max_bytes.ok_or_else(|| {
            ConversionError::InvalidConfig("size budget requires max_bytes".to_string())
        })?;
        let ladder = QualityLadder::new(self.presets)?;

        let endpoints = match (self.files, self.streams) {
            (Some((source, destination)), None) => Endpoints::Files {
                source,
                destination,
            },
            (None, Some((source, destination))) => Endpoints::Streams {
                source,
                destination,
            },
            (Some(_), Some(_)) => {
                return Err(ConversionError::InvalidConfig(
                    "size budget takes either a file pair or a stream pair, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConversionError::InvalidConfig(
                    "size budget requires a file pair or a stream pair".to_string(),
                ));
            }
        };

        Ok(SizeBudget {
            max_bytes,
            ladder,
            endpoints,
        })
    }
}
