use tracing::{info, info_span, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::size_control::ladder::QualityLadder;
use crate::image_pipeline::size_control::report::{BudgetOutcome, BudgetReport, Timer, TrialRecord};

/// Output of one trial, tagged with the ladder index of the preset that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub preset_index: usize,
}

impl EncodedArtifact {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

enum TrialState {
    Pending,
    Trying(usize),
    Accepted(EncodedArtifact),
    Exhausted,
}

/// Walks a quality ladder until an encoding fits within `max_bytes`.
///
/// Trials run strictly in ladder order and the first fitting artifact wins, even if a
/// later preset would produce something smaller. When nothing fits, the output of the
/// last successful trial is returned as [`BudgetOutcome::Exhausted`].
#[derive(Debug, Clone, Copy)]
pub struct QualityDegradationController {
    max_bytes: u64,
}

impl QualityDegradationController {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Runs `encode` for each preset in order and returns the artifact to write.
    ///
    /// Recoverable trial errors skip to the next preset; other errors abort the run. If no
    /// trial produced output the run fails with [`ConversionError::AllPresetsFailed`].
    pub fn run<P, F>(&self, ladder: &QualityLadder<P>, mut encode: F) -> Result<(EncodedArtifact, BudgetReport)>
    where
        F: FnMut(&P) -> Result<Vec<u8>>,
    {
        let mut trials = Vec::with_capacity(ladder.len());
        let mut last_candidate: Option<EncodedArtifact> = None;
        let mut last_error: Option<String> = None;
        let mut state = TrialState::Pending;

        loop {
            state = match state {
                TrialState::Pending => TrialState::Trying(0),
                TrialState::Trying(index) => match ladder.get(index) {
                    None => TrialState::Exhausted,
                    Some(preset) => {
                        let _span = info_span!("size_trial", preset = index).entered();
                        let timer = Timer::start();
                        let result = encode(preset);
                        let duration = timer.stop();

                        match result {
                            Ok(bytes) => {
                                let artifact = EncodedArtifact {
                                    bytes,
                                    preset_index: index,
                                };
                                trials.push(TrialRecord {
                                    preset_index: index,
                                    size: Some(artifact.size()),
                                    duration,
                                    error: None,
                                });
                                info!(size = artifact.size(), max_bytes = self.max_bytes, "Trial encoded");

                                if artifact.size() <= self.max_bytes {
                                    TrialState::Accepted(artifact)
                                } else {
                                    last_candidate = Some(artifact);
                                    TrialState::Trying(index + 1)
                                }
                            }
                            Err(e) if e.is_trial_recoverable() => {
                                warn!(error = %e, "Trial failed, moving to next preset");
                                trials.push(TrialRecord {
                                    preset_index: index,
                                    size: None,
                                    duration,
                                    error: Some(e.to_string()),
                                });
                                last_error = Some(e.to_string());
                                TrialState::Trying(index + 1)
                            }
                            Err(e) => return Err(e),
                        }
                    }
                },
                TrialState::Accepted(artifact) => {
                    info!(preset = artifact.preset_index, size = artifact.size(), "Output fits the size budget");
                    let report = BudgetReport::new(
                        BudgetOutcome::Accepted,
                        artifact.preset_index,
                        artifact.size(),
                        self.max_bytes,
                        trials,
                    );
                    return Ok((artifact, report));
                }
                TrialState::Exhausted => {
                    return match last_candidate {
                        Some(artifact) => {
                            warn!(
                                preset = artifact.preset_index,
                                size = artifact.size(),
                                max_bytes = self.max_bytes,
                                "No preset fits the size budget, keeping the last attempt"
                            );
                            let report = BudgetReport::new(
                                BudgetOutcome::Exhausted,
                                artifact.preset_index,
                                artifact.size(),
                                self.max_bytes,
                                trials,
                            );
                            Ok((artifact, report))
                        }
                        None => Err(ConversionError::AllPresetsFailed {
                            attempts: ladder.len(),
                            last_error: last_error.unwrap_or_default(),
                        }),
                    };
                }
            };
        }
    }
}
