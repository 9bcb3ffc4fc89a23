//! Size-controlled conversion
//!
//! A [`SizeBudget`] names a maximum output size, a [`QualityLadder`] of presets and the
//! endpoints to convert between. The [`QualityDegradationController`] tries the presets in
//! order and keeps the first output that fits.

mod budget;
mod controller;
mod ladder;
mod report;

pub use budget::{Endpoints, SizeBudget, SizeBudgetBuilder};
pub use controller::{EncodedArtifact, QualityDegradationController};
pub use ladder::QualityLadder;
pub use report::{BudgetOutcome, BudgetReport, TrialRecord};
