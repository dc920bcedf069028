//! The diff producer contract.
//!
//! The update orchestrator does not decide *what* changed; it consumes the
//! output of a [`Differ`] and decides *how* to apply it. `terrace-diff`
//! provides a baseline implementation; consumers with stronger requirements
//! (minimal move detection, heuristics tuned to their data) can substitute
//! their own.

use crate::changeset::StagedChangeset;
use crate::section::Section;

/// Produces a staged changeset transforming `source` into `target`.
///
/// # Contract
///
/// - Every stage must be atomically self-consistent: applying its edits as
///   one batch against the pre-stage snapshot yields exactly the stage's
///   `data`, with no ambiguous index collisions. Output should pass
///   [`StagedChangeset::verify`] against `source`.
/// - The final stage's `data` must equal `target`. The orchestrator installs
///   stage data into the adapter verbatim, so a divergent final stage would
///   leave the adapter disagreeing with the requested data.
/// - Identical snapshots must produce an empty sequence.
pub trait Differ: Send + Sync {
    /// Computes the staged changeset from `source` to `target`.
    fn diff(&self, source: &[Section], target: &[Section]) -> StagedChangeset;
}
