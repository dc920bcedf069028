//! Baseline diff producer for Terrace sectioned lists.
//!
//! This crate provides [`IdentityDiffer`], a conservative implementation of
//! [`terrace::Differ`]: comparisons are keyed on stable [`terrace::NodeId`]
//! identities, reorders degrade to delete + insert, and every emitted stage
//! carries a single kind of structural change. It trades edit minimality for
//! output that is self-consistent by construction, which is exactly what the
//! update orchestrator's strict batching needs.
//!
//! Consumers who need move detection or tighter diffs can implement
//! [`terrace::Differ`] themselves and plug it into
//! [`terrace::Updater::new`]; the orchestrator only requires that each stage
//! pass [`terrace::StagedChangeset::verify`].

mod differ;
mod lcs;

pub use differ::IdentityDiffer;
