//! Declarative sectioned lists for stateful list controls.
//!
//! Terrace reconciles an immutable description of a scrollable
//! list-of-sections data model with a long-lived, stateful visual list
//! control, applying only the minimal structural edits (insert / delete /
//! move / update, at section and item granularity) needed to bring the
//! control into agreement with new data, while preserving animation
//! continuity, scroll position, and on-screen rendering correctness.
//!
//! # Core Types
//!
//! - [`Section`] / [`Cell`] / [`AnyComponent`]: the immutable data model
//! - [`ChangesetStage`] / [`StagedChangeset`]: atomic batches of structural
//!   edits between snapshots, produced by a [`Differ`]
//! - [`Adapter`]: owner of the currently-rendered snapshot
//! - [`SectionedView`]: the stateful list control contract
//! - [`Updater`]: the update orchestrator
//!
//! # Data Flow
//!
//! ```text
//! new data ──> Differ ──> StagedChangeset ──┐
//!                                           v
//!                 ┌─────────┐  batches  ┌───────────────┐
//!                 │ Updater │──────────>│ SectionedView │
//!                 └─────────┘           └───────────────┘
//!                      │ lock-step           ^ queries
//!                      v                     │
//!                 ┌─────────────────────────────┐
//!                 │      Adapter (snapshot)     │
//!                 └─────────────────────────────┘
//! ```
//!
//! The orchestrator applies each stage as one atomic batch, installing the
//! stage's post-stage snapshot into the adapter immediately before issuing
//! the matching edits, then re-renders visible elements and restores the
//! scroll offset if configured.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use terrace::{SectionedAdapter, SectionsBuilder, Updater};
//!
//! let adapter = Arc::new(SectionedAdapter::new());
//! let updater = Updater::new(Arc::new(terrace_diff::IdentityDiffer::new()));
//! updater.prepare(&mut list_control, adapter.clone());
//!
//! let sections = SectionsBuilder::new()
//!     .append_all(groups.iter().map(group_section))
//!     .build();
//! updater.perform_updates(&mut list_control, adapter.as_ref(), sections, || {
//!     tracing::debug!("update finished");
//! });
//! ```
//!
//! # Logging
//!
//! Terrace instruments its decisions with the `tracing` crate; install a
//! subscriber (for example `tracing_subscriber::fmt::init()`) to see them.
//! See [`targets`] for per-subsystem filter names.

mod adapter;
mod builder;
mod changeset;
mod component;
mod diff;
mod section;
mod updater;
mod view;

pub use adapter::{Adapter, SectionedAdapter};
pub use builder::{CellsBuilder, SectionsBuilder};
pub use changeset::{ChangesetError, ChangesetStage, Result, SnapshotShape, StagedChangeset};
pub use component::{AnyComponent, Component, RenderTarget};
pub use diff::Differ;
pub use section::{Cell, ElementKind, ElementPath, NodeId, Section};
pub use updater::{Completion, Updater, UpdaterConfig};
pub use view::{Offset, SectionedView};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Update orchestrator decisions and stage application.
    pub const UPDATER: &str = "terrace::updater";
    /// Adapter snapshot replacement.
    pub const ADAPTER: &str = "terrace::adapter";
}
