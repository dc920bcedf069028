//! Staged changesets: atomic units of structural change between snapshots.
//!
//! A [`ChangesetStage`] is one atomic batch of structural edits together with
//! the snapshot that results from applying it. A [`StagedChangeset`] is an
//! ordered sequence of stages; applying them in order, one batch per stage,
//! transforms the prior snapshot into the final target snapshot. Later stages
//! assume earlier stages have already been applied.
//!
//! Stages are produced once by a diff producer, consumed exactly once by the
//! update orchestrator, and then discarded.
//!
//! # Index spaces
//!
//! Within one stage, deletes, reloads and move sources are expressed in the
//! pre-stage index space; inserts and move targets in the post-stage space.
//! Mixing these up is the classic way to desynchronize a stateful list
//! control, so [`ChangesetStage::verify`] checks every edit against the
//! running snapshot shape.

use std::collections::HashSet;

use crate::section::{ElementPath, Section};

/// A specialized `Result` for changeset verification.
pub type Result<T> = std::result::Result<T, ChangesetError>;

/// Violations of the per-stage self-consistency invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangesetError {
    /// The same section index appears twice within one edit category.
    #[error("duplicate section index {index} within one edit category")]
    DuplicateSection {
        /// The repeated index.
        index: usize,
    },

    /// The same element path appears twice within one edit category.
    #[error("duplicate element path {path:?} within one edit category")]
    DuplicateElement {
        /// The repeated path.
        path: ElementPath,
    },

    /// A section edit addresses an index outside its snapshot.
    #[error("section index {index} out of bounds for snapshot of {count} sections")]
    SectionOutOfBounds {
        /// The offending index.
        index: usize,
        /// Section count of the snapshot the edit is expressed against.
        count: usize,
    },

    /// An element edit addresses a path outside its snapshot.
    #[error("element path {path:?} out of bounds ({count} items in section)")]
    ElementOutOfBounds {
        /// The offending path.
        path: ElementPath,
        /// Item count of the addressed section, or 0 if the section itself
        /// is out of bounds.
        count: usize,
    },

    /// An element delete or reload targets a section deleted in the same
    /// stage.
    #[error("element edit {path:?} addresses a section deleted in the same stage")]
    ElementInDeletedSection {
        /// The offending path.
        path: ElementPath,
    },

    /// Section deletes and inserts do not account for the post-stage section
    /// count.
    #[error(
        "section cardinality mismatch: {before} sections - {deleted} deletes + {inserted} inserts != {after}"
    )]
    SectionCardinality {
        /// Pre-stage section count.
        before: usize,
        /// Number of section deletes.
        deleted: usize,
        /// Number of section inserts.
        inserted: usize,
        /// Post-stage section count.
        after: usize,
    },

    /// Element deletes and inserts do not account for a section's post-stage
    /// item count.
    #[error(
        "item cardinality mismatch in section {section}: {before} items - {deleted} deletes + {inserted} inserts != {after}"
    )]
    ElementCardinality {
        /// The section (shared pre/post index; only checked when the stage
        /// has no section-level changes).
        section: usize,
        /// Pre-stage item count.
        before: usize,
        /// Element deletes in the section.
        deleted: usize,
        /// Element inserts in the section.
        inserted: usize,
        /// Post-stage item count.
        after: usize,
    },

    /// A later stage in a sequence is inconsistent.
    #[error("stage {index}: {source}")]
    Stage {
        /// Position of the offending stage in the sequence.
        index: usize,
        /// The underlying violation.
        #[source]
        source: Box<ChangesetError>,
    },
}

/// The shape of a snapshot: per-section item counts.
///
/// Verification only needs cardinalities, not content, so stages are checked
/// against this reduced form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotShape {
    item_counts: Vec<usize>,
}

impl SnapshotShape {
    /// Derives the shape of a snapshot.
    pub fn of(sections: &[Section]) -> Self {
        Self {
            item_counts: sections.iter().map(Section::len).collect(),
        }
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.item_counts.len()
    }

    /// Item count of one section, or `None` if out of bounds.
    pub fn item_count(&self, section: usize) -> Option<usize> {
        self.item_counts.get(section).copied()
    }
}

/// One atomic, self-consistent batch of structural edits.
///
/// `data` is the snapshot that results from applying this stage; the update
/// orchestrator installs it into the adapter immediately before issuing the
/// stage's edits, so re-entrant count queries from the list control observe
/// post-stage data.
#[derive(Debug, Default)]
pub struct ChangesetStage {
    /// The snapshot after applying this stage.
    pub data: Vec<Section>,
    /// Deleted section indices (pre-stage space).
    pub section_deleted: Vec<usize>,
    /// Inserted section indices (post-stage space).
    pub section_inserted: Vec<usize>,
    /// Reloaded section indices (pre-stage space).
    pub section_updated: Vec<usize>,
    /// Section moves as (pre-stage from, post-stage to) pairs.
    pub section_moved: Vec<(usize, usize)>,
    /// Deleted element paths (pre-stage space).
    pub element_deleted: Vec<ElementPath>,
    /// Inserted element paths (post-stage space).
    pub element_inserted: Vec<ElementPath>,
    /// Reloaded element paths (pre-stage space).
    pub element_updated: Vec<ElementPath>,
    /// Element moves as (pre-stage from, post-stage to) pairs.
    pub element_moved: Vec<(ElementPath, ElementPath)>,
}

impl ChangesetStage {
    /// Creates a stage with no edits and the given post-stage snapshot.
    pub fn new(data: Vec<Section>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Total number of individual structural edits in this stage.
    ///
    /// Used purely as a cost heuristic for the animated-update ceiling.
    pub fn change_count(&self) -> usize {
        self.section_deleted.len()
            + self.section_inserted.len()
            + self.section_updated.len()
            + self.section_moved.len()
            + self.element_deleted.len()
            + self.element_inserted.len()
            + self.element_updated.len()
            + self.element_moved.len()
    }

    /// Returns `true` if the stage carries any structural edit.
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    /// Checks this stage's self-consistency against the pre-stage shape.
    ///
    /// On success returns the post-stage shape for checking the next stage.
    pub fn verify(&self, before: &SnapshotShape) -> Result<SnapshotShape> {
        let after = SnapshotShape::of(&self.data);

        Self::check_section_set(&self.section_deleted, before)?;
        Self::check_section_set(&self.section_updated, before)?;
        Self::check_section_set(&self.section_inserted, &after)?;
        for &(from, to) in &self.section_moved {
            Self::check_section_bounds(from, before)?;
            Self::check_section_bounds(to, &after)?;
        }

        let expected = before.section_count() - self.section_deleted.len()
            + self.section_inserted.len();
        if expected != after.section_count() {
            return Err(ChangesetError::SectionCardinality {
                before: before.section_count(),
                deleted: self.section_deleted.len(),
                inserted: self.section_inserted.len(),
                after: after.section_count(),
            });
        }

        let deleted_sections: HashSet<usize> = self.section_deleted.iter().copied().collect();
        Self::check_element_set(&self.element_deleted, before, &deleted_sections)?;
        Self::check_element_set(&self.element_updated, before, &deleted_sections)?;
        Self::check_element_set(&self.element_inserted, &after, &HashSet::new())?;
        for &(from, to) in &self.element_moved {
            Self::check_element_bounds(from, before)?;
            Self::check_element_bounds(to, &after)?;
        }

        // Per-section item arithmetic is only well-defined when section
        // indices are stable across the stage and no element crosses
        // sections.
        let sections_stable = self.section_deleted.is_empty()
            && self.section_inserted.is_empty()
            && self.section_moved.is_empty()
            && self.element_moved.is_empty();
        if sections_stable {
            let reloaded: HashSet<usize> = self.section_updated.iter().copied().collect();
            for section in 0..before.section_count() {
                if reloaded.contains(&section) {
                    continue;
                }
                let deleted = self
                    .element_deleted
                    .iter()
                    .filter(|p| p.section == section)
                    .count();
                let inserted = self
                    .element_inserted
                    .iter()
                    .filter(|p| p.section == section)
                    .count();
                let count_before = before.item_count(section).unwrap_or(0);
                let count_after = after.item_count(section).unwrap_or(0);
                if count_before - deleted + inserted != count_after {
                    return Err(ChangesetError::ElementCardinality {
                        section,
                        before: count_before,
                        deleted,
                        inserted,
                        after: count_after,
                    });
                }
            }
        }

        Ok(after)
    }

    fn check_section_bounds(index: usize, shape: &SnapshotShape) -> Result<()> {
        if index >= shape.section_count() {
            return Err(ChangesetError::SectionOutOfBounds {
                index,
                count: shape.section_count(),
            });
        }
        Ok(())
    }

    fn check_section_set(indices: &[usize], shape: &SnapshotShape) -> Result<()> {
        let mut seen = HashSet::with_capacity(indices.len());
        for &index in indices {
            Self::check_section_bounds(index, shape)?;
            if !seen.insert(index) {
                return Err(ChangesetError::DuplicateSection { index });
            }
        }
        Ok(())
    }

    fn check_element_bounds(path: ElementPath, shape: &SnapshotShape) -> Result<()> {
        let count = shape
            .item_count(path.section)
            .ok_or(ChangesetError::ElementOutOfBounds { path, count: 0 })?;
        if path.item >= count {
            return Err(ChangesetError::ElementOutOfBounds { path, count });
        }
        Ok(())
    }

    fn check_element_set(
        paths: &[ElementPath],
        shape: &SnapshotShape,
        deleted_sections: &HashSet<usize>,
    ) -> Result<()> {
        let mut seen = HashSet::with_capacity(paths.len());
        for &path in paths {
            if deleted_sections.contains(&path.section) {
                return Err(ChangesetError::ElementInDeletedSection { path });
            }
            Self::check_element_bounds(path, shape)?;
            if !seen.insert(path) {
                return Err(ChangesetError::DuplicateElement { path });
            }
        }
        Ok(())
    }
}

/// An ordered sequence of changeset stages.
///
/// An empty sequence means "no structural difference". Created per update
/// call and never persisted.
#[derive(Debug, Default)]
pub struct StagedChangeset {
    stages: Vec<ChangesetStage>,
}

impl StagedChangeset {
    /// Creates a sequence from stages, in application order.
    pub fn new(stages: Vec<ChangesetStage>) -> Self {
        Self { stages }
    }

    /// Creates an empty sequence (no structural difference).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if there is no structural difference.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// The stages, in application order.
    pub fn stages(&self) -> &[ChangesetStage] {
        &self.stages
    }

    /// Total change count across all stages.
    pub fn change_count(&self) -> usize {
        self.stages.iter().map(ChangesetStage::change_count).sum()
    }

    /// Checks every stage against the running shape, starting from `source`.
    pub fn verify(&self, source: &[Section]) -> Result<()> {
        let mut shape = SnapshotShape::of(source);
        for (index, stage) in self.stages.iter().enumerate() {
            shape = stage.verify(&shape).map_err(|source| ChangesetError::Stage {
                index,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}

impl From<Vec<ChangesetStage>> for StagedChangeset {
    fn from(stages: Vec<ChangesetStage>) -> Self {
        Self::new(stages)
    }
}

impl IntoIterator for StagedChangeset {
    type Item = ChangesetStage;
    type IntoIter = std::vec::IntoIter<ChangesetStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}
