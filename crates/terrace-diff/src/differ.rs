//! The baseline identity-keyed diff producer.

use terrace::{
    AnyComponent, Cell, ChangesetStage, Differ, ElementPath, NodeId, Section, StagedChangeset,
};

use crate::lcs::longest_common_subsequence;

/// A conservative [`Differ`] keyed on [`NodeId`] identity.
///
/// Matches sections and cells by the longest common subsequence of their
/// ids, so reorders degrade to delete + insert and moves are never emitted.
/// The output is at most three stages, each carrying a single kind of
/// structural change and therefore trivially self-consistent:
///
/// 1. **content**: section reloads for surviving sections whose header or
///    footer changed, element reloads for surviving cells whose component
///    reports a content update;
/// 2. **deletes**: sections and cells that do not survive, in source index
///    space;
/// 3. **inserts**: sections and cells new in the target, in target index
///    space.
///
/// Empty stages are omitted; identical snapshots produce an empty sequence.
/// The final emitted stage always carries the target snapshot verbatim.
#[derive(Debug, Default)]
pub struct IdentityDiffer;

impl IdentityDiffer {
    /// Creates the differ.
    pub fn new() -> Self {
        Self
    }
}

impl Differ for IdentityDiffer {
    fn diff(&self, source: &[Section], target: &[Section]) -> StagedChangeset {
        let source_ids: Vec<&NodeId> = source.iter().map(Section::id).collect();
        let target_ids: Vec<&NodeId> = target.iter().map(Section::id).collect();
        let kept = longest_common_subsequence(&source_ids, &target_ids);

        let mut update = ChangesetStage::default();
        let mut delete = ChangesetStage::default();
        let mut insert = ChangesetStage::default();

        // Content stage data: source with surviving content refreshed.
        let mut content: Vec<Section> = source.to_vec();
        // Cells of each surviving section that themselves survive, keyed by
        // source section index. Sections reloaded wholesale are absent.
        let mut kept_cells: Vec<(usize, Vec<usize>)> = Vec::with_capacity(kept.len());

        for &(si, ti) in &kept {
            let s = &source[si];
            let t = &target[ti];

            if supplementary_changed(s.header(), t.header())
                || supplementary_changed(s.footer(), t.footer())
            {
                // A header/footer change reloads the whole section; its
                // cells need no separate reconciliation.
                update.section_updated.push(si);
                content[si] = t.clone();
                continue;
            }

            let s_item_ids: Vec<&NodeId> = s.cells().iter().map(Cell::id).collect();
            let t_item_ids: Vec<&NodeId> = t.cells().iter().map(Cell::id).collect();
            let item_kept = longest_common_subsequence(&s_item_ids, &t_item_ids);

            let mut cells: Vec<Cell> = s.cells().to_vec();
            for &(s_idx, t_idx) in &item_kept {
                let next = t.cells()[t_idx].component();
                if cells[s_idx].component().should_content_update(next) {
                    update.element_updated.push(ElementPath::new(si, s_idx));
                    cells[s_idx] = t.cells()[t_idx].clone();
                }
            }
            content[si] = s.clone().with_cells(cells);

            let surviving: Vec<usize> = item_kept.iter().map(|&(s_idx, _)| s_idx).collect();
            for s_idx in 0..s.len() {
                if !surviving.contains(&s_idx) {
                    delete.element_deleted.push(ElementPath::new(si, s_idx));
                }
            }
            let surviving_target: Vec<usize> = item_kept.iter().map(|&(_, t_idx)| t_idx).collect();
            for t_idx in 0..t.len() {
                if !surviving_target.contains(&t_idx) {
                    insert.element_inserted.push(ElementPath::new(ti, t_idx));
                }
            }
            kept_cells.push((si, surviving));
        }

        let kept_source: Vec<usize> = kept.iter().map(|&(si, _)| si).collect();
        for si in 0..source.len() {
            if !kept_source.contains(&si) {
                delete.section_deleted.push(si);
            }
        }
        let kept_target: Vec<usize> = kept.iter().map(|&(_, ti)| ti).collect();
        for ti in 0..target.len() {
            if !kept_target.contains(&ti) {
                insert.section_inserted.push(ti);
            }
        }

        // Delete stage data: the content snapshot minus everything deleted.
        let deleted_sections = &delete.section_deleted;
        let mut survived: Vec<Section> = Vec::with_capacity(kept.len());
        for (si, section) in content.iter().enumerate() {
            if deleted_sections.contains(&si) {
                continue;
            }
            match kept_cells.iter().find(|(index, _)| *index == si) {
                Some((_, surviving)) => {
                    let cells: Vec<Cell> = surviving
                        .iter()
                        .map(|&s_idx| section.cells()[s_idx].clone())
                        .collect();
                    survived.push(section.clone().with_cells(cells));
                }
                // Reloaded wholesale in the content stage.
                None => survived.push(section.clone()),
            }
        }

        update.data = content;
        delete.data = survived;
        insert.data = target.to_vec();

        let mut stages: Vec<ChangesetStage> = [update, delete, insert]
            .into_iter()
            .filter(ChangesetStage::has_changes)
            .collect();
        if let Some(last) = stages.last_mut() {
            // The orchestrator installs the final stage's data verbatim; it
            // must be the requested target.
            last.data = target.to_vec();
        }

        let staged = StagedChangeset::new(stages);
        tracing::debug!(
            target: "terrace_diff",
            stages = staged.len(),
            changes = staged.change_count(),
            "computed staged changeset"
        );
        debug_assert!(
            staged.verify(source).is_ok(),
            "identity differ produced an inconsistent changeset"
        );
        staged
    }
}

fn supplementary_changed(prev: Option<&AnyComponent>, next: Option<&AnyComponent>) -> bool {
    match (prev, next) {
        (None, None) => false,
        (Some(prev), Some(next)) => prev.should_content_update(next),
        _ => true,
    }
}
