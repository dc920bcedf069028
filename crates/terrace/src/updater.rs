//! The update orchestrator.
//!
//! [`Updater`] decides how and when a precomputed staged changeset is applied
//! to a stateful list control: full-reload fallback for off-screen targets
//! and oversized diffs, animation gating against the user's scroll state,
//! per-stage atomic batches with the adapter snapshot mutated in lock-step,
//! post-update re-rendering of visible elements, and scroll-offset
//! preservation.
//!
//! The hard invariant is that the adapter's snapshot and the control's
//! structural state must never disagree: the control is strict about the
//! before/after cardinality of an atomic batch, and a mismatch is fatal at
//! its next layout pass. The orchestrator prevents this by construction:
//! each stage's post-stage snapshot is installed into the adapter inside the
//! open batch, immediately before the stage's edits are issued, so any
//! re-entrant count query from the control observes post-stage data.
//!
//! Updates must be issued one at a time per target. This type does not
//! serialize concurrent [`perform_updates`](Updater::perform_updates) calls;
//! issuing a second update before the first's completion has fired is
//! undefined with respect to snapshot consistency.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::adapter::Adapter;
use crate::changeset::{ChangesetStage, StagedChangeset};
use crate::diff::Differ;
use crate::section::Section;
use crate::view::SectionedView;

/// A one-shot callback fired when an update's visual work has finished.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Policy knobs for the update orchestrator.
///
/// An explicit caller-supplied struct; there are no ambient mutable
/// defaults.
#[derive(Clone, Debug)]
pub struct UpdaterConfig {
    /// Present structural edits with animation. Default `true`.
    pub animation_enabled: bool,
    /// Keep animating even while the user is interactively scrolling.
    /// Default `true`.
    pub animation_enabled_while_scrolling: bool,
    /// Re-render currently visible elements after every update. Default
    /// `true`.
    pub always_render_visible_after_update: bool,
    /// Restore the pre-update scroll offset after batched edits (skipped
    /// while the user is interactively scrolling). Default `false`.
    pub keeps_scroll_offset: bool,
    /// Maximum total change count applied as animated batches; beyond it the
    /// update degrades to one full reload. Default `300`.
    pub animatable_change_ceiling: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            animation_enabled: true,
            animation_enabled_while_scrolling: true,
            always_render_visible_after_update: true,
            keeps_scroll_offset: false,
            animatable_change_ceiling: 300,
        }
    }
}

/// Applies staged changesets to a [`SectionedView`], keeping the adapter's
/// snapshot and the control's structural state in agreement.
pub struct Updater {
    config: UpdaterConfig,
    differ: Arc<dyn Differ>,
}

impl Updater {
    /// Creates an updater with the default configuration.
    pub fn new(differ: Arc<dyn Differ>) -> Self {
        Self::with_config(differ, UpdaterConfig::default())
    }

    /// Creates an updater with an explicit configuration.
    pub fn with_config(differ: Arc<dyn Differ>, config: UpdaterConfig) -> Self {
        Self { config, differ }
    }

    /// The active configuration.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Wires `adapter` as the control's sole data collaborator and forces a
    /// full reload and layout invalidation.
    ///
    /// Afterwards the control reflects the adapter's current (possibly
    /// empty) snapshot.
    pub fn prepare(&self, view: &mut dyn SectionedView, adapter: Arc<dyn Adapter>) {
        view.bind_adapter(adapter);
        view.reload_data();
        view.invalidate_layout();
    }

    /// Brings the control's displayed state into agreement with `data`.
    ///
    /// Off-screen targets skip diffing entirely: the snapshot is replaced and
    /// the control fully reloaded, since animating a control that is not
    /// part of an active display hierarchy wastes work and risks applying
    /// edits against stale layout state. On-screen targets go through the
    /// differ and [`perform_differential_updates`](Self::perform_differential_updates).
    ///
    /// `completion` fires exactly once, after all visual work (including
    /// batch animations) has finished.
    pub fn perform_updates(
        &self,
        view: &mut dyn SectionedView,
        adapter: &dyn Adapter,
        data: Vec<Section>,
        completion: impl FnOnce() + Send + 'static,
    ) {
        if !view.is_attached() {
            tracing::debug!(target: "terrace::updater", "target detached from display hierarchy, reloading without diffing");
            adapter.replace_snapshot(data);
            view.reload_data();
            completion();
            return;
        }

        let source = adapter.snapshot();
        let staged = self.differ.diff(&source, &data);
        self.perform_differential_updates(view, adapter, data, staged, completion);
    }

    /// Applies a precomputed staged changeset.
    ///
    /// `staged` must have been computed from the adapter's current snapshot
    /// to `data`; in particular the final stage's `data` must equal `data`
    /// (see the [`Differ`] contract). Checked against
    /// [`StagedChangeset::verify`] in debug builds.
    pub fn perform_differential_updates(
        &self,
        view: &mut dyn SectionedView,
        adapter: &dyn Adapter,
        data: Vec<Section>,
        staged: StagedChangeset,
        completion: impl FnOnce() + Send + 'static,
    ) {
        if staged.is_empty() {
            adapter.replace_snapshot(data);
            if self.config.always_render_visible_after_update {
                self.render_visible_components(view, adapter);
            }
            completion();
            return;
        }

        let total = staged.change_count();
        if total > self.config.animatable_change_ceiling {
            tracing::debug!(
                target: "terrace::updater",
                total,
                ceiling = self.config.animatable_change_ceiling,
                "change volume exceeds ceiling, falling back to full reload"
            );
            adapter.replace_snapshot(data);
            view.reload_data();
            completion();
            return;
        }

        #[cfg(debug_assertions)]
        if let Err(err) = staged.verify(&adapter.snapshot()) {
            panic!("diff producer emitted an inconsistent staged changeset: {err}");
        }

        let animated = self.config.animation_enabled
            && (self.config.animation_enabled_while_scrolling
                || !view.is_interactively_scrolling());
        let offset = view.content_offset();
        let group = CompletionGroup::new(Box::new(completion));

        tracing::debug!(
            target: "terrace::updater",
            stages = staged.len(),
            total,
            animated,
            "applying staged changeset"
        );

        for stage in staged {
            tracing::trace!(target: "terrace::updater", changes = stage.change_count(), "applying stage");
            view.begin_batch(animated);

            let ChangesetStage {
                data,
                section_deleted,
                section_inserted,
                section_updated,
                section_moved,
                element_deleted,
                element_inserted,
                element_updated,
                element_moved,
            } = stage;

            // The snapshot must change first: the control may re-query
            // counts synchronously while the batch is applied.
            adapter.replace_snapshot(data);

            if !section_deleted.is_empty() {
                view.delete_sections(&section_deleted);
            }
            if !section_inserted.is_empty() {
                view.insert_sections(&section_inserted);
            }
            if !section_updated.is_empty() {
                view.reload_sections(&section_updated);
            }
            for (from, to) in section_moved {
                view.move_section(from, to);
            }
            if !element_deleted.is_empty() {
                view.delete_elements(&element_deleted);
            }
            if !element_inserted.is_empty() {
                view.insert_elements(&element_inserted);
            }
            if !element_updated.is_empty() {
                view.reload_elements(&element_updated);
            }
            for (from, to) in element_moved {
                view.move_element(from, to);
            }

            view.commit_batch(group.enter());
        }

        if self.config.always_render_visible_after_update {
            self.render_visible_components(view, adapter);
        }
        if self.config.keeps_scroll_offset && !view.is_interactively_scrolling() {
            view.set_content_offset(offset);
        }

        group.finish();
    }

    /// Re-renders every currently visible supplementary element and item
    /// from the adapter's latest snapshot, without animation.
    ///
    /// A structural edit can shift which data backs an on-screen element
    /// without destroying the element; this pass guarantees visible content
    /// matches the snapshot even then. Elements that do not support the
    /// render contract are skipped.
    pub fn render_visible_components(&self, view: &mut dyn SectionedView, adapter: &dyn Adapter) {
        for kind in adapter.registered_kinds() {
            for path in view.visible_supplementary_paths(&kind) {
                let Some(component) = adapter.supplementary_component(&kind, path) else {
                    continue;
                };
                if let Some(target) = view.supplementary_target(&kind, path) {
                    target.apply(&component);
                }
            }
        }
        for path in view.visible_element_paths() {
            let Some(component) = adapter.item_component(path) else {
                continue;
            };
            if let Some(target) = view.element_target(path) {
                target.apply(&component);
            }
        }
    }
}

/// Tracks outstanding batch-animation callbacks and fires one wrapped
/// completion exactly once when the last of them resolves.
///
/// Shaped like a dispatch group: each batch takes an [`enter`](Self::enter)
/// token as its commit callback, and [`finish`](Self::finish) seals the
/// group once all batches have been issued. Whichever of "last token
/// resolves" and "group sealed" happens second fires the completion.
struct CompletionGroup {
    state: Arc<Mutex<GroupState>>,
}

struct GroupState {
    pending: usize,
    sealed: bool,
    completion: Option<Completion>,
}

impl CompletionGroup {
    fn new(completion: Completion) -> Self {
        Self {
            state: Arc::new(Mutex::new(GroupState {
                pending: 0,
                sealed: false,
                completion: Some(completion),
            })),
        }
    }

    /// Registers one outstanding batch; the returned token must be invoked
    /// when that batch's animation finishes.
    fn enter(&self) -> Completion {
        self.state.lock().pending += 1;
        let state = Arc::clone(&self.state);
        Box::new(move || {
            let completion = {
                let mut state = state.lock();
                state.pending -= 1;
                if state.sealed && state.pending == 0 {
                    state.completion.take()
                } else {
                    None
                }
            };
            if let Some(completion) = completion {
                completion();
            }
        })
    }

    /// Seals the group. Fires the completion immediately if every token has
    /// already resolved (including the zero-token case).
    fn finish(self) {
        let completion = {
            let mut state = self.state.lock();
            state.sealed = true;
            if state.pending == 0 {
                state.completion.take()
            } else {
                None
            }
        };
        if let Some(completion) = completion {
            completion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SectionedAdapter;
    use crate::component::{AnyComponent, Component, RenderTarget};
    use crate::section::{Cell, ElementKind, ElementPath};
    use crate::view::Offset;
    use std::any::Any;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Text(&'static str);

    impl Component for Text {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn should_content_update(&self, next: &dyn Component) -> bool {
            next.as_any().downcast_ref::<Text>() != Some(self)
        }
    }

    fn section(id: i64, items: &[(i64, &'static str)]) -> Section {
        Section::new(id).with_cells(items.iter().map(|&(id, text)| Cell::new(id, Text(text))))
    }

    fn ids(sections: &[Section]) -> Vec<Vec<i64>> {
        sections
            .iter()
            .map(|s| {
                s.cells()
                    .iter()
                    .map(|c| match c.id() {
                        crate::section::NodeId::Int(n) => *n,
                        crate::section::NodeId::Text(_) => panic!("int ids only"),
                    })
                    .collect()
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Test doubles
    // ---------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        BindAdapter,
        ReloadData,
        InvalidateLayout,
        BeginBatch { animated: bool },
        DeleteSections(Vec<usize>),
        InsertSections(Vec<usize>),
        ReloadSections(Vec<usize>),
        MoveSection(usize, usize),
        DeleteElements(Vec<ElementPath>),
        InsertElements(Vec<ElementPath>),
        ReloadElements(Vec<ElementPath>),
        MoveElement(ElementPath, ElementPath),
        CommitBatch,
        SetOffset(Offset),
    }

    #[derive(Default)]
    struct Probe {
        applied: Vec<&'static str>,
    }

    impl RenderTarget for Probe {
        fn apply(&mut self, component: &AnyComponent) {
            self.applied
                .push(component.downcast_ref::<Text>().map_or("?", |t| t.0));
        }
    }

    /// Recording stand-in for a real list control. Optionally defers batch
    /// completions to model in-flight animations.
    struct MockView {
        attached: bool,
        scrolling: bool,
        offset: Offset,
        events: Vec<ViewEvent>,
        visible: Vec<ElementPath>,
        visible_headers: Vec<ElementPath>,
        targets: HashMap<ElementPath, Probe>,
        header_targets: HashMap<ElementPath, Probe>,
        defer_completions: bool,
        pending: Vec<Completion>,
    }

    impl MockView {
        fn new() -> Self {
            Self {
                attached: true,
                scrolling: false,
                offset: Offset::default(),
                events: Vec::new(),
                visible: Vec::new(),
                visible_headers: Vec::new(),
                targets: HashMap::new(),
                header_targets: HashMap::new(),
                defer_completions: false,
                pending: Vec::new(),
            }
        }

        /// Resolves deferred batch completions, as if animations finished.
        fn finish_animations(&mut self) {
            for completion in self.pending.drain(..) {
                completion();
            }
        }

        fn batch_count(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, ViewEvent::CommitBatch))
                .count()
        }
    }

    impl SectionedView for MockView {
        fn bind_adapter(&mut self, _adapter: Arc<dyn Adapter>) {
            self.events.push(ViewEvent::BindAdapter);
        }

        fn is_attached(&self) -> bool {
            self.attached
        }

        fn reload_data(&mut self) {
            self.events.push(ViewEvent::ReloadData);
        }

        fn invalidate_layout(&mut self) {
            self.events.push(ViewEvent::InvalidateLayout);
        }

        fn begin_batch(&mut self, animated: bool) {
            self.events.push(ViewEvent::BeginBatch { animated });
        }

        fn delete_sections(&mut self, indices: &[usize]) {
            self.events.push(ViewEvent::DeleteSections(indices.to_vec()));
        }

        fn insert_sections(&mut self, indices: &[usize]) {
            self.events.push(ViewEvent::InsertSections(indices.to_vec()));
        }

        fn reload_sections(&mut self, indices: &[usize]) {
            self.events.push(ViewEvent::ReloadSections(indices.to_vec()));
        }

        fn move_section(&mut self, from: usize, to: usize) {
            self.events.push(ViewEvent::MoveSection(from, to));
        }

        fn delete_elements(&mut self, paths: &[ElementPath]) {
            self.events.push(ViewEvent::DeleteElements(paths.to_vec()));
        }

        fn insert_elements(&mut self, paths: &[ElementPath]) {
            self.events.push(ViewEvent::InsertElements(paths.to_vec()));
        }

        fn reload_elements(&mut self, paths: &[ElementPath]) {
            self.events.push(ViewEvent::ReloadElements(paths.to_vec()));
        }

        fn move_element(&mut self, from: ElementPath, to: ElementPath) {
            self.events.push(ViewEvent::MoveElement(from, to));
        }

        fn commit_batch(&mut self, completion: Box<dyn FnOnce() + Send>) {
            self.events.push(ViewEvent::CommitBatch);
            if self.defer_completions {
                self.pending.push(completion);
            } else {
                completion();
            }
        }

        fn visible_element_paths(&self) -> Vec<ElementPath> {
            self.visible.clone()
        }

        fn visible_supplementary_paths(&self, kind: &ElementKind) -> Vec<ElementPath> {
            if kind == &ElementKind::Header {
                self.visible_headers.clone()
            } else {
                Vec::new()
            }
        }

        fn element_target(&mut self, path: ElementPath) -> Option<&mut dyn RenderTarget> {
            self.targets
                .get_mut(&path)
                .map(|probe| probe as &mut dyn RenderTarget)
        }

        fn supplementary_target(
            &mut self,
            kind: &ElementKind,
            path: ElementPath,
        ) -> Option<&mut dyn RenderTarget> {
            if kind != &ElementKind::Header {
                return None;
            }
            self.header_targets
                .get_mut(&path)
                .map(|probe| probe as &mut dyn RenderTarget)
        }

        fn content_offset(&self) -> Offset {
            self.offset
        }

        fn set_content_offset(&mut self, offset: Offset) {
            self.offset = offset;
            self.events.push(ViewEvent::SetOffset(offset));
        }

        fn is_interactively_scrolling(&self) -> bool {
            self.scrolling
        }
    }

    /// Hands out a pre-scripted changeset; panics when asked twice.
    struct ScriptedDiffer {
        staged: Mutex<Option<StagedChangeset>>,
    }

    impl ScriptedDiffer {
        fn new(staged: StagedChangeset) -> Arc<Self> {
            Arc::new(Self {
                staged: Mutex::new(Some(staged)),
            })
        }
    }

    impl Differ for ScriptedDiffer {
        fn diff(&self, _source: &[Section], _target: &[Section]) -> StagedChangeset {
            self.staged.lock().take().expect("diff requested twice")
        }
    }

    /// Fails the test if the orchestrator computes a diff at all.
    struct PanickingDiffer;

    impl Differ for PanickingDiffer {
        fn diff(&self, _source: &[Section], _target: &[Section]) -> StagedChangeset {
            panic!("diff must not be computed on this path");
        }
    }

    fn counted() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = Arc::clone(&count);
        (count, move || {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    // ---------------------------------------------------------------------
    // Orchestrator paths
    // ---------------------------------------------------------------------

    #[test]
    fn test_detached_target_reloads_without_diffing() {
        // 2 sections / 5 items -> 1 section / 3 items while off-screen.
        let adapter = SectionedAdapter::with_data(vec![
            section(0, &[(1, "a"), (2, "b"), (3, "c")]),
            section(9, &[(4, "d"), (5, "e")]),
        ]);
        let target = vec![section(0, &[(1, "a"), (2, "b"), (3, "c")])];

        let mut view = MockView::new();
        view.attached = false;

        let updater = Updater::new(Arc::new(PanickingDiffer));
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, target.clone(), completion);

        assert_eq!(view.events, vec![ViewEvent::ReloadData]);
        assert_eq!(ids(&adapter.snapshot()), ids(&target));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_changeset_issues_no_structural_edits() {
        let data = vec![section(0, &[(1, "a")])];
        let adapter = SectionedAdapter::with_data(data.clone());
        let mut view = MockView::new();
        view.visible = vec![ElementPath::new(0, 0)];
        view.targets.insert(ElementPath::new(0, 0), Probe::default());

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::empty()));
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, data.clone(), completion);

        // Snapshot replaced and visible content refreshed, but no batch and
        // no reload.
        assert!(view.events.is_empty());
        assert_eq!(ids(&adapter.snapshot()), ids(&data));
        assert_eq!(view.targets[&ElementPath::new(0, 0)].applied, vec!["a"]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threshold_fallback_issues_exactly_one_reload() {
        let adapter = SectionedAdapter::with_data(vec![section(0, &[(1, "a"), (2, "b")])]);
        let target = vec![section(0, &[(3, "c")])];

        // Two stages, three edits total; ceiling of 2 forces the fallback.
        let mut first = ChangesetStage::new(vec![section(0, &[])]);
        first.element_deleted = vec![ElementPath::new(0, 0), ElementPath::new(0, 1)];
        let mut second = ChangesetStage::new(target.clone());
        second.element_inserted = vec![ElementPath::new(0, 0)];

        let updater = Updater::with_config(
            ScriptedDiffer::new(StagedChangeset::new(vec![first, second])),
            UpdaterConfig {
                animatable_change_ceiling: 2,
                ..UpdaterConfig::default()
            },
        );

        let mut view = MockView::new();
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, target.clone(), completion);

        assert_eq!(view.events, vec![ViewEvent::ReloadData]);
        assert_eq!(view.batch_count(), 0);
        assert_eq!(ids(&adapter.snapshot()), ids(&target));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_batch_per_stage_in_order() {
        let adapter = SectionedAdapter::with_data(vec![section(0, &[(1, "a"), (2, "b")])]);
        let intermediate = vec![section(0, &[(1, "a")])];
        let target = vec![section(0, &[(1, "a"), (3, "c")])];

        let mut first = ChangesetStage::new(intermediate);
        first.element_deleted = vec![ElementPath::new(0, 1)];
        let mut second = ChangesetStage::new(target.clone());
        second.element_inserted = vec![ElementPath::new(0, 1)];

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::new(vec![
            first, second,
        ])));

        let mut view = MockView::new();
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, target.clone(), completion);

        assert_eq!(
            view.events,
            vec![
                ViewEvent::BeginBatch { animated: true },
                ViewEvent::DeleteElements(vec![ElementPath::new(0, 1)]),
                ViewEvent::CommitBatch,
                ViewEvent::BeginBatch { animated: true },
                ViewEvent::InsertElements(vec![ElementPath::new(0, 1)]),
                ViewEvent::CommitBatch,
            ]
        );
        assert_eq!(ids(&adapter.snapshot()), ids(&target));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fixed_category_order_within_batch() {
        // Pre: A[1,2,3] B[4] C[6] D[] -- every edit category at once.
        let adapter = SectionedAdapter::with_data(vec![
            section(0, &[(1, "a"), (2, "b"), (3, "c")]),
            section(9, &[(4, "d")]),
            section(5, &[(6, "e")]),
            section(7, &[]),
        ]);

        // Post: B'[6,4] A'[1,n,2] C'[8] E[] -- D deleted, E inserted, C
        // reloaded, A moved behind B, plus one element edit of each kind.
        let post = vec![
            section(9, &[(6, "e"), (4, "d")]),
            section(0, &[(1, "a2"), (10, "n"), (2, "b")]),
            section(5, &[(8, "f")]),
            section(11, &[]),
        ];

        let mut stage = ChangesetStage::new(post.clone());
        stage.section_deleted = vec![3];
        stage.section_inserted = vec![3];
        stage.section_updated = vec![2];
        stage.section_moved = vec![(0, 1)];
        stage.element_deleted = vec![ElementPath::new(0, 2)];
        stage.element_inserted = vec![ElementPath::new(1, 1)];
        stage.element_updated = vec![ElementPath::new(0, 0)];
        stage.element_moved = vec![(ElementPath::new(2, 0), ElementPath::new(0, 0))];

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::new(vec![stage])));

        let mut view = MockView::new();
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, post.clone(), completion);

        assert_eq!(
            view.events,
            vec![
                ViewEvent::BeginBatch { animated: true },
                ViewEvent::DeleteSections(vec![3]),
                ViewEvent::InsertSections(vec![3]),
                ViewEvent::ReloadSections(vec![2]),
                ViewEvent::MoveSection(0, 1),
                ViewEvent::DeleteElements(vec![ElementPath::new(0, 2)]),
                ViewEvent::InsertElements(vec![ElementPath::new(1, 1)]),
                ViewEvent::ReloadElements(vec![ElementPath::new(0, 0)]),
                ViewEvent::MoveElement(ElementPath::new(2, 0), ElementPath::new(0, 0)),
                ViewEvent::CommitBatch,
            ]
        );
        assert_eq!(ids(&adapter.snapshot()), ids(&post));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_stage_example_delete_and_insert() {
        // One stage deletes item (0,2) and inserts (1,0), nothing else.
        let adapter = SectionedAdapter::with_data(vec![
            section(0, &[(1, "a"), (2, "b"), (3, "c")]),
            section(9, &[]),
        ]);
        let target = vec![section(0, &[(1, "a"), (2, "b")]), section(9, &[(3, "c")])];

        let mut stage = ChangesetStage::new(target.clone());
        stage.element_deleted = vec![ElementPath::new(0, 2)];
        stage.element_inserted = vec![ElementPath::new(1, 0)];

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::new(vec![stage])));

        let mut view = MockView::new();
        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, target.clone(), completion);

        assert_eq!(view.batch_count(), 1);
        assert_eq!(
            view.events,
            vec![
                ViewEvent::BeginBatch { animated: true },
                ViewEvent::DeleteElements(vec![ElementPath::new(0, 2)]),
                ViewEvent::InsertElements(vec![ElementPath::new(1, 0)]),
                ViewEvent::CommitBatch,
            ]
        );
        assert_eq!(ids(&adapter.snapshot()), ids(&target));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_completion_waits_for_batch_animations() {
        let adapter = SectionedAdapter::with_data(vec![section(0, &[(1, "a"), (2, "b")])]);
        let target = vec![section(0, &[(1, "a")])];

        let mut stage = ChangesetStage::new(target.clone());
        stage.element_deleted = vec![ElementPath::new(0, 1)];

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::new(vec![stage])));

        let mut view = MockView::new();
        view.defer_completions = true;

        let (fired, completion) = counted();
        updater.perform_updates(&mut view, &adapter, target, completion);

        // Snapshot is already in lock-step, but the caller's completion must
        // wait for the animation.
        assert_eq!(view.batch_count(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        view.finish_animations();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_animation_gating_while_scrolling() {
        let make = |scrolling: bool, config: UpdaterConfig| {
            let adapter = SectionedAdapter::with_data(vec![section(0, &[(1, "a")])]);
            let target = vec![section(0, &[])];
            let mut stage = ChangesetStage::new(target.clone());
            stage.element_deleted = vec![ElementPath::new(0, 0)];
            let updater =
                Updater::with_config(ScriptedDiffer::new(StagedChangeset::new(vec![stage])), config);
            let mut view = MockView::new();
            view.scrolling = scrolling;
            updater.perform_updates(&mut view, &adapter, target, || {});
            view.events[0].clone()
        };

        // Scrolling with animation-while-scrolling disabled: unanimated.
        let gated = UpdaterConfig {
            animation_enabled_while_scrolling: false,
            ..UpdaterConfig::default()
        };
        assert_eq!(make(true, gated.clone()), ViewEvent::BeginBatch { animated: false });
        assert_eq!(make(false, gated), ViewEvent::BeginBatch { animated: true });

        // Animation globally disabled: always unanimated.
        let disabled = UpdaterConfig {
            animation_enabled: false,
            ..UpdaterConfig::default()
        };
        assert_eq!(make(false, disabled), ViewEvent::BeginBatch { animated: false });
    }

    #[test]
    fn test_scroll_offset_restored_when_configured() {
        let run = |keeps: bool, scrolling: bool| {
            let adapter = SectionedAdapter::with_data(vec![section(0, &[(1, "a")])]);
            let target = vec![section(0, &[])];
            let mut stage = ChangesetStage::new(target.clone());
            stage.element_deleted = vec![ElementPath::new(0, 0)];
            let updater = Updater::with_config(
                ScriptedDiffer::new(StagedChangeset::new(vec![stage])),
                UpdaterConfig {
                    keeps_scroll_offset: keeps,
                    ..UpdaterConfig::default()
                },
            );
            let mut view = MockView::new();
            view.offset = Offset::new(0.0, 120.0);
            view.scrolling = scrolling;
            updater.perform_updates(&mut view, &adapter, target, || {});
            view.events
        };

        let restored = run(true, false);
        assert!(restored.contains(&ViewEvent::SetOffset(Offset::new(0.0, 120.0))));

        let unrestored = run(false, false);
        assert!(!unrestored.iter().any(|e| matches!(e, ViewEvent::SetOffset(_))));

        // Never fight the user's finger.
        let scrolling = run(true, true);
        assert!(!scrolling.iter().any(|e| matches!(e, ViewEvent::SetOffset(_))));
    }

    #[test]
    fn test_visible_rerender_refreshes_surviving_elements() {
        let adapter = SectionedAdapter::with_data(vec![
            Section::new(0)
                .with_header(Text("old header"))
                .with_cells([Cell::new(1, Text("old")), Cell::new(2, Text("kept"))]),
        ]);
        let target = vec![
            Section::new(0)
                .with_header(Text("new header"))
                .with_cells([Cell::new(1, Text("new")), Cell::new(2, Text("kept"))]),
        ];

        let mut stage = ChangesetStage::new(target.clone());
        stage.element_updated = vec![ElementPath::new(0, 0)];

        let updater = Updater::new(ScriptedDiffer::new(StagedChangeset::new(vec![stage])));

        let mut view = MockView::new();
        view.visible = vec![ElementPath::new(0, 0), ElementPath::new(0, 1)];
        view.visible_headers = vec![ElementPath::new(0, 0)];
        view.targets.insert(ElementPath::new(0, 0), Probe::default());
        // (0, 1) is visible but does not support the render contract.
        view.header_targets
            .insert(ElementPath::new(0, 0), Probe::default());

        updater.perform_updates(&mut view, &adapter, target, || {});

        assert_eq!(view.targets[&ElementPath::new(0, 0)].applied, vec!["new"]);
        assert_eq!(
            view.header_targets[&ElementPath::new(0, 0)].applied,
            vec!["new header"]
        );
    }

    #[test]
    fn test_rerender_can_be_disabled() {
        let data = vec![section(0, &[(1, "a")])];
        let adapter = SectionedAdapter::with_data(data.clone());

        let updater = Updater::with_config(
            ScriptedDiffer::new(StagedChangeset::empty()),
            UpdaterConfig {
                always_render_visible_after_update: false,
                ..UpdaterConfig::default()
            },
        );

        let mut view = MockView::new();
        view.visible = vec![ElementPath::new(0, 0)];
        view.targets.insert(ElementPath::new(0, 0), Probe::default());

        updater.perform_updates(&mut view, &adapter, data, || {});
        assert!(view.targets[&ElementPath::new(0, 0)].applied.is_empty());
    }

    #[test]
    fn test_prepare_binds_and_reloads() {
        let adapter: Arc<dyn Adapter> = Arc::new(SectionedAdapter::new());
        let mut view = MockView::new();

        let updater = Updater::new(Arc::new(PanickingDiffer));
        updater.prepare(&mut view, adapter);

        assert_eq!(
            view.events,
            vec![
                ViewEvent::BindAdapter,
                ViewEvent::ReloadData,
                ViewEvent::InvalidateLayout,
            ]
        );
    }

    // ---------------------------------------------------------------------
    // Completion group
    // ---------------------------------------------------------------------

    #[test]
    fn test_completion_group_zero_tokens_fires_on_finish() {
        let (fired, completion) = counted();
        let group = CompletionGroup::new(Box::new(completion));
        group.finish();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_completion_group_waits_for_all_tokens() {
        let (fired, completion) = counted();
        let group = CompletionGroup::new(Box::new(completion));
        let first = group.enter();
        let second = group.enter();
        group.finish();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        first();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        second();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_completion_group_token_resolving_before_finish() {
        let (fired, completion) = counted();
        let group = CompletionGroup::new(Box::new(completion));
        let token = group.enter();
        token();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        group.finish();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
