//! The data-bearing adapter: owner of the currently-rendered snapshot.
//!
//! An [`Adapter`] holds the section/item data the list control is currently
//! believed to be rendering and resolves component descriptions for visible
//! positions. The snapshot is the single shared mutable resource between the
//! update orchestrator and the control's rendering callbacks: it is mutated
//! exclusively by the orchestrator, always immediately before the matching
//! structural edit is issued, so re-entrant queries from the control observe
//! post-stage data.

use parking_lot::RwLock;

use crate::component::AnyComponent;
use crate::section::{ElementKind, ElementPath, Section};

/// Holds the currently-rendered snapshot and resolves components for it.
pub trait Adapter: Send + Sync {
    /// The snapshot currently believed to be rendered.
    fn snapshot(&self) -> Vec<Section>;

    /// Replaces the snapshot.
    ///
    /// Callers other than the update orchestrator must not invoke this: the
    /// snapshot and the control's structural state must move in lock-step,
    /// and a disagreement is fatal at the control's next layout pass.
    fn replace_snapshot(&self, data: Vec<Section>);

    /// The component description for the item at `path`, if the path is
    /// valid in the current snapshot.
    fn item_component(&self, path: ElementPath) -> Option<AnyComponent>;

    /// The component description for the supplementary element of `kind` in
    /// `path`'s section, if present.
    fn supplementary_component(&self, kind: &ElementKind, path: ElementPath)
    -> Option<AnyComponent>;

    /// The supplementary-element kinds registered with the control.
    fn registered_kinds(&self) -> Vec<ElementKind>;
}

/// The standard adapter: snapshot behind a lock, header/footer kinds plus
/// any custom kinds registered at construction.
pub struct SectionedAdapter {
    data: RwLock<Vec<Section>>,
    kinds: Vec<ElementKind>,
}

impl SectionedAdapter {
    /// Creates an adapter with an empty snapshot and header/footer kinds.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Vec::new()),
            kinds: vec![ElementKind::Header, ElementKind::Footer],
        }
    }

    /// Creates an adapter with an initial snapshot.
    pub fn with_data(data: Vec<Section>) -> Self {
        let adapter = Self::new();
        *adapter.data.write() = data;
        adapter
    }

    /// Registers an additional supplementary kind.
    pub fn register_kind(mut self, kind: ElementKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Number of sections in the current snapshot.
    pub fn section_count(&self) -> usize {
        self.data.read().len()
    }

    /// Number of items in one section of the current snapshot.
    pub fn item_count(&self, section: usize) -> Option<usize> {
        self.data.read().get(section).map(Section::len)
    }
}

impl Default for SectionedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for SectionedAdapter {
    fn snapshot(&self) -> Vec<Section> {
        self.data.read().clone()
    }

    fn replace_snapshot(&self, data: Vec<Section>) {
        tracing::trace!(
            target: "terrace::adapter",
            sections = data.len(),
            items = data.iter().map(Section::len).sum::<usize>(),
            "replacing snapshot"
        );
        *self.data.write() = data;
    }

    fn item_component(&self, path: ElementPath) -> Option<AnyComponent> {
        let data = self.data.read();
        data.get(path.section)?
            .cells()
            .get(path.item)
            .map(|cell| cell.component().clone())
    }

    fn supplementary_component(
        &self,
        kind: &ElementKind,
        path: ElementPath,
    ) -> Option<AnyComponent> {
        let data = self.data.read();
        data.get(path.section)?.supplementary(kind).cloned()
    }

    fn registered_kinds(&self) -> Vec<ElementKind> {
        self.kinds.clone()
    }
}
