//! The visual list control contract.
//!
//! [`SectionedView`] abstracts the long-lived, stateful container the update
//! orchestrator drives. Implementations are order-sensitive and strict: an
//! animated batch of structural edits must exactly match the before/after
//! cardinality the control is told to expect, and a mismatch is a fatal
//! consistency violation at the next layout pass. The orchestrator therefore
//! only ever issues edits immediately after installing the matching snapshot
//! into the adapter.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::component::RenderTarget;
use crate::section::{ElementKind, ElementPath};

/// A scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    /// Horizontal offset in points.
    pub x: f32,
    /// Vertical offset in points.
    pub y: f32,
}

impl Offset {
    /// Creates an offset.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A stateful sectioned list control with begin/apply/commit batch semantics.
///
/// # Index spaces
///
/// Within one batch, deletes, reloads and move sources are interpreted in the
/// pre-batch index space; inserts and move targets in the post-batch space.
/// This matches the convention of every structural container API of this
/// class, and the update orchestrator relies on it when replaying a
/// changeset stage.
///
/// # Completion
///
/// [`commit_batch`](SectionedView::commit_batch) takes a completion callback
/// that the control must invoke exactly once, after the batch's animations
/// (if any) have finished. Unanimated implementations may invoke it
/// synchronously from within `commit_batch`.
pub trait SectionedView {
    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Wires the adapter as this control's sole data collaborator.
    fn bind_adapter(&mut self, adapter: Arc<dyn Adapter>);

    /// Returns `true` while the control is part of an active display
    /// hierarchy. Off-screen controls are reloaded rather than diffed.
    fn is_attached(&self) -> bool;

    /// Discards all structural state and re-queries the adapter from
    /// scratch.
    fn reload_data(&mut self);

    /// Invalidates the current layout so the next pass recomputes it.
    fn invalidate_layout(&mut self);

    // ---------------------------------------------------------------------
    // Batch application
    // ---------------------------------------------------------------------

    /// Opens an atomic batch. `animated` selects whether the structural
    /// edits are presented with animation; the edits themselves are
    /// identical either way.
    fn begin_batch(&mut self, animated: bool);

    /// Deletes sections (pre-batch indices).
    fn delete_sections(&mut self, indices: &[usize]);

    /// Inserts sections (post-batch indices).
    fn insert_sections(&mut self, indices: &[usize]);

    /// Reloads sections (pre-batch indices).
    fn reload_sections(&mut self, indices: &[usize]);

    /// Moves a section from a pre-batch index to a post-batch index.
    fn move_section(&mut self, from: usize, to: usize);

    /// Deletes items (pre-batch paths).
    fn delete_elements(&mut self, paths: &[ElementPath]);

    /// Inserts items (post-batch paths).
    fn insert_elements(&mut self, paths: &[ElementPath]);

    /// Reloads items (pre-batch paths).
    fn reload_elements(&mut self, paths: &[ElementPath]);

    /// Moves an item from a pre-batch path to a post-batch path.
    fn move_element(&mut self, from: ElementPath, to: ElementPath);

    /// Closes the batch, applying all staged edits as one atomic operation.
    /// `completion` fires once the batch's animations have finished.
    fn commit_batch(&mut self, completion: Box<dyn FnOnce() + Send>);

    // ---------------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------------

    /// Paths of the currently visible items.
    fn visible_element_paths(&self) -> Vec<ElementPath>;

    /// Paths whose supplementary element of `kind` is currently visible.
    fn visible_supplementary_paths(&self, kind: &ElementKind) -> Vec<ElementPath>;

    /// The on-screen item at `path`, if it supports the render contract.
    /// `None` is not an error; such elements are skipped during re-render.
    fn element_target(&mut self, path: ElementPath) -> Option<&mut dyn RenderTarget>;

    /// The on-screen supplementary element, if it supports the render
    /// contract.
    fn supplementary_target(
        &mut self,
        kind: &ElementKind,
        path: ElementPath,
    ) -> Option<&mut dyn RenderTarget>;

    // ---------------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------------

    /// The current scroll offset.
    fn content_offset(&self) -> Offset;

    /// Sets the scroll offset.
    fn set_content_offset(&mut self, offset: Offset);

    /// Returns `true` while the user is interactively scrolling (tracking,
    /// dragging, or decelerating).
    fn is_interactively_scrolling(&self) -> bool;
}
