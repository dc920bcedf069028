//! The section/item data model.
//!
//! A snapshot is an ordered `Vec<Section>`; each [`Section`] is an ordered,
//! identifiable group of [`Cell`]s plus optional header and footer
//! components. Identity ([`NodeId`]) must be stable across snapshots for
//! diffing to be meaningful: a cell that logically survives an update keeps
//! its id even when its component content changes.
//!
//! [`ElementPath`] addresses one item's position inside one specific
//! snapshot. Any structural change invalidates previously obtained paths.

use std::fmt;
use std::sync::Arc;

use static_assertions::assert_impl_all;

use crate::component::AnyComponent;

/// Stable identity for a section or cell, comparable across snapshots.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Integer identity.
    Int(i64),
    /// String identity.
    Text(Arc<str>),
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "#{n}"),
            Self::Text(s) => write!(f, "#{s:?}"),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value))
    }
}

/// A (section index, item index) pair identifying a single item's position.
///
/// Valid only relative to one specific snapshot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementPath {
    /// Index of the containing section.
    pub section: usize,
    /// Index of the item within the section.
    pub item: usize,
}

impl ElementPath {
    /// Creates a path.
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Debug for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.item)
    }
}

assert_impl_all!(ElementPath: Copy, Send, Sync);
assert_impl_all!(NodeId: Send, Sync);

/// Kind identifier for supplementary elements (headers, footers, custom).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ElementKind {
    /// Section header.
    Header,
    /// Section footer.
    Footer,
    /// A custom supplementary kind registered by the consumer.
    Custom(Arc<str>),
}

impl ElementKind {
    /// Creates a custom kind.
    pub fn custom(name: impl AsRef<str>) -> Self {
        Self::Custom(Arc::from(name.as_ref()))
    }
}

/// One item description: stable identity plus a component.
#[derive(Clone, Debug)]
pub struct Cell {
    id: NodeId,
    component: AnyComponent,
}

impl Cell {
    /// Creates a cell.
    pub fn new(id: impl Into<NodeId>, component: impl Into<AnyComponent>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
        }
    }

    /// The cell's stable identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The cell's component description.
    pub fn component(&self) -> &AnyComponent {
        &self.component
    }
}

/// An ordered, identifiable group of cells with optional header and footer.
#[derive(Clone, Debug)]
pub struct Section {
    id: NodeId,
    header: Option<AnyComponent>,
    footer: Option<AnyComponent>,
    cells: Vec<Cell>,
}

impl Section {
    /// Creates an empty section with the given identity.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            header: None,
            footer: None,
            cells: Vec::new(),
        }
    }

    /// Sets the header component.
    pub fn with_header(mut self, header: impl Into<AnyComponent>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Sets the footer component.
    pub fn with_footer(mut self, footer: impl Into<AnyComponent>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Sets the cells.
    pub fn with_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells = cells.into_iter().collect();
        self
    }

    /// Appends one cell.
    pub fn push_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// The section's stable identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The header component, if any.
    pub fn header(&self) -> Option<&AnyComponent> {
        self.header.as_ref()
    }

    /// The footer component, if any.
    pub fn footer(&self) -> Option<&AnyComponent> {
        self.footer.as_ref()
    }

    /// The ordered cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the section has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The supplementary component for the given kind, if present.
    ///
    /// Custom kinds are not stored on `Section`; consumers carrying custom
    /// supplementaries resolve them through their own adapter.
    pub fn supplementary(&self, kind: &ElementKind) -> Option<&AnyComponent> {
        match kind {
            ElementKind::Header => self.header.as_ref(),
            ElementKind::Footer => self.footer.as_ref(),
            ElementKind::Custom(_) => None,
        }
    }
}
