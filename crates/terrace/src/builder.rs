//! Declarative builders for assembling sections and cells.
//!
//! These are plain accumulators: conditional, loop, and optional
//! construction sites all flatten into one ordered sequence through
//! [`append`](SectionsBuilder::append) / [`append_all`](SectionsBuilder::append_all),
//! terminated by `build()`.
//!
//! # Example
//!
//! ```ignore
//! let sections = SectionsBuilder::new()
//!     .append(header_section)
//!     .append_all(groups.iter().map(group_section))
//!     .append_if(show_footer, footer_section)
//!     .build();
//! ```

use crate::section::{Cell, Section};

/// Accumulates an ordered sequence of sections.
#[derive(Debug, Default)]
pub struct SectionsBuilder {
    sections: Vec<Section>,
}

impl SectionsBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one section.
    pub fn append(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Appends every section from an iterator.
    pub fn append_all(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        self.sections.extend(sections);
        self
    }

    /// Appends one section only when `condition` holds.
    pub fn append_if(self, condition: bool, section: Section) -> Self {
        if condition { self.append(section) } else { self }
    }

    /// Finishes, yielding the flattened sequence.
    pub fn build(self) -> Vec<Section> {
        self.sections
    }
}

impl Extend<Section> for SectionsBuilder {
    fn extend<T: IntoIterator<Item = Section>>(&mut self, iter: T) {
        self.sections.extend(iter);
    }
}

impl FromIterator<Section> for SectionsBuilder {
    fn from_iter<T: IntoIterator<Item = Section>>(iter: T) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

/// Accumulates an ordered sequence of cells.
#[derive(Debug, Default)]
pub struct CellsBuilder {
    cells: Vec<Cell>,
}

impl CellsBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one cell.
    pub fn append(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Appends every cell from an iterator.
    pub fn append_all(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Appends one cell only when `condition` holds.
    pub fn append_if(self, condition: bool, cell: Cell) -> Self {
        if condition { self.append(cell) } else { self }
    }

    /// Finishes, yielding the flattened sequence.
    pub fn build(self) -> Vec<Cell> {
        self.cells
    }
}

impl Extend<Cell> for CellsBuilder {
    fn extend<T: IntoIterator<Item = Cell>>(&mut self, iter: T) {
        self.cells.extend(iter);
    }
}

impl FromIterator<Cell> for CellsBuilder {
    fn from_iter<T: IntoIterator<Item = Cell>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::section::NodeId;
    use std::any::Any;

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

    #[test]
    fn test_flattens_conditional_and_loop_sites() {
        let extras = [Section::new(10), Section::new(11)];
        let sections = SectionsBuilder::new()
            .append(Section::new(0))
            .append_if(false, Section::new(1))
            .append_all(extras)
            .append_if(true, Section::new(2))
            .build();

        let ids: Vec<_> = sections.iter().map(Section::id).cloned().collect();
        let expected: Vec<NodeId> = [0i64, 10, 11, 2].map(NodeId::from).into();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_cells_builder() {
        let cells = CellsBuilder::new()
            .append(Cell::new(1, Text("a")))
            .append_all((2..4).map(|i| Cell::new(i as i64, Text("n"))))
            .build();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2].id(), &NodeId::from(3i64));
    }
}
