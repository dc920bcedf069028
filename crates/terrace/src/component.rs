//! Component descriptions and the render contract.
//!
//! A [`Component`] is an immutable description of one renderable element: a
//! cell, a section header, or any other supplementary element. Terrace never
//! interprets a component's contents; it only needs to know whether two
//! descriptions differ enough that the on-screen element should be re-rendered.
//!
//! On-screen elements opt into refreshes by implementing [`RenderTarget`],
//! the contract through which the update orchestrator pushes the latest
//! component description into an element that survived a structural update.
//!
//! # Example
//!
//! ```
//! use terrace::{AnyComponent, Component};
//! use std::any::Any;
//!
//! #[derive(Debug, PartialEq)]
//! struct Label {
//!     text: String,
//! }
//!
//! impl Component for Label {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn should_content_update(&self, next: &dyn Component) -> bool {
//!         next.as_any().downcast_ref::<Label>() != Some(self)
//!     }
//! }
//!
//! let a = AnyComponent::new(Label { text: "hello".into() });
//! let b = AnyComponent::new(Label { text: "world".into() });
//! assert!(a.should_content_update(&b));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An immutable description of one renderable element.
///
/// Implementations are plain data. The single behavioral requirement is
/// content comparison: [`should_content_update`](Component::should_content_update)
/// returns `true` when the on-screen element backed by `self` needs to be
/// re-rendered to show `next`. Comparing against a component of a different
/// concrete type should always return `true`.
pub trait Component: Send + Sync {
    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `true` if an element currently rendering `self` must be
    /// re-rendered to display `next`.
    fn should_content_update(&self, next: &dyn Component) -> bool;

    /// The concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A cheaply cloneable, type-erased handle to a [`Component`].
///
/// Sections and cells store their component descriptions as `AnyComponent`
/// so heterogeneous element types can share one snapshot.
#[derive(Clone)]
pub struct AnyComponent(Arc<dyn Component>);

impl AnyComponent {
    /// Wraps a concrete component.
    pub fn new<C: Component + 'static>(component: C) -> Self {
        Self(Arc::new(component))
    }

    /// Wraps an already-shared component.
    pub fn from_arc(component: Arc<dyn Component>) -> Self {
        Self(component)
    }

    /// Downcasts to a concrete component type.
    pub fn downcast_ref<C: 'static>(&self) -> Option<&C> {
        self.0.as_any().downcast_ref::<C>()
    }

    /// Returns `true` if an element rendering `self` must re-render to show
    /// `next`.
    pub fn should_content_update(&self, next: &AnyComponent) -> bool {
        self.0.should_content_update(next.0.as_ref())
    }

    /// The wrapped component's concrete type name.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyComponent").field(&self.type_name()).finish()
    }
}

impl<C: Component + 'static> From<C> for AnyComponent {
    fn from(component: C) -> Self {
        Self::new(component)
    }
}

/// The render contract for on-screen elements.
///
/// A structural update can shift which data backs an element without that
/// element being destroyed and recreated. The update orchestrator refreshes
/// surviving visible elements by fetching the latest component description
/// from the adapter and pushing it through this trait. Elements that do not
/// implement the contract are silently skipped; the refresh is best-effort
/// and never fatal.
pub trait RenderTarget {
    /// Applies the given component description to this element's current
    /// state. Must not animate.
    fn apply(&mut self, component: &AnyComponent);
}
