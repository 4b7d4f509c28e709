//! The caller-facing entry point.
//!
//! ```
//! use docjoin::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Product {
//!     #[serde(rename = "id")]
//!     id: i64,
//!     title: String,
//! }
//!
//! impl Shape for Product {
//!     const NAME: &'static str = "Product";
//!     fn describe(shape: &mut Descriptor<Self>) {
//!         shape
//!             .value("ID", "id", |p| p.id.into())
//!             .value("Title", "title", |p| p.title.as_str().into());
//!     }
//! }
//!
//! let products = r#"[{"id": 1, "title": "Lamp"}, {"id": 2, "title": "Desk"}]"#;
//! let mut desk: Option<Product> = None;
//! Resolution::declare(&mut desk, products)
//!     .filter("ID", Operator::Eq, 2)?
//!     .resolve()?;
//! assert_eq!(desk.map(|p| p.title), Some("Desk".to_string()));
//! # Ok::<(), docjoin::error::DocjoinError>(())
//! ```

use crate::document::Document;
use crate::engine::Resolver;
use crate::error::Result;
use crate::filter::Filter;
use crate::query::{PathQuery, Query};
use crate::registry::{Declaration, Registry};
use crate::scalar::{Operator, Scalar};
use crate::settings::Settings;
use crate::shape::Target;

/// A pending decode of `document` into `target`.
///
/// Filters and relationships are validated as they are added; nothing touches
/// the target until [`resolve`](Resolution::resolve) succeeds.
pub struct Resolution<'t, T: Target> {
    target: &'t mut T,
    document: Document,
    filters: Vec<Filter>,
    registry: Registry<T::Item>,
    query: Box<dyn Query>,
    settings: Settings,
}

/// Shorthand for [`Resolution::declare`].
pub fn declare<T: Target>(target: &mut T, document: impl Into<Document>) -> Resolution<'_, T> {
    Resolution::declare(target, document)
}

impl<'t, T: Target> Resolution<'t, T> {
    pub fn declare(target: &'t mut T, document: impl Into<Document>) -> Self {
        Self {
            target,
            document: document.into(),
            filters: Vec::new(),
            registry: Registry::new(),
            query: Box::new(PathQuery::new()),
            settings: Settings::default(),
        }
    }

    /// Adds a filter on a field of the target shape, by semantic or wire name.
    /// Repeated filters narrow each other.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Scalar>,
    ) -> Result<Self> {
        self.filters.push(Filter::new(field, operator, value)?);
        Ok(self)
    }

    /// Declares a relationship by path, e.g. `"Orders"` or `"Orders.Product"`.
    pub fn relationship(mut self, path: impl Into<String>, source: impl Into<Document>) -> Result<Self> {
        self.registry.declare(Declaration::new(path, source.into()))?;
        Ok(self)
    }

    /// Declares a many-to-many relationship resolved through `join`.
    pub fn relationship_through(
        mut self,
        path: impl Into<String>,
        source: impl Into<Document>,
        join: impl Into<Document>,
    ) -> Result<Self> {
        self.registry
            .declare(Declaration::through(path, source.into(), join.into()))?;
        Ok(self)
    }

    pub fn with_query(mut self, query: impl Query + 'static) -> Self {
        self.query = Box::new(query);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &Registry<T::Item> {
        &self.registry
    }

    /// Decodes and resolves, then overwrites the target. On error the target
    /// is left as it was.
    pub fn resolve(self) -> Result<()> {
        let Self {
            target,
            document,
            filters,
            registry,
            query,
            settings,
        } = self;
        let mut resolver = Resolver::new(query.as_ref(), &settings);
        let items = resolver.fetch(&document, &filters, &registry, T::cardinality())?;
        target.assign(items);
        Ok(())
    }
}
