//! Docjoin – a relationship-aware decoder for JSON documents.
//!
//! Docjoin decodes records out of one JSON document into a typed shape and then
//! fills in the relationships of those records from other documents, the way a
//! relational join would:
//! * a *single-parent* relationship follows a foreign key on the record to one
//!   record elsewhere,
//! * a *one-to-many* relationship collects the records elsewhere whose foreign
//!   key points back at this one,
//! * a *many-to-many* relationship goes through a join document of key pairs.
//!
//! Relationships are declared by path. `"Orders"` resolves the `Orders` field
//! of the decoded records, `"Orders.Product"` then resolves the `Product` field
//! of every order found, and so on to any depth.
//!
//! ## Modules
//! * [`shape`] – The [`shape::Shape`] trait and the [`shape::Descriptor`] table
//!   naming the fields of a shape, its keys and its relationship fields.
//! * [`filter`] – Caller filters and the query expressions built from them.
//! * [`registry`] – Validation and bookkeeping of declared relationships.
//! * [`engine`] – Decoding, relationship resolution and nested paths.
//! * [`query`] – The [`query::Query`] capability and the default
//!   [`query::PathQuery`] expression language.
//! * [`resolution`] – [`resolution::Resolution`], the builder callers use.
//! * [`document`], [`scalar`], [`settings`], [`error`] – Supporting types.
//!
//! ## Shapes
//! Decoding is plain `serde`. A shape additionally describes its fields so that
//! keys can be read and relationship fields written without reflection:
//!
//! ```
//! use docjoin::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Client {
//!     #[serde(rename = "id")]
//!     id: i64,
//!     name: String,
//!     #[serde(skip)]
//!     orders: Vec<Order>,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Order {
//!     #[serde(rename = "id")]
//!     id: i64,
//!     #[serde(rename = "client_id")]
//!     client_id: i64,
//! }
//!
//! impl Shape for Client {
//!     const NAME: &'static str = "Client";
//!     fn describe(shape: &mut Descriptor<Self>) {
//!         shape
//!             .value("ID", "id", |c| c.id.into())
//!             .value("Name", "name", |c| c.name.as_str().into())
//!             .has_many("Orders", "orders", "ID,ClientID", |c| &mut c.orders);
//!     }
//! }
//!
//! impl Shape for Order {
//!     const NAME: &'static str = "Order";
//!     fn describe(shape: &mut Descriptor<Self>) {
//!         shape
//!             .value("ID", "id", |o| o.id.into())
//!             .value("ClientID", "client_id", |o| o.client_id.into());
//!     }
//! }
//!
//! let clients = r#"[{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bob"}]"#;
//! let orders = r#"[{"id": 7, "client_id": 2}, {"id": 8, "client_id": 2}]"#;
//!
//! let mut bob: Option<Client> = None;
//! declare(&mut bob, clients)
//!     .filter("Name", Operator::Eq, "Bob")?
//!     .relationship("Orders", orders)?
//!     .resolve()?;
//! assert_eq!(bob.map(|c| c.orders.len()), Some(2));
//! # Ok::<(), docjoin::error::DocjoinError>(())
//! ```
//!
//! ## Recursion
//! Every `resolve()` call parses each document at most once. Re-entering the
//! same document with the same expression while it is still being resolved is
//! reported as [`error::DocjoinError::CyclicRelationship`], and nesting deeper
//! than [`settings::Settings::max_depth`] as
//! [`error::DocjoinError::DepthExceeded`].

pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod query;
pub mod registry;
pub mod resolution;
pub mod scalar;
pub mod settings;
pub mod shape;

pub mod prelude {
    pub use crate::document::Document;
    pub use crate::error::{ConfigurationError, DocjoinError, Result};
    pub use crate::query::{Expression, Fragment, PathQuery, Query};
    pub use crate::resolution::{Resolution, declare};
    pub use crate::scalar::{Operator, Scalar};
    pub use crate::settings::Settings;
    pub use crate::shape::{Descriptor, Shape};
}
