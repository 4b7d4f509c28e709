//! Target shapes and their field descriptor tables.
//!
//! A shape is a plain `serde` type plus a [`Descriptor`] that names its fields
//! explicitly. Decoding itself is left to `serde`; the descriptor is what the
//! resolver consults to read key values and to write resolved relationships:
//!
//! ```
//! use docjoin::shape::{Descriptor, Shape};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Category {
//!     #[serde(rename = "category_id")]
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Shape for Category {
//!     const NAME: &'static str = "Category";
//!     fn describe(shape: &mut Descriptor<Self>) {
//!         shape
//!             .value("ID", "category_id", |c| c.id.into())
//!             .value("Name", "name", |c| c.name.as_str().into());
//!     }
//! }
//!
//! let descriptor = Descriptor::<Category>::of();
//! assert_eq!(descriptor.wire_name("ID"), Some("category_id"));
//! ```

// used to keep the one-to-one mapping between semantic and wire names
use bimap::BiMap;
use serde::de::DeserializeOwned;

use crate::engine::{Request, Resolver};
use crate::error::Result;
use crate::registry::RelationKind;
use crate::scalar::Scalar;

/// A record type documents are decoded into.
pub trait Shape: DeserializeOwned + Default + 'static {
    const NAME: &'static str;
    fn describe(shape: &mut Descriptor<Self>);
}

// ------------- Descriptor -------------
pub enum Access<S> {
    /// A scalar field, readable as a key or compared by filters.
    Value(fn(&S) -> Scalar),
    /// A field with no scalar form, e.g. a nested structure.
    Opaque,
    /// A field populated from another document.
    Relation {
        kind: RelationKind,
        keys: &'static str,
        slot: fn(&mut S) -> &mut dyn Slot,
    },
}

pub struct Field<S> {
    name: &'static str,
    wire: &'static str,
    access: Access<S>,
}

impl<S> Field<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn wire(&self) -> &'static str {
        self.wire
    }
    pub fn access(&self) -> &Access<S> {
        &self.access
    }
    pub fn is_relation(&self) -> bool {
        matches!(self.access, Access::Relation { .. })
    }
}

pub struct Descriptor<S> {
    name: &'static str,
    fields: Vec<Field<S>>,
    names: BiMap<&'static str, &'static str>,
}

impl<S: Shape> Descriptor<S> {
    pub fn of() -> Self {
        let mut descriptor = Self {
            name: S::NAME,
            fields: Vec::new(),
            names: BiMap::new(),
        };
        S::describe(&mut descriptor);
        descriptor
    }
}

impl<S> Descriptor<S> {
    fn push(&mut self, name: &'static str, wire: &'static str, access: Access<S>) -> &mut Self {
        // redescribing a field replaces it
        self.fields.retain(|field| field.name != name);
        self.names.insert(name, wire);
        self.fields.push(Field { name, wire, access });
        self
    }

    pub fn value(&mut self, name: &'static str, wire: &'static str, get: fn(&S) -> Scalar) -> &mut Self {
        self.push(name, wire, Access::Value(get))
    }
    pub fn opaque(&mut self, name: &'static str, wire: &'static str) -> &mut Self {
        self.push(name, wire, Access::Opaque)
    }
    /// `keys` names the local foreign key field and the remote key field, e.g. `"ClientID,ID"`.
    pub fn belongs_to(
        &mut self,
        name: &'static str,
        wire: &'static str,
        keys: &'static str,
        slot: fn(&mut S) -> &mut dyn Slot,
    ) -> &mut Self {
        self.relation(name, wire, RelationKind::SingleParent, keys, slot)
    }
    /// `keys` names the local key field and the remote foreign key field, e.g. `"ID,ClientID"`.
    pub fn has_many(
        &mut self,
        name: &'static str,
        wire: &'static str,
        keys: &'static str,
        slot: fn(&mut S) -> &mut dyn Slot,
    ) -> &mut Self {
        self.relation(name, wire, RelationKind::OneToMany, keys, slot)
    }
    /// `keys` holds four names: the local key field, its column in the join
    /// document, the remote key field and its column in the join document,
    /// e.g. `"ID,product_id,ID,category_id"`.
    pub fn many_to_many(
        &mut self,
        name: &'static str,
        wire: &'static str,
        keys: &'static str,
        slot: fn(&mut S) -> &mut dyn Slot,
    ) -> &mut Self {
        self.relation(name, wire, RelationKind::ManyToMany, keys, slot)
    }
    pub fn relation(
        &mut self,
        name: &'static str,
        wire: &'static str,
        kind: RelationKind,
        keys: &'static str,
        slot: fn(&mut S) -> &mut dyn Slot,
    ) -> &mut Self {
        self.push(name, wire, Access::Relation { kind, keys, slot })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn fields(&self) -> &[Field<S>] {
        &self.fields
    }
    pub fn field(&self, name: &str) -> Option<&Field<S>> {
        self.fields.iter().find(|field| field.name == name)
    }
    pub fn wire_name(&self, name: &str) -> Option<&'static str> {
        self.names.get_by_left(name).copied()
    }
    pub fn semantic_name(&self, wire: &str) -> Option<&'static str> {
        self.names.get_by_right(wire).copied()
    }
    /// The wire name for `name`, or `name` itself when it is not a semantic field name.
    pub fn resolve_wire<'n>(&self, name: &'n str) -> &'n str {
        match self.wire_name(name) {
            Some(wire) => wire,
            None => name,
        }
    }
}

// ------------- Target -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Collection,
}

/// A container resolved records are written into: `Option<S>` for a single
/// record, `Vec<S>` for a collection.
pub trait Target {
    type Item: Shape;
    fn cardinality() -> Cardinality;
    fn assign(&mut self, items: Vec<Self::Item>);
}

impl<S: Shape> Target for Option<S> {
    type Item = S;
    fn cardinality() -> Cardinality {
        Cardinality::Single
    }
    fn assign(&mut self, items: Vec<S>) {
        *self = items.into_iter().next();
    }
}

impl<S: Shape> Target for Vec<S> {
    type Item = S;
    fn cardinality() -> Cardinality {
        Cardinality::Collection
    }
    fn assign(&mut self, items: Vec<S>) {
        *self = items;
    }
}

/// The object-safe face of a [`Target`], handed out by relationship setters.
pub trait Slot {
    fn load(&mut self, resolver: &mut Resolver<'_>, requests: Vec<Request>) -> Result<()>;
}

impl<T: Target> Slot for T {
    fn load(&mut self, resolver: &mut Resolver<'_>, requests: Vec<Request>) -> Result<()> {
        let items = resolver.load::<T>(requests)?;
        self.assign(items);
        Ok(())
    }
}
